use crate::error::ParseError;
use crate::token::{Span, Token, TokenKind};
use crate::tree::ArithmeticOp;

type LexResult<T> = Result<T, ParseError>;

const TAB_SIZE: usize = 8;

/// Open brackets allowed at once.
const MAX_BRACKET_DEPTH: usize = 200;

/// Longest spellings first so that `**=` wins over `**` and `*`.
const OPERATORS: &[(&str, TokenKind<'static>)] = &[
    ("**=", TokenKind::AugAssign(ArithmeticOp::Pow)),
    ("//=", TokenKind::AugAssign(ArithmeticOp::FloorDiv)),
    ("<<=", TokenKind::AugAssign(ArithmeticOp::LShift)),
    (">>=", TokenKind::AugAssign(ArithmeticOp::RShift)),
    ("**", TokenKind::DoubleStar),
    ("//", TokenKind::DoubleSlash),
    ("<<", TokenKind::LeftShift),
    (">>", TokenKind::RightShift),
    ("<=", TokenKind::LessEqual),
    (">=", TokenKind::GreaterEqual),
    ("==", TokenKind::EqEqual),
    ("!=", TokenKind::NotEqual),
    ("+=", TokenKind::AugAssign(ArithmeticOp::Add)),
    ("-=", TokenKind::AugAssign(ArithmeticOp::Sub)),
    ("*=", TokenKind::AugAssign(ArithmeticOp::Mult)),
    ("/=", TokenKind::AugAssign(ArithmeticOp::Div)),
    ("%=", TokenKind::AugAssign(ArithmeticOp::Mod)),
    ("&=", TokenKind::AugAssign(ArithmeticOp::BitAnd)),
    ("|=", TokenKind::AugAssign(ArithmeticOp::BitOr)),
    ("^=", TokenKind::AugAssign(ArithmeticOp::BitXor)),
    ("+", TokenKind::Plus),
    ("-", TokenKind::Minus),
    ("*", TokenKind::Star),
    ("/", TokenKind::Slash),
    ("%", TokenKind::Percent),
    ("&", TokenKind::Ampersand),
    ("|", TokenKind::Pipe),
    ("^", TokenKind::Caret),
    ("~", TokenKind::Tilde),
    ("<", TokenKind::Less),
    (">", TokenKind::Greater),
    ("=", TokenKind::Equal),
    ("(", TokenKind::LParen),
    (")", TokenKind::RParen),
    ("[", TokenKind::LBracket),
    ("]", TokenKind::RBracket),
    ("{", TokenKind::LBrace),
    ("}", TokenKind::RBrace),
    (",", TokenKind::Comma),
    (":", TokenKind::Colon),
    (";", TokenKind::Semicolon),
    (".", TokenKind::Dot),
];

pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    line: usize,
    column: usize,
    /// Indentation widths with tabs expanded to the next multiple of
    /// `TAB_SIZE`, paired with widths that count a tab as one column. The two
    /// must order lines the same way, otherwise tabs and spaces are mixed
    /// ambiguously.
    indent_stack: Vec<(usize, usize)>,
    pending_tokens: Vec<Token<'a>>,
    at_line_start: bool,
    /// Open brackets; newlines inside brackets join lines.
    depth: usize,
    /// A logical line has started and has not been terminated yet.
    needs_newline: bool,
    eof_reached: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        let input = input.strip_prefix('\u{feff}').unwrap_or(input);
        Self {
            input,
            pos: 0,
            line: 1,
            column: 0,
            indent_stack: vec![(0, 0)],
            pending_tokens: Vec::new(),
            at_line_start: true,
            depth: 0,
            needs_newline: false,
            eof_reached: false,
        }
    }

    pub fn next_token(&mut self) -> LexResult<Token<'a>> {
        let token = self.scan()?;
        match token.kind {
            TokenKind::Newline => self.needs_newline = false,
            TokenKind::Indent | TokenKind::Dedent | TokenKind::Eof => {}
            _ => self.needs_newline = true,
        }
        Ok(token)
    }

    fn scan(&mut self) -> LexResult<Token<'a>> {
        if let Some(token) = self.pending_tokens.pop() {
            return Ok(token);
        }

        if self.eof_reached {
            return Ok(Token::new(TokenKind::Eof, self.here()));
        }

        if self.at_line_start && self.depth == 0 {
            self.at_line_start = false;
            if let Some(token) = self.indentation()? {
                return Ok(token);
            }
        }

        loop {
            self.skip_whitespace();

            let start = self.pos;
            let line = self.line;
            let column = self.column;

            let Some(ch) = self.peek() else {
                return Ok(self.end_of_input());
            };

            if ch == '\n' {
                self.advance();
                if self.depth > 0 {
                    continue;
                }
                self.at_line_start = true;
                return Ok(Token::new(
                    TokenKind::Newline,
                    self.span_from(start, line, column),
                ));
            }

            if ch.is_alphabetic() || ch == '_' {
                return self.read_identifier(start, line, column);
            }

            if ch.is_ascii_digit()
                || (ch == '.' && self.peek_nth(1).is_some_and(|c| c.is_ascii_digit()))
            {
                return self.read_number(start, line, column);
            }

            if ch == '\'' || ch == '"' {
                return self.read_string(ch, start, line, column);
            }

            return self.read_operator(start, line, column);
        }
    }

    /// Measure the indentation of the next non-blank line and turn changes
    /// into `Indent`/`Dedent` tokens.
    fn indentation(&mut self) -> LexResult<Option<Token<'a>>> {
        let (width, alt_width) = loop {
            let mut width = 0;
            let mut alt_width = 0;
            while let Some(c) = self.peek() {
                match c {
                    ' ' => {
                        width += 1;
                        alt_width += 1;
                    }
                    '\t' => {
                        width = (width / TAB_SIZE + 1) * TAB_SIZE;
                        alt_width += 1;
                    }
                    '\x0c' => {
                        width = 0;
                        alt_width = 0;
                    }
                    _ => break,
                }
                self.advance();
            }
            match self.peek() {
                Some('\n') | Some('\r') => {
                    self.advance();
                }
                Some('#') => self.skip_comment(),
                None => return Ok(None),
                Some(_) => break (width, alt_width),
            }
        };

        let span = self.here();
        let inconsistent =
            || ParseError::new("inconsistent use of tabs and spaces in indentation", span);
        let (current, current_alt) = self.indent_stack.last().copied().unwrap_or((0, 0));
        if width > current {
            if alt_width <= current_alt {
                return Err(inconsistent());
            }
            self.indent_stack.push((width, alt_width));
            return Ok(Some(Token::new(TokenKind::Indent, span)));
        }
        while self.indent_stack.last().is_some_and(|&(top, _)| top > width) {
            self.indent_stack.pop();
            self.pending_tokens.push(Token::new(TokenKind::Dedent, span));
        }
        let (top, top_alt) = self.indent_stack.last().copied().unwrap_or((0, 0));
        if top != width {
            return Err(ParseError::new(
                "unindent does not match any outer indentation level",
                span,
            ));
        }
        if top_alt != alt_width {
            return Err(inconsistent());
        }
        Ok(self.pending_tokens.pop())
    }

    fn end_of_input(&mut self) -> Token<'a> {
        let span = self.here();
        if self.needs_newline {
            return Token::new(TokenKind::Newline, span);
        }
        self.eof_reached = true;
        while self.indent_stack.len() > 1 {
            self.indent_stack.pop();
            self.pending_tokens.push(Token::new(TokenKind::Dedent, span));
        }
        self.pending_tokens
            .pop()
            .unwrap_or_else(|| Token::new(TokenKind::Eof, span))
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            match c {
                ' ' | '\t' | '\x0c' | '\r' => {
                    self.advance();
                }
                '#' => self.skip_comment(),
                '\\' if self.peek_nth(1) == Some('\n') => {
                    self.advance();
                    self.advance();
                }
                '\\' if self.peek_nth(1) == Some('\r') && self.peek_nth(2) == Some('\n') => {
                    self.advance();
                    self.advance();
                    self.advance();
                }
                _ => break,
            }
        }
    }

    fn skip_comment(&mut self) {
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            self.advance();
        }
    }

    fn read_identifier(&mut self, start: usize, line: usize, column: usize) -> LexResult<Token<'a>> {
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' {
                self.advance();
            } else {
                break;
            }
        }
        let text = &self.input[start..self.pos];
        let span = self.span_from(start, line, column);

        if matches!(self.peek(), Some('\'') | Some('"')) {
            return Err(ParseError::unsupported(
                &format!("string prefix '{text}'"),
                span,
            ));
        }

        let kind = TokenKind::keyword(text).unwrap_or(TokenKind::Name(text));
        Ok(Token::new(kind, span))
    }

    fn read_number(&mut self, start: usize, line: usize, column: usize) -> LexResult<Token<'a>> {
        let radix = match (self.peek(), self.peek_nth(1)) {
            (Some('0'), Some('x' | 'X')) => Some(16),
            (Some('0'), Some('o' | 'O')) => Some(8),
            (Some('0'), Some('b' | 'B')) => Some(2),
            _ => None,
        };

        if let Some(radix) = radix {
            self.advance();
            self.advance();
            if self.peek() == Some('_') {
                self.advance();
            }
            let digits_start = self.pos;
            let count = self.eat_digits(|c| c.is_digit(radix))?;
            let span = self.span_from(start, line, column);
            let invalid = || {
                ParseError::new(
                    format!("invalid integer literal '{}'", &self.input[start..self.pos]),
                    span,
                )
            };
            if count == 0 || self.peek().is_some_and(|c| c.is_ascii_alphanumeric()) {
                return Err(invalid());
            }
            let digits: String = self.input[digits_start..self.pos]
                .chars()
                .filter(|&c| c != '_')
                .collect();
            let value = u128::from_str_radix(&digits, radix).map_err(|_| invalid())?;
            return Ok(Token::new(TokenKind::Int(value), span));
        }

        let mut is_float = false;
        self.eat_digits(|c| c.is_ascii_digit())?;
        if self.peek() == Some('.') {
            is_float = true;
            self.advance();
            self.eat_digits(|c| c.is_ascii_digit())?;
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            let signed = matches!(self.peek_nth(1), Some('+' | '-'));
            let digit_at = if signed { 2 } else { 1 };
            if self.peek_nth(digit_at).is_some_and(|c| c.is_ascii_digit()) {
                is_float = true;
                for _ in 0..digit_at {
                    self.advance();
                }
                self.eat_digits(|c| c.is_ascii_digit())?;
            }
        }

        let span = self.span_from(start, line, column);
        if matches!(self.peek(), Some('j' | 'J')) {
            return Err(ParseError::unsupported("imaginary literal", span));
        }

        let text: String = self.input[start..self.pos]
            .chars()
            .filter(|&c| c != '_')
            .collect();
        let kind = if is_float {
            let value = text
                .parse::<f64>()
                .map_err(|_| ParseError::new(format!("invalid float literal '{text}'"), span))?;
            TokenKind::Float(value)
        } else {
            if text.starts_with('0') && text.contains(|c: char| c != '0') {
                return Err(ParseError::new(
                    "leading zeros in decimal integer literals are not permitted",
                    span,
                ));
            }
            let value = text.parse::<u128>().map_err(|_| {
                ParseError::new(format!("integer literal '{text}' is too large"), span)
            })?;
            TokenKind::Int(value)
        };
        Ok(Token::new(kind, span))
    }

    /// Digits in which a single `_` may separate two digits. Returns how
    /// many digits were read.
    fn eat_digits(&mut self, is_digit: impl Fn(char) -> bool) -> LexResult<usize> {
        let mut count = 0;
        loop {
            match self.peek() {
                Some(c) if is_digit(c) => count += 1,
                Some('_') if count > 0 && self.peek_nth(1).is_some_and(&is_digit) => {}
                Some('_') => {
                    return Err(ParseError::new(
                        "invalid '_' in number literal",
                        self.here(),
                    ))
                }
                _ => return Ok(count),
            }
            self.advance();
        }
    }

    fn read_string(
        &mut self,
        quote: char,
        start: usize,
        line: usize,
        column: usize,
    ) -> LexResult<Token<'a>> {
        let triple = self.peek_nth(1) == Some(quote) && self.peek_nth(2) == Some(quote);
        let delimiter = if triple { 3 } else { 1 };
        for _ in 0..delimiter {
            self.advance();
        }

        let mut value = String::new();
        loop {
            let unterminated =
                || ParseError::new("unterminated string literal", Span { start, end: start, line, column });
            match self.advance() {
                None => return Err(unterminated()),
                Some('\\') => {
                    let escaped = self.advance().ok_or_else(unterminated)?;
                    self.read_escape(escaped, &mut value)?;
                }
                Some('\n') if !triple => return Err(unterminated()),
                Some(c) if c == quote => {
                    if !triple {
                        break;
                    }
                    if self.peek() == Some(quote) && self.peek_nth(1) == Some(quote) {
                        self.advance();
                        self.advance();
                        break;
                    }
                    value.push(c);
                }
                Some(c) => value.push(c),
            }
        }

        Ok(Token::new(
            TokenKind::Str(value),
            self.span_from(start, line, column),
        ))
    }

    fn read_escape(&mut self, escaped: char, value: &mut String) -> LexResult<()> {
        match escaped {
            '\n' => {}
            'n' => value.push('\n'),
            't' => value.push('\t'),
            'r' => value.push('\r'),
            'a' => value.push('\x07'),
            'b' => value.push('\x08'),
            'f' => value.push('\x0c'),
            'v' => value.push('\x0b'),
            '\\' | '\'' | '"' => value.push(escaped),
            'x' => value.push(self.read_code_point(2)?),
            'u' => value.push(self.read_code_point(4)?),
            'U' => value.push(self.read_code_point(8)?),
            '0'..='7' => {
                let mut code = escaped.to_digit(8).unwrap_or(0);
                for _ in 0..2 {
                    match self.peek().and_then(|c| c.to_digit(8)) {
                        Some(d) => {
                            code = code * 8 + d;
                            self.advance();
                        }
                        None => break,
                    }
                }
                value.push(char::from_u32(code).unwrap_or('\u{fffd}'));
            }
            other => {
                value.push('\\');
                value.push(other);
            }
        }
        Ok(())
    }

    fn read_code_point(&mut self, digits: usize) -> LexResult<char> {
        let span = self.here();
        let mut code = 0u32;
        for _ in 0..digits {
            let digit = self
                .peek()
                .and_then(|c| c.to_digit(16))
                .ok_or_else(|| ParseError::new("truncated escape sequence", span))?;
            code = code * 16 + digit;
            self.advance();
        }
        char::from_u32(code).ok_or_else(|| ParseError::new("invalid escape sequence", span))
    }

    fn read_operator(&mut self, start: usize, line: usize, column: usize) -> LexResult<Token<'a>> {
        let rest = &self.input[self.pos..];
        let Some((text, kind)) = OPERATORS.iter().find(|(text, _)| rest.starts_with(text)) else {
            let character = rest.chars().next().unwrap_or('\0');
            return Err(ParseError::new(
                format!("unexpected character '{character}'"),
                self.here(),
            ));
        };
        for _ in 0..text.len() {
            self.advance();
        }
        match kind {
            TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => {
                if self.depth >= MAX_BRACKET_DEPTH {
                    return Err(ParseError::new(
                        "too many nested parentheses",
                        self.span_from(start, line, column),
                    ));
                }
                self.depth += 1
            }
            TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => {
                self.depth = self.depth.saturating_sub(1)
            }
            _ => {}
        }
        Ok(Token::new(kind.clone(), self.span_from(start, line, column)))
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.input[self.pos..].chars().nth(n)
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 0;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn here(&self) -> Span {
        Span {
            start: self.pos,
            end: self.pos,
            line: self.line,
            column: self.column,
        }
    }

    fn span_from(&self, start: usize, line: usize, column: usize) -> Span {
        Span {
            start,
            end: self.pos,
            line,
            column,
        }
    }
}

pub fn tokenize(input: &str) -> LexResult<Vec<Token<'_>>> {
    let mut lexer = Lexer::new(input);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token()?;
        let done = token.kind == TokenKind::Eof;
        tokens.push(token);
        if done {
            break;
        }
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind<'_>> {
        tokenize(input)
            .expect("tokenize should succeed")
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_simple_statement() {
        assert_eq!(
            kinds("x = a + 1\n"),
            vec![
                TokenKind::Name("x"),
                TokenKind::Equal,
                TokenKind::Name("a"),
                TokenKind::Plus,
                TokenKind::Int(1),
                TokenKind::Newline,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_missing_trailing_newline_is_synthesized() {
        assert_eq!(
            kinds("x"),
            vec![TokenKind::Name("x"), TokenKind::Newline, TokenKind::Eof]
        );
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(kinds(""), vec![TokenKind::Eof]);
        assert_eq!(kinds("\n\n# only a comment\n"), vec![TokenKind::Eof]);
    }

    #[test]
    fn test_indent_and_dedent() {
        let source = "def f():\n    return 1\n\n    # comment\nx\n";
        assert_eq!(
            kinds(source),
            vec![
                TokenKind::Def,
                TokenKind::Name("f"),
                TokenKind::LParen,
                TokenKind::RParen,
                TokenKind::Colon,
                TokenKind::Newline,
                TokenKind::Indent,
                TokenKind::Return,
                TokenKind::Int(1),
                TokenKind::Newline,
                TokenKind::Dedent,
                TokenKind::Name("x"),
                TokenKind::Newline,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_dedents_at_end_of_input() {
        let tokens = kinds("if a:\n  if b:\n    c");
        let tail = &tokens[tokens.len() - 4..];
        assert_eq!(
            tail,
            &[
                TokenKind::Newline,
                TokenKind::Dedent,
                TokenKind::Dedent,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_newlines_inside_brackets_are_joined() {
        assert_eq!(
            kinds("f(a,\n  b)\n"),
            vec![
                TokenKind::Name("f"),
                TokenKind::LParen,
                TokenKind::Name("a"),
                TokenKind::Comma,
                TokenKind::Name("b"),
                TokenKind::RParen,
                TokenKind::Newline,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_backslash_continuation() {
        assert_eq!(
            kinds("x = 1 + \\\n    2\n"),
            vec![
                TokenKind::Name("x"),
                TokenKind::Equal,
                TokenKind::Int(1),
                TokenKind::Plus,
                TokenKind::Int(2),
                TokenKind::Newline,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_operators_longest_match() {
        assert_eq!(
            kinds("a **= b // c << d != e"),
            vec![
                TokenKind::Name("a"),
                TokenKind::AugAssign(ArithmeticOp::Pow),
                TokenKind::Name("b"),
                TokenKind::DoubleSlash,
                TokenKind::Name("c"),
                TokenKind::LeftShift,
                TokenKind::Name("d"),
                TokenKind::NotEqual,
                TokenKind::Name("e"),
                TokenKind::Newline,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            kinds("0x1F 0b101 0o17 1_000 2.5 .5 1e3 3."),
            vec![
                TokenKind::Int(31),
                TokenKind::Int(5),
                TokenKind::Int(15),
                TokenKind::Int(1000),
                TokenKind::Float(2.5),
                TokenKind::Float(0.5),
                TokenKind::Float(1000.0),
                TokenKind::Float(3.0),
                TokenKind::Newline,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_strings_and_escapes() {
        assert_eq!(
            kinds(r#"'a\n' "it's" '\x41\101' '''multi
line'''"#),
            vec![
                TokenKind::Str("a\n".into()),
                TokenKind::Str("it's".into()),
                TokenKind::Str("AA".into()),
                TokenKind::Str("multi\nline".into()),
                TokenKind::Newline,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_keywords_and_reserved() {
        assert_eq!(
            kinds("lambda not_a_keyword class"),
            vec![
                TokenKind::Lambda,
                TokenKind::Name("not_a_keyword"),
                TokenKind::Reserved("class"),
                TokenKind::Newline,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_errors_on_unterminated_string() {
        let err = tokenize("x = 'abc\n").expect_err("should fail");
        assert!(err.message.contains("unterminated"));
    }

    #[test]
    fn test_tab_indentation() {
        let tokens = kinds("if x:\n\ty\n\tz\nw\n");
        assert_eq!(
            &tokens[4..],
            &[
                TokenKind::Indent,
                TokenKind::Name("y"),
                TokenKind::Newline,
                TokenKind::Name("z"),
                TokenKind::Newline,
                TokenKind::Dedent,
                TokenKind::Name("w"),
                TokenKind::Newline,
                TokenKind::Eof,
            ]
        );
        assert!(tokenize("if x:\n\tif y:\n\t    z\n").is_ok());
    }

    #[test]
    fn test_errors_on_ambiguous_tabs_and_spaces() {
        // A tab and eight spaces are equally wide only with a tab stop of 8.
        for source in [
            "if x:\n\ty\n        z\n",
            "if x:\n        y\n\tz\n",
            "if x:\n        if y:\n\t\tz\n",
        ] {
            let err = tokenize(source).expect_err("should fail");
            assert!(err.message.contains("inconsistent use of tabs"), "{source:?}");
        }
    }

    #[test]
    fn test_leading_byte_order_mark_is_skipped() {
        assert_eq!(
            kinds("\u{feff}x"),
            vec![TokenKind::Name("x"), TokenKind::Newline, TokenKind::Eof]
        );
    }

    #[test]
    fn test_integers_beyond_64_bits() {
        assert_eq!(
            kinds("9223372036854775808 0xffffffffffffffffffff"),
            vec![
                TokenKind::Int(1 << 63),
                TokenKind::Int((1 << 80) - 1),
                TokenKind::Newline,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_digit_separators() {
        assert_eq!(
            kinds("1_000_000 0x_ff 1_0.2_5e1_0 00 0_0"),
            vec![
                TokenKind::Int(1_000_000),
                TokenKind::Int(255),
                TokenKind::Float(10.25e10),
                TokenKind::Int(0),
                TokenKind::Int(0),
                TokenKind::Newline,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_errors_on_malformed_numbers() {
        for source in ["1__0", "1_", "1._5", "1_.5", "0x", "0x__1", "0b102", "0o8"] {
            assert!(tokenize(source).is_err(), "{source} should not tokenize");
        }
    }

    #[test]
    fn test_errors_on_leading_zeros() {
        let err = tokenize("x = 07").expect_err("should fail");
        assert!(err.message.contains("leading zeros"));
        assert_eq!(kinds("07.5")[0], TokenKind::Float(7.5));
        assert_eq!(kinds("07e1")[0], TokenKind::Float(70.0));
    }

    #[test]
    fn test_errors_on_deep_bracket_nesting() {
        let source = format!("x = {}1{}", "(".repeat(2000), ")".repeat(2000));
        let err = tokenize(&source).expect_err("should fail");
        assert!(err.message.contains("too many nested parentheses"));
        assert!(tokenize(&format!("{}{}", "[".repeat(200), "]".repeat(200))).is_ok());
    }

    #[test]
    fn test_errors_on_bad_dedent() {
        let err = tokenize("if x:\n    y\n  z\n").expect_err("should fail");
        assert!(err.message.contains("indentation"));
        assert_eq!(err.line, 3);
    }

    #[test]
    fn test_errors_on_integer_overflow() {
        assert!(tokenize("340282366920938463463374607431768211456").is_err());
    }

    #[test]
    fn test_errors_on_invalid_character() {
        let err = tokenize("a @ b").expect_err("should fail");
        assert!(err.message.contains('@'));
    }

    #[test]
    fn test_errors_on_string_prefix() {
        assert!(tokenize("f'{x}'").is_err());
    }
}
