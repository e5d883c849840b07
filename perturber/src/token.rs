use crate::tree::ArithmeticOp;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind<'a> {
    Name(&'a str),
    Int(u128),
    Float(f64),
    Str(String),

    // Keywords
    False,
    None,
    True,
    And,
    Or,
    Not,
    If,
    Elif,
    Else,
    While,
    For,
    In,
    Is,
    Def,
    Return,
    Lambda,
    Pass,
    Break,
    Continue,
    Assert,
    Raise,
    /// Keyword of a construct the parser does not support.
    Reserved(&'a str),

    // Operators
    Plus,         // +
    Minus,        // -
    Star,         // *
    Slash,        // /
    DoubleSlash,  // //
    Percent,      // %
    DoubleStar,   // **
    LeftShift,    // <<
    RightShift,   // >>
    Ampersand,    // &
    Pipe,         // |
    Caret,        // ^
    Tilde,        // ~
    Less,         // <
    Greater,      // >
    LessEqual,    // <=
    GreaterEqual, // >=
    EqEqual,      // ==
    NotEqual,     // !=
    Equal,        // =
    AugAssign(ArithmeticOp),

    // Delimiters
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Colon,
    Dot,
    Semicolon,

    // Structural
    Newline,
    Indent,
    Dedent,
    Eof,
}

impl<'a> TokenKind<'a> {
    pub fn keyword(word: &'a str) -> Option<Self> {
        let kind = match word {
            "False" => Self::False,
            "None" => Self::None,
            "True" => Self::True,
            "and" => Self::And,
            "or" => Self::Or,
            "not" => Self::Not,
            "if" => Self::If,
            "elif" => Self::Elif,
            "else" => Self::Else,
            "while" => Self::While,
            "for" => Self::For,
            "in" => Self::In,
            "is" => Self::Is,
            "def" => Self::Def,
            "return" => Self::Return,
            "lambda" => Self::Lambda,
            "pass" => Self::Pass,
            "break" => Self::Break,
            "continue" => Self::Continue,
            "assert" => Self::Assert,
            "raise" => Self::Raise,
            "as" | "async" | "await" | "class" | "del" | "except" | "finally" | "from"
            | "global" | "import" | "nonlocal" | "try" | "with" | "yield" => Self::Reserved(word),
            _ => return None,
        };
        Some(kind)
    }

    /// Short description used in parse errors.
    pub fn describe(&self) -> String {
        match self {
            Self::Name(name) => format!("name '{name}'"),
            Self::Int(i) => format!("integer {i}"),
            Self::Float(f) => format!("float {f}"),
            Self::Str(_) => "string".to_string(),
            Self::Reserved(word) => format!("'{word}'"),
            Self::AugAssign(op) => format!("'{}='", op.symbol()),
            Self::Newline => "newline".to_string(),
            Self::Indent => "indent".to_string(),
            Self::Dedent => "dedent".to_string(),
            Self::Eof => "end of input".to_string(),
            other => format!("{other:?}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token<'a> {
    pub kind: TokenKind<'a>,
    pub span: Span,
}

impl<'a> Token<'a> {
    pub fn new(kind: TokenKind<'a>, span: Span) -> Self {
        Self { kind, span }
    }
}
