//! Recursive-descent parser for the supported Python subset.
//!
//! Precedence, lowest first:
//! - lambda, conditional expression
//! - `or`, `and`, `not`
//! - comparisons (chained)
//! - `|`, `^`, `&`, shifts, `+ -`, `* / // %`
//! - unary `+ - ~`, `**`
//! - calls, attributes, subscripts, atoms

use crate::error::ParseError;
use crate::lexer::tokenize;
use crate::token::{Span, Token, TokenKind};
use crate::tree::{
    ArithmeticOp, ComparisonOp, Constant, ExprContext, Keyword, LogicalOp, Node, NodeId,
    Parameters, PrefixOp, Tree,
};

type ParseResult<T> = Result<T, ParseError>;

/// Deepest recursion the parser enters, and the deepest statement tree it
/// returns. Rendering and dumping recurse once per tree level.
const MAX_DEPTH: usize = 100;

/// Parse a whole module.
pub fn parse(source: &str) -> ParseResult<Tree> {
    Parser::new(source)?.parse_module()
}

pub struct Parser<'a> {
    tokens: Vec<Token<'a>>,
    pos: usize,
    depth: usize,
    tree: Tree,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> ParseResult<Self> {
        Ok(Self {
            tokens: tokenize(input)?,
            pos: 0,
            depth: 0,
            tree: Tree::new(),
        })
    }

    pub fn parse_module(mut self) -> ParseResult<Tree> {
        let mut statements = Vec::new();
        while !self.check(&TokenKind::Eof) {
            if self.check(&TokenKind::Newline) {
                self.advance();
                continue;
            }
            let span = self.span();
            for statement in self.parse_statement()? {
                if self.tree.depth(statement) > MAX_DEPTH {
                    return Err(ParseError::new("statement is nested too deeply", span));
                }
                statements.push(statement);
            }
        }
        let root = self.tree.root();
        if let Node::Module { body } = self.tree.node_mut(root) {
            *body = statements;
        }
        Ok(self.tree)
    }

    // ----------------------------------------------------------------------
    // Statements
    // ----------------------------------------------------------------------

    fn parse_statement(&mut self) -> ParseResult<Vec<NodeId>> {
        match self.kind() {
            TokenKind::Def => Ok(vec![self.parse_function_def()?]),
            TokenKind::If => Ok(vec![self.parse_if()?]),
            TokenKind::While => Ok(vec![self.parse_while()?]),
            TokenKind::For => Ok(vec![self.parse_for()?]),
            TokenKind::Indent => Err(ParseError::new("unexpected indent", self.span())),
            _ => self.parse_simple_statements(),
        }
    }

    /// One or more `;`-separated small statements ending the logical line.
    fn parse_simple_statements(&mut self) -> ParseResult<Vec<NodeId>> {
        let mut statements = vec![self.parse_small_statement()?];
        while self.check(&TokenKind::Semicolon) {
            self.advance();
            if self.check(&TokenKind::Newline) {
                break;
            }
            statements.push(self.parse_small_statement()?);
        }
        self.expect(&TokenKind::Newline, "newline")?;
        Ok(statements)
    }

    fn parse_small_statement(&mut self) -> ParseResult<NodeId> {
        let node = match self.kind() {
            TokenKind::Pass => {
                self.advance();
                Node::Pass
            }
            TokenKind::Break => {
                self.advance();
                Node::Break
            }
            TokenKind::Continue => {
                self.advance();
                Node::Continue
            }
            TokenKind::Return => {
                self.advance();
                let value = if self.starts_expression() {
                    Some(self.parse_expression_list()?)
                } else {
                    None
                };
                Node::Return { value }
            }
            TokenKind::Raise => {
                self.advance();
                let exc = if self.starts_expression() {
                    Some(self.parse_test()?)
                } else {
                    None
                };
                Node::Raise { exc }
            }
            TokenKind::Assert => {
                self.advance();
                let test = self.parse_test()?;
                let msg = if self.check(&TokenKind::Comma) {
                    self.advance();
                    Some(self.parse_test()?)
                } else {
                    None
                };
                Node::Assert { test, msg }
            }
            _ => return self.parse_expression_statement(),
        };
        Ok(self.tree.alloc(node))
    }

    fn parse_expression_statement(&mut self) -> ParseResult<NodeId> {
        let span = self.span();
        let first = self.parse_expression_list()?;

        if let TokenKind::AugAssign(op) = *self.kind() {
            self.advance();
            if !matches!(
                self.tree.node(first),
                Node::Name { .. } | Node::Attribute { .. } | Node::Subscript { .. }
            ) {
                return Err(ParseError::new(
                    "illegal expression for augmented assignment",
                    span,
                ));
            }
            self.set_store(first, span)?;
            let value = self.parse_expression_list()?;
            return Ok(self.tree.alloc(Node::AugAssign {
                target: first,
                op,
                value,
            }));
        }

        if !self.check(&TokenKind::Equal) {
            return Ok(self.tree.alloc(Node::Expr { value: first }));
        }

        let mut targets = vec![first];
        let value = loop {
            self.advance();
            let next = self.parse_expression_list()?;
            if self.check(&TokenKind::Equal) {
                targets.push(next);
            } else {
                break next;
            }
        };
        for &target in &targets {
            self.set_store(target, span)?;
        }
        Ok(self.tree.alloc(Node::Assign { targets, value }))
    }

    fn parse_function_def(&mut self) -> ParseResult<NodeId> {
        self.expect(&TokenKind::Def, "'def'")?;
        let name = self.expect_name()?;
        self.expect(&TokenKind::LParen, "'('")?;
        let params = self.parse_parameters(&TokenKind::RParen)?;
        self.expect(&TokenKind::RParen, "')'")?;
        self.expect(&TokenKind::Colon, "':'")?;
        let body = self.parse_suite()?;
        Ok(self.tree.alloc(Node::FunctionDef { name, params, body }))
    }

    /// Handles both `if` and `elif`; an `elif` chain nests in `orelse`.
    fn parse_if(&mut self) -> ParseResult<NodeId> {
        self.advance();
        let test = self.parse_test()?;
        self.expect(&TokenKind::Colon, "':'")?;
        let body = self.parse_suite()?;
        let orelse = match self.kind() {
            TokenKind::Elif => vec![self.nested(Self::parse_if)?],
            TokenKind::Else => {
                self.advance();
                self.expect(&TokenKind::Colon, "':'")?;
                self.parse_suite()?
            }
            _ => Vec::new(),
        };
        Ok(self.tree.alloc(Node::If { test, body, orelse }))
    }

    fn parse_while(&mut self) -> ParseResult<NodeId> {
        self.expect(&TokenKind::While, "'while'")?;
        let test = self.parse_test()?;
        self.expect(&TokenKind::Colon, "':'")?;
        let body = self.parse_suite()?;
        if self.check(&TokenKind::Else) {
            return Err(ParseError::unsupported("'while ... else'", self.span()));
        }
        Ok(self.tree.alloc(Node::While { test, body }))
    }

    fn parse_for(&mut self) -> ParseResult<NodeId> {
        self.expect(&TokenKind::For, "'for'")?;
        let span = self.span();
        let target = self.parse_target_list()?;
        self.set_store(target, span)?;
        self.expect(&TokenKind::In, "'in'")?;
        let iter = self.parse_expression_list()?;
        self.expect(&TokenKind::Colon, "':'")?;
        let body = self.parse_suite()?;
        if self.check(&TokenKind::Else) {
            return Err(ParseError::unsupported("'for ... else'", self.span()));
        }
        Ok(self.tree.alloc(Node::For { target, iter, body }))
    }

    fn parse_suite(&mut self) -> ParseResult<Vec<NodeId>> {
        self.nested(Self::parse_block)
    }

    /// Indented block, or the rest of the line after `:`.
    fn parse_block(&mut self) -> ParseResult<Vec<NodeId>> {
        if !self.check(&TokenKind::Newline) {
            return self.parse_simple_statements();
        }
        self.advance();
        self.expect(&TokenKind::Indent, "indented block")?;
        let mut body = Vec::new();
        while !self.check(&TokenKind::Dedent) {
            if self.check(&TokenKind::Eof) {
                return Err(self.error_here("dedent"));
            }
            body.extend(self.parse_statement()?);
        }
        self.advance();
        Ok(body)
    }

    fn parse_parameters(&mut self, closing: &TokenKind<'_>) -> ParseResult<Parameters> {
        let mut params = Parameters::default();
        while !self.check(closing) {
            if matches!(self.kind(), TokenKind::Star | TokenKind::DoubleStar) {
                return Err(ParseError::unsupported("variadic parameters", self.span()));
            }
            let span = self.span();
            let name = self.expect_name()?;
            if params.names.contains(&name) {
                return Err(ParseError::new(
                    format!("duplicate argument '{}'", self.tree.from_sym(name)),
                    span,
                ));
            }
            if closing == &TokenKind::RParen && self.check(&TokenKind::Colon) {
                return Err(ParseError::unsupported("parameter annotations", self.span()));
            }
            if self.check(&TokenKind::Equal) {
                self.advance();
                params.defaults.push(self.parse_test()?);
            } else if !params.defaults.is_empty() {
                return Err(ParseError::new(
                    "non-default argument follows default argument",
                    span,
                ));
            }
            params.names.push(name);
            if !self.check(&TokenKind::Comma) {
                break;
            }
            self.advance();
        }
        Ok(params)
    }

    /// Mark an assignment target, and everything it destructures into, as a
    /// store.
    fn set_store(&mut self, id: NodeId, span: Span) -> ParseResult<()> {
        let elts = match self.tree.node_mut(id) {
            Node::Name { ctx, .. } | Node::Attribute { ctx, .. } | Node::Subscript { ctx, .. } => {
                *ctx = ExprContext::Store;
                return Ok(());
            }
            Node::Tuple { elts, ctx } | Node::List { elts, ctx } => {
                *ctx = ExprContext::Store;
                elts.clone()
            }
            _ => return Err(ParseError::new("cannot assign to expression", span)),
        };
        for elt in elts {
            self.set_store(elt, span)?;
        }
        Ok(())
    }

    // ----------------------------------------------------------------------
    // Expressions
    // ----------------------------------------------------------------------

    /// Comma-separated tests; more than one (or a trailing comma) is a tuple.
    fn parse_expression_list(&mut self) -> ParseResult<NodeId> {
        self.parse_list_of(Self::parse_test)
    }

    /// `for` targets stop below comparisons so that `in` is not consumed.
    fn parse_target_list(&mut self) -> ParseResult<NodeId> {
        self.parse_list_of(Self::parse_bitor)
    }

    fn parse_list_of(&mut self, item: fn(&mut Self) -> ParseResult<NodeId>) -> ParseResult<NodeId> {
        let first = item(self)?;
        if !self.check(&TokenKind::Comma) {
            return Ok(first);
        }
        let mut elts = vec![first];
        while self.check(&TokenKind::Comma) {
            self.advance();
            if !self.starts_expression() {
                break;
            }
            elts.push(item(self)?);
        }
        Ok(self.tree.alloc(Node::Tuple {
            elts,
            ctx: ExprContext::Load,
        }))
    }

    fn parse_test(&mut self) -> ParseResult<NodeId> {
        self.nested(Self::parse_conditional)
    }

    fn parse_conditional(&mut self) -> ParseResult<NodeId> {
        if self.check(&TokenKind::Lambda) {
            return self.parse_lambda();
        }
        let body = self.parse_or_test()?;
        if !self.check(&TokenKind::If) {
            return Ok(body);
        }
        self.advance();
        let test = self.parse_or_test()?;
        self.expect(&TokenKind::Else, "'else'")?;
        let orelse = self.parse_test()?;
        Ok(self.tree.alloc(Node::IfExp { test, body, orelse }))
    }

    fn parse_lambda(&mut self) -> ParseResult<NodeId> {
        self.expect(&TokenKind::Lambda, "'lambda'")?;
        let params = self.parse_parameters(&TokenKind::Colon)?;
        self.expect(&TokenKind::Colon, "':'")?;
        let body = self.parse_test()?;
        Ok(self.tree.alloc(Node::Lambda { params, body }))
    }

    fn parse_or_test(&mut self) -> ParseResult<NodeId> {
        self.parse_bool_op(LogicalOp::Or, &TokenKind::Or, Self::parse_and_test)
    }

    fn parse_and_test(&mut self) -> ParseResult<NodeId> {
        self.parse_bool_op(LogicalOp::And, &TokenKind::And, Self::parse_not_test)
    }

    /// `a or b or c` is a single node with three values.
    fn parse_bool_op(
        &mut self,
        op: LogicalOp,
        token: &TokenKind<'_>,
        operand: fn(&mut Self) -> ParseResult<NodeId>,
    ) -> ParseResult<NodeId> {
        let first = operand(self)?;
        if !self.check(token) {
            return Ok(first);
        }
        let mut values = vec![first];
        while self.check(token) {
            self.advance();
            values.push(operand(self)?);
        }
        Ok(self.tree.alloc(Node::BoolOp { op, values }))
    }

    fn parse_not_test(&mut self) -> ParseResult<NodeId> {
        if !self.check(&TokenKind::Not) {
            return self.parse_comparison();
        }
        self.advance();
        let operand = self.nested(Self::parse_not_test)?;
        Ok(self.tree.alloc(Node::UnaryOp {
            op: PrefixOp::Not,
            operand,
        }))
    }

    fn parse_comparison(&mut self) -> ParseResult<NodeId> {
        let left = self.parse_bitor()?;
        let mut ops = Vec::new();
        let mut comparators = Vec::new();
        loop {
            let op = match (self.kind(), self.peek_kind(1)) {
                (TokenKind::EqEqual, _) => ComparisonOp::Eq,
                (TokenKind::NotEqual, _) => ComparisonOp::NotEq,
                (TokenKind::Less, _) => ComparisonOp::Lt,
                (TokenKind::LessEqual, _) => ComparisonOp::LtE,
                (TokenKind::Greater, _) => ComparisonOp::Gt,
                (TokenKind::GreaterEqual, _) => ComparisonOp::GtE,
                (TokenKind::In, _) => ComparisonOp::In,
                (TokenKind::Not, TokenKind::In) => ComparisonOp::NotIn,
                (TokenKind::Is, TokenKind::Not) => ComparisonOp::IsNot,
                (TokenKind::Is, _) => ComparisonOp::Is,
                _ => break,
            };
            self.advance();
            if matches!(op, ComparisonOp::NotIn | ComparisonOp::IsNot) {
                self.advance();
            }
            ops.push(op);
            comparators.push(self.parse_bitor()?);
        }
        if ops.is_empty() {
            return Ok(left);
        }
        Ok(self.tree.alloc(Node::Compare {
            left,
            ops,
            comparators,
        }))
    }

    fn parse_binary(
        &mut self,
        operand: fn(&mut Self) -> ParseResult<NodeId>,
        op_for: fn(&TokenKind<'_>) -> Option<ArithmeticOp>,
    ) -> ParseResult<NodeId> {
        let mut left = operand(self)?;
        while let Some(op) = op_for(self.kind()) {
            self.advance();
            let right = operand(self)?;
            left = self.tree.alloc(Node::BinOp { left, op, right });
        }
        Ok(left)
    }

    fn parse_bitor(&mut self) -> ParseResult<NodeId> {
        self.parse_binary(Self::parse_bitxor, |kind| match kind {
            TokenKind::Pipe => Some(ArithmeticOp::BitOr),
            _ => None,
        })
    }

    fn parse_bitxor(&mut self) -> ParseResult<NodeId> {
        self.parse_binary(Self::parse_bitand, |kind| match kind {
            TokenKind::Caret => Some(ArithmeticOp::BitXor),
            _ => None,
        })
    }

    fn parse_bitand(&mut self) -> ParseResult<NodeId> {
        self.parse_binary(Self::parse_shift, |kind| match kind {
            TokenKind::Ampersand => Some(ArithmeticOp::BitAnd),
            _ => None,
        })
    }

    fn parse_shift(&mut self) -> ParseResult<NodeId> {
        self.parse_binary(Self::parse_arith, |kind| match kind {
            TokenKind::LeftShift => Some(ArithmeticOp::LShift),
            TokenKind::RightShift => Some(ArithmeticOp::RShift),
            _ => None,
        })
    }

    fn parse_arith(&mut self) -> ParseResult<NodeId> {
        self.parse_binary(Self::parse_term, |kind| match kind {
            TokenKind::Plus => Some(ArithmeticOp::Add),
            TokenKind::Minus => Some(ArithmeticOp::Sub),
            _ => None,
        })
    }

    fn parse_term(&mut self) -> ParseResult<NodeId> {
        self.parse_binary(Self::parse_factor, |kind| match kind {
            TokenKind::Star => Some(ArithmeticOp::Mult),
            TokenKind::Slash => Some(ArithmeticOp::Div),
            TokenKind::DoubleSlash => Some(ArithmeticOp::FloorDiv),
            TokenKind::Percent => Some(ArithmeticOp::Mod),
            _ => None,
        })
    }

    fn parse_factor(&mut self) -> ParseResult<NodeId> {
        let op = match self.kind() {
            TokenKind::Plus => PrefixOp::UAdd,
            TokenKind::Minus => PrefixOp::USub,
            TokenKind::Tilde => PrefixOp::Invert,
            _ => return self.parse_power(),
        };
        self.advance();
        let operand = self.nested(Self::parse_factor)?;
        Ok(self.tree.alloc(Node::UnaryOp { op, operand }))
    }

    /// `**` binds tighter than a unary operator on its left and looser than
    /// one on its right: `-a ** -b` is `-(a ** (-b))`.
    fn parse_power(&mut self) -> ParseResult<NodeId> {
        let left = self.parse_primary()?;
        if !self.check(&TokenKind::DoubleStar) {
            return Ok(left);
        }
        self.advance();
        let right = self.nested(Self::parse_factor)?;
        Ok(self.tree.alloc(Node::BinOp {
            left,
            op: ArithmeticOp::Pow,
            right,
        }))
    }

    fn parse_primary(&mut self) -> ParseResult<NodeId> {
        let mut expr = self.parse_atom()?;
        loop {
            match self.kind() {
                TokenKind::LParen => {
                    self.advance();
                    expr = self.parse_call(expr)?;
                }
                TokenKind::Dot => {
                    self.advance();
                    let attr = self.expect_name()?;
                    expr = self.tree.alloc(Node::Attribute {
                        value: expr,
                        attr,
                        ctx: ExprContext::Load,
                    });
                }
                TokenKind::LBracket => {
                    self.advance();
                    let slice = self.parse_slice_list()?;
                    self.expect(&TokenKind::RBracket, "']'")?;
                    expr = self.tree.alloc(Node::Subscript {
                        value: expr,
                        slice,
                        ctx: ExprContext::Load,
                    });
                }
                _ => return Ok(expr),
            }
        }
    }

    fn parse_call(&mut self, func: NodeId) -> ParseResult<NodeId> {
        let mut args = Vec::new();
        let mut keywords = Vec::new();
        while !self.check(&TokenKind::RParen) {
            if matches!(self.kind(), TokenKind::Star | TokenKind::DoubleStar) {
                return Err(ParseError::unsupported("argument unpacking", self.span()));
            }
            if matches!(self.kind(), TokenKind::Name(_)) && self.peek_kind(1) == &TokenKind::Equal
            {
                let span = self.span();
                let arg = self.expect_name()?;
                if keywords.iter().any(|keyword: &Keyword| keyword.arg == arg) {
                    return Err(ParseError::new(
                        format!("keyword argument repeated: {}", self.tree.from_sym(arg)),
                        span,
                    ));
                }
                self.advance();
                let value = self.parse_test()?;
                keywords.push(Keyword { arg, value });
            } else {
                if !keywords.is_empty() {
                    return Err(ParseError::new(
                        "positional argument follows keyword argument",
                        self.span(),
                    ));
                }
                args.push(self.parse_test()?);
                if self.check(&TokenKind::For) {
                    return Err(ParseError::unsupported("generator expressions", self.span()));
                }
            }
            if !self.check(&TokenKind::Comma) {
                break;
            }
            self.advance();
        }
        self.expect(&TokenKind::RParen, "')'")?;
        Ok(self.tree.alloc(Node::Call {
            func,
            args,
            keywords,
        }))
    }

    fn parse_slice_list(&mut self) -> ParseResult<NodeId> {
        let first = self.parse_slice_item()?;
        if !self.check(&TokenKind::Comma) {
            return Ok(first);
        }
        let mut elts = vec![first];
        while self.check(&TokenKind::Comma) {
            self.advance();
            if self.check(&TokenKind::RBracket) {
                break;
            }
            elts.push(self.parse_slice_item()?);
        }
        Ok(self.tree.alloc(Node::Tuple {
            elts,
            ctx: ExprContext::Load,
        }))
    }

    fn parse_slice_item(&mut self) -> ParseResult<NodeId> {
        let lower = if self.check(&TokenKind::Colon) {
            None
        } else {
            Some(self.parse_test()?)
        };
        if !self.check(&TokenKind::Colon) {
            return lower.ok_or_else(|| self.error_here("expression"));
        }
        self.advance();
        let upper = self.parse_optional_test()?;
        let step = if self.check(&TokenKind::Colon) {
            self.advance();
            self.parse_optional_test()?
        } else {
            None
        };
        Ok(self.tree.alloc(Node::Slice { lower, upper, step }))
    }

    fn parse_optional_test(&mut self) -> ParseResult<Option<NodeId>> {
        if self.starts_expression() {
            Ok(Some(self.parse_test()?))
        } else {
            Ok(None)
        }
    }

    fn parse_atom(&mut self) -> ParseResult<NodeId> {
        let node = match self.kind().clone() {
            TokenKind::Name(name) => {
                self.advance();
                Node::Name {
                    id: self.tree.to_sym(name),
                    ctx: ExprContext::Load,
                }
            }
            TokenKind::Int(i) => {
                self.advance();
                Node::Constant(Constant::Int(i))
            }
            TokenKind::Float(f) => {
                self.advance();
                Node::Constant(Constant::Float(f))
            }
            TokenKind::Str(first) => {
                self.advance();
                let mut value = first;
                while let TokenKind::Str(next) = self.kind() {
                    value.push_str(next);
                    self.advance();
                }
                Node::Constant(Constant::Str(value))
            }
            TokenKind::None => {
                self.advance();
                Node::Constant(Constant::None)
            }
            TokenKind::True => {
                self.advance();
                Node::Constant(Constant::Bool(true))
            }
            TokenKind::False => {
                self.advance();
                Node::Constant(Constant::Bool(false))
            }
            TokenKind::LParen => {
                self.advance();
                return self.parse_parenthesized();
            }
            TokenKind::LBracket => {
                self.advance();
                let elts = self.parse_elements(&TokenKind::RBracket, "list comprehensions")?;
                self.expect(&TokenKind::RBracket, "']'")?;
                Node::List {
                    elts,
                    ctx: ExprContext::Load,
                }
            }
            TokenKind::LBrace => {
                self.advance();
                return self.parse_braced();
            }
            _ => return Err(self.error_here("expression")),
        };
        Ok(self.tree.alloc(node))
    }

    /// After `(`: the empty tuple, a tuple, or a parenthesized expression.
    fn parse_parenthesized(&mut self) -> ParseResult<NodeId> {
        if self.check(&TokenKind::RParen) {
            self.advance();
            return Ok(self.tree.alloc(Node::Tuple {
                elts: Vec::new(),
                ctx: ExprContext::Load,
            }));
        }
        let first = self.parse_test()?;
        if self.check(&TokenKind::For) {
            return Err(ParseError::unsupported("generator expressions", self.span()));
        }
        if !self.check(&TokenKind::Comma) {
            self.expect(&TokenKind::RParen, "')'")?;
            return Ok(first);
        }
        let mut elts = vec![first];
        while self.check(&TokenKind::Comma) {
            self.advance();
            if self.check(&TokenKind::RParen) {
                break;
            }
            elts.push(self.parse_test()?);
        }
        self.expect(&TokenKind::RParen, "')'")?;
        Ok(self.tree.alloc(Node::Tuple {
            elts,
            ctx: ExprContext::Load,
        }))
    }

    /// After `{`: a dict or a set.
    fn parse_braced(&mut self) -> ParseResult<NodeId> {
        if self.check(&TokenKind::RBrace) {
            self.advance();
            return Ok(self.tree.alloc(Node::Dict {
                keys: Vec::new(),
                values: Vec::new(),
            }));
        }
        if self.check(&TokenKind::DoubleStar) {
            return Err(ParseError::unsupported("dict unpacking", self.span()));
        }
        let first = self.parse_test()?;
        if !self.check(&TokenKind::Colon) {
            let mut elts = vec![first];
            if self.check(&TokenKind::For) {
                return Err(ParseError::unsupported("set comprehensions", self.span()));
            }
            if self.check(&TokenKind::Comma) {
                self.advance();
                elts.extend(self.parse_elements(&TokenKind::RBrace, "set comprehensions")?);
            }
            self.expect(&TokenKind::RBrace, "'}'")?;
            return Ok(self.tree.alloc(Node::Set { elts }));
        }

        self.advance();
        let mut keys = vec![first];
        let mut values = vec![self.parse_test()?];
        if self.check(&TokenKind::For) {
            return Err(ParseError::unsupported("dict comprehensions", self.span()));
        }
        while self.check(&TokenKind::Comma) {
            self.advance();
            if self.check(&TokenKind::RBrace) {
                break;
            }
            if self.check(&TokenKind::DoubleStar) {
                return Err(ParseError::unsupported("dict unpacking", self.span()));
            }
            keys.push(self.parse_test()?);
            self.expect(&TokenKind::Colon, "':'")?;
            values.push(self.parse_test()?);
        }
        self.expect(&TokenKind::RBrace, "'}'")?;
        Ok(self.tree.alloc(Node::Dict { keys, values }))
    }

    /// Comma-separated tests up to (not including) `closing`, trailing comma
    /// allowed.
    fn parse_elements(
        &mut self,
        closing: &TokenKind<'_>,
        comprehension: &str,
    ) -> ParseResult<Vec<NodeId>> {
        let mut elts = Vec::new();
        while !self.check(closing) {
            elts.push(self.parse_test()?);
            if self.check(&TokenKind::For) {
                return Err(ParseError::unsupported(comprehension, self.span()));
            }
            if !self.check(&TokenKind::Comma) {
                break;
            }
            self.advance();
        }
        Ok(elts)
    }

    // ----------------------------------------------------------------------
    // Token helpers
    // ----------------------------------------------------------------------

    fn current(&self) -> &Token<'a> {
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[self.pos.min(last)]
    }

    fn kind(&self) -> &TokenKind<'a> {
        &self.current().kind
    }

    fn peek_kind(&self, n: usize) -> &TokenKind<'a> {
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[(self.pos + n).min(last)].kind
    }

    fn span(&self) -> Span {
        self.current().span
    }

    fn check(&self, kind: &TokenKind<'_>) -> bool {
        self.kind() == kind
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }

    fn expect(&mut self, kind: &TokenKind<'_>, expected: &str) -> ParseResult<Span> {
        if !self.check(kind) {
            return Err(self.error_here(expected));
        }
        let span = self.span();
        self.advance();
        Ok(span)
    }

    fn expect_name(&mut self) -> ParseResult<crate::symbol::Symbol> {
        match *self.kind() {
            TokenKind::Name(name) => {
                self.advance();
                Ok(self.tree.to_sym(name))
            }
            _ => Err(self.error_here("name")),
        }
    }

    fn starts_expression(&self) -> bool {
        matches!(
            self.kind(),
            TokenKind::Name(_)
                | TokenKind::Int(_)
                | TokenKind::Float(_)
                | TokenKind::Str(_)
                | TokenKind::None
                | TokenKind::True
                | TokenKind::False
                | TokenKind::LParen
                | TokenKind::LBracket
                | TokenKind::LBrace
                | TokenKind::Plus
                | TokenKind::Minus
                | TokenKind::Tilde
                | TokenKind::Not
                | TokenKind::Lambda
        )
    }

    fn error_here(&self, expected: &str) -> ParseError {
        match self.kind() {
            TokenKind::Reserved(word) => ParseError::unsupported(&format!("'{word}'"), self.span()),
            found => ParseError::unexpected(expected, &found.describe(), self.span()),
        }
    }

    /// Run `parse` one recursion level deeper.
    fn nested<T>(&mut self, parse: fn(&mut Self) -> ParseResult<T>) -> ParseResult<T> {
        if self.depth >= MAX_DEPTH {
            return Err(ParseError::new(
                "too many nested expressions or blocks",
                self.span(),
            ));
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }
}
