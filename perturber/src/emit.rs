//! Renders a [`Tree`] back to Python source.
//!
//! Output is what `ast.unparse` would print for the same tree: four-space
//! indentation, `elif` chains, tuples always parenthesised and otherwise only
//! the parentheses the operator precedence requires.

use crate::tree::{ArithmeticOp, Constant, LogicalOp, Node, NodeId, Parameters, PrefixOp, Tree};

/// Binding strength, loosest first.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
    Tuple,
    Test,
    Or,
    And,
    Not,
    Cmp,
    BitOr,
    BitXor,
    BitAnd,
    Shift,
    Arith,
    Term,
    Factor,
    Power,
    Primary,
    Atom,
}

impl Precedence {
    fn next(self) -> Self {
        use Precedence::*;
        match self {
            Tuple => Test,
            Test => Or,
            Or => And,
            And => Not,
            Not => Cmp,
            Cmp => BitOr,
            BitOr => BitXor,
            BitXor => BitAnd,
            BitAnd => Shift,
            Shift => Arith,
            Arith => Term,
            Term => Factor,
            Factor => Power,
            Power => Primary,
            Primary | Atom => Atom,
        }
    }

    fn of_logical(op: LogicalOp) -> Self {
        match op {
            LogicalOp::Or => Self::Or,
            LogicalOp::And => Self::And,
        }
    }

    fn of_arithmetic(op: ArithmeticOp) -> Self {
        match op {
            ArithmeticOp::BitOr => Self::BitOr,
            ArithmeticOp::BitXor => Self::BitXor,
            ArithmeticOp::BitAnd => Self::BitAnd,
            ArithmeticOp::LShift | ArithmeticOp::RShift => Self::Shift,
            ArithmeticOp::Add | ArithmeticOp::Sub => Self::Arith,
            ArithmeticOp::Mult | ArithmeticOp::Div | ArithmeticOp::Mod | ArithmeticOp::FloorDiv => {
                Self::Term
            }
            ArithmeticOp::Pow => Self::Power,
        }
    }

    fn of_prefix(op: PrefixOp) -> Self {
        match op {
            PrefixOp::Not => Self::Not,
            PrefixOp::Invert | PrefixOp::UAdd | PrefixOp::USub => Self::Factor,
        }
    }

    fn of(node: &Node) -> Self {
        match node {
            Node::Lambda { .. } | Node::IfExp { .. } => Self::Test,
            Node::BoolOp { op, .. } => Self::of_logical(*op),
            Node::UnaryOp { op, .. } => Self::of_prefix(*op),
            Node::Compare { .. } => Self::Cmp,
            Node::BinOp { op, .. } => Self::of_arithmetic(*op),
            _ => Self::Atom,
        }
    }
}

struct Emitter<'t> {
    tree: &'t Tree,
    indent: usize,
    output: String,
}

impl<'t> Emitter<'t> {
    fn new(tree: &'t Tree) -> Self {
        Self {
            tree,
            indent: 0,
            output: String::new(),
        }
    }

    fn emit_inline(&mut self, s: &str) {
        self.output.push_str(s);
    }

    /// Start a new line at the current indentation.
    fn emit_block(&mut self, s: &str) {
        if !self.output.is_empty() {
            self.output.push('\n');
        }
        for _ in 0..self.indent {
            self.output.push_str("    ");
        }
        self.output.push_str(s);
    }

    fn enter_block(&mut self) {
        self.indent += 1
    }

    fn exit_block(&mut self) {
        self.indent -= 1
    }

    fn name(&mut self, sym: crate::symbol::Symbol) {
        let tree = self.tree;
        self.emit_inline(tree.from_sym(sym));
    }

    // ----------------------------------------------------------------------
    // Statements
    // ----------------------------------------------------------------------

    fn suite(&mut self, body: &[NodeId]) {
        self.emit_inline(":");
        self.enter_block();
        if body.is_empty() {
            self.emit_block("pass");
        }
        for &stmt in body {
            self.statement(stmt);
        }
        self.exit_block();
    }

    fn statement(&mut self, id: NodeId) {
        let tree = self.tree;
        match tree.node(id) {
            Node::Module { body } => {
                for &stmt in body {
                    self.statement(stmt);
                }
            }
            Node::FunctionDef { name, params, body } => {
                self.emit_block("def ");
                self.name(*name);
                self.emit_inline("(");
                self.parameters(params);
                self.emit_inline(")");
                self.suite(body);
            }
            Node::Return { value } => {
                self.emit_block("return");
                if let Some(value) = value {
                    self.emit_inline(" ");
                    self.expression(*value, Precedence::Tuple);
                }
            }
            Node::Assign { targets, value } => {
                self.emit_block("");
                for &target in targets {
                    self.expression(target, Precedence::Tuple);
                    self.emit_inline(" = ");
                }
                self.expression(*value, Precedence::Tuple);
            }
            Node::AugAssign { target, op, value } => {
                self.emit_block("");
                self.expression(*target, Precedence::Tuple);
                self.emit_inline(" ");
                self.emit_inline(op.symbol());
                self.emit_inline("= ");
                self.expression(*value, Precedence::Tuple);
            }
            Node::For { target, iter, body } => {
                self.emit_block("for ");
                self.expression(*target, Precedence::Tuple);
                self.emit_inline(" in ");
                self.expression(*iter, Precedence::Tuple);
                self.suite(body);
            }
            Node::While { test, body } => {
                self.emit_block("while ");
                self.expression(*test, Precedence::Test);
                self.suite(body);
            }
            Node::If { test, body, orelse } => {
                self.emit_block("if ");
                self.expression(*test, Precedence::Test);
                self.suite(body);
                self.else_chain(orelse);
            }
            Node::Assert { test, msg } => {
                self.emit_block("assert ");
                self.expression(*test, Precedence::Test);
                if let Some(msg) = msg {
                    self.emit_inline(", ");
                    self.expression(*msg, Precedence::Test);
                }
            }
            Node::Raise { exc } => {
                self.emit_block("raise");
                if let Some(exc) = exc {
                    self.emit_inline(" ");
                    self.expression(*exc, Precedence::Test);
                }
            }
            Node::Expr { value } => {
                self.emit_block("");
                self.expression(*value, Precedence::Tuple);
            }
            Node::Pass => self.emit_block("pass"),
            Node::Break => self.emit_block("break"),
            Node::Continue => self.emit_block("continue"),
            _ => {
                self.emit_block("");
                self.expression(id, Precedence::Tuple);
            }
        }
    }

    /// A lone `if` in an else branch prints as `elif`.
    fn else_chain(&mut self, orelse: &[NodeId]) {
        let tree = self.tree;
        let mut orelse = orelse;
        loop {
            match orelse {
                [] => return,
                [only] => {
                    if let Node::If { test, body, orelse: next } = tree.node(*only) {
                        self.emit_block("elif ");
                        self.expression(*test, Precedence::Test);
                        self.suite(body);
                        orelse = next.as_slice();
                        continue;
                    }
                }
                _ => {}
            }
            self.emit_block("else");
            self.suite(orelse);
            return;
        }
    }

    fn parameters(&mut self, params: &Parameters) {
        let first_default = params.names.len() - params.defaults.len().min(params.names.len());
        for (i, &name) in params.names.iter().enumerate() {
            if i > 0 {
                self.emit_inline(", ");
            }
            self.name(name);
            if i >= first_default {
                self.emit_inline("=");
                self.expression(params.defaults[i - first_default], Precedence::Test);
            }
        }
    }

    // ----------------------------------------------------------------------
    // Expressions
    // ----------------------------------------------------------------------

    fn expression(&mut self, id: NodeId, level: Precedence) {
        let tree = self.tree;
        let node = tree.node(id);
        let parens = Precedence::of(node) < level;
        if parens {
            self.emit_inline("(");
        }

        match node {
            Node::BoolOp { op, values } => {
                let operand = Precedence::of_logical(*op).next();
                for (i, &value) in values.iter().enumerate() {
                    if i > 0 {
                        self.emit_inline(" ");
                        self.emit_inline(op.symbol());
                        self.emit_inline(" ");
                    }
                    self.expression(value, operand);
                }
            }
            Node::BinOp { left, op, right } => {
                let own = Precedence::of_arithmetic(*op);
                let (left_level, right_level) = if *op == ArithmeticOp::Pow {
                    (own.next(), own)
                } else {
                    (own, own.next())
                };
                self.expression(*left, left_level);
                self.emit_inline(" ");
                self.emit_inline(op.symbol());
                self.emit_inline(" ");
                self.expression(*right, right_level);
            }
            Node::UnaryOp { op, operand } => {
                self.emit_inline(op.symbol());
                self.expression(*operand, Precedence::of_prefix(*op));
            }
            Node::Lambda { params, body } => {
                self.emit_inline("lambda");
                if !params.names.is_empty() {
                    self.emit_inline(" ");
                    self.parameters(params);
                }
                self.emit_inline(": ");
                self.expression(*body, Precedence::Test);
            }
            Node::IfExp { test, body, orelse } => {
                self.expression(*body, Precedence::Or);
                self.emit_inline(" if ");
                self.expression(*test, Precedence::Or);
                self.emit_inline(" else ");
                self.expression(*orelse, Precedence::Test);
            }
            Node::Dict { keys, values } => {
                self.emit_inline("{");
                for (i, (&key, &value)) in keys.iter().zip(values).enumerate() {
                    if i > 0 {
                        self.emit_inline(", ");
                    }
                    self.expression(key, Precedence::Test);
                    self.emit_inline(": ");
                    self.expression(value, Precedence::Test);
                }
                self.emit_inline("}");
            }
            Node::Set { elts } => {
                if elts.is_empty() {
                    // `{}` is a dict.
                    self.emit_inline("{*()}");
                } else {
                    self.emit_inline("{");
                    self.items(elts);
                    self.emit_inline("}");
                }
            }
            Node::Compare {
                left,
                ops,
                comparators,
            } => {
                self.expression(*left, Precedence::BitOr);
                for (op, &comparator) in ops.iter().zip(comparators) {
                    self.emit_inline(" ");
                    self.emit_inline(op.symbol());
                    self.emit_inline(" ");
                    self.expression(comparator, Precedence::BitOr);
                }
            }
            Node::Call {
                func,
                args,
                keywords,
            } => {
                self.expression(*func, Precedence::Atom);
                self.emit_inline("(");
                self.items(args);
                for (i, keyword) in keywords.iter().enumerate() {
                    if i > 0 || !args.is_empty() {
                        self.emit_inline(", ");
                    }
                    self.name(keyword.arg);
                    self.emit_inline("=");
                    self.expression(keyword.value, Precedence::Test);
                }
                self.emit_inline(")");
            }
            Node::Constant(constant) => self.emit_inline(&constant.repr()),
            Node::Attribute { value, attr, .. } => {
                if let Node::Constant(Constant::Int(_) | Constant::Float(_)) = tree.node(*value) {
                    self.emit_inline("(");
                    self.expression(*value, Precedence::Atom);
                    self.emit_inline(")");
                } else {
                    self.expression(*value, Precedence::Atom);
                }
                self.emit_inline(".");
                self.name(*attr);
            }
            Node::Subscript { value, slice, .. } => {
                self.expression(*value, Precedence::Atom);
                self.emit_inline("[");
                match tree.node(*slice) {
                    Node::Tuple { elts, .. } if !elts.is_empty() => {
                        self.items(elts);
                        if elts.len() == 1 {
                            self.emit_inline(",");
                        }
                    }
                    _ => self.expression(*slice, Precedence::Tuple),
                }
                self.emit_inline("]");
            }
            Node::Name { id, .. } => self.name(*id),
            Node::List { elts, .. } => {
                self.emit_inline("[");
                self.items(elts);
                self.emit_inline("]");
            }
            Node::Tuple { elts, .. } => {
                self.emit_inline("(");
                self.items(elts);
                if elts.len() == 1 {
                    self.emit_inline(",");
                }
                self.emit_inline(")");
            }
            Node::Slice { lower, upper, step } => {
                if let Some(lower) = lower {
                    self.expression(*lower, Precedence::Test);
                }
                self.emit_inline(":");
                if let Some(upper) = upper {
                    self.expression(*upper, Precedence::Test);
                }
                if let Some(step) = step {
                    self.emit_inline(":");
                    self.expression(*step, Precedence::Test);
                }
            }
            // Statements never appear in expression position.
            _ => {}
        }

        if parens {
            self.emit_inline(")");
        }
    }

    fn items(&mut self, elts: &[NodeId]) {
        for (i, &elt) in elts.iter().enumerate() {
            if i > 0 {
                self.emit_inline(", ");
            }
            self.expression(elt, Precedence::Test);
        }
    }
}

/// Render `tree` as Python source without a trailing newline.
pub fn render(tree: &Tree) -> String {
    let mut e = Emitter::new(tree);
    e.statement(tree.root());
    e.output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn roundtrip(source: &str) -> String {
        render(&parse(source).expect("parse should succeed"))
    }

    fn assert_stable(source: &str) {
        let tree = parse(source).expect("parse should succeed");
        let rendered = render(&tree);
        let reparsed = parse(&rendered)
            .unwrap_or_else(|e| panic!("rendered {rendered:?} does not parse: {e}"));
        assert_eq!(tree.dump(), reparsed.dump(), "for {source:?}");
        assert_eq!(render(&reparsed), rendered);
    }

    #[test]
    fn test_canonical_text_is_unchanged() {
        for source in [
            "x = a + b * c",
            "(a + b) * c",
            "a - (b - c)",
            "a ** b ** c",
            "(a ** b) ** c",
            "not (a and b)",
            "a or b and c",
            "(a or b) and c",
            "f(x)(y).z[1:2, ::3]",
            "(1).real",
            "x = (1,)",
            "d[a,]",
            "d[()]",
            "lambda: 0",
            "lambda x, y=1: x",
            "x = a if b else c",
            "(lambda: 1) if x else lambda: 2",
            "f(a, key=b)",
            "a < b is not c not in d",
            "{1: 'a', 2: 'b'}",
            "{}",
            "{1, 2}",
            "[]",
            "-x ** 2",
            "(-x) ** 2",
            "x ** (-y)",
            "~a & b",
            "x += 1",
        ] {
            assert_eq!(roundtrip(source), source);
        }
    }

    #[test]
    fn test_redundant_parentheses_are_dropped() {
        assert_eq!(roundtrip("(a)"), "a");
        assert_eq!(roundtrip("-(a ** b)"), "-a ** b");
        assert_eq!(roundtrip("a + (b * c)"), "a + b * c");
        assert_eq!(roundtrip("x = 1, 2"), "x = (1, 2)");
        assert_eq!(roundtrip("'a' 'b'"), "'ab'");
        assert_eq!(roundtrip("0x10"), "16");
        assert_eq!(roundtrip("a if b else (c if d else e)"), "a if b else c if d else e");
    }

    #[test]
    fn test_blocks_and_elif() {
        let source = "\
def f(n, step=1):
    total = 0
    for (i, x) in pairs:
        if x > n:
            break
        elif x:
            continue
        else:
            total += x
    while total:
        total -= step
    return total";
        assert_eq!(roundtrip(source), source);
        assert_eq!(roundtrip("if x: y = 1"), "if x:\n    y = 1");
    }

    #[test]
    fn test_else_with_several_statements_is_not_elif() {
        let source = "if a:\n    pass\nelse:\n    if b:\n        pass\n    c\n";
        assert_eq!(
            roundtrip(source),
            "if a:\n    pass\nelse:\n    if b:\n        pass\n    c"
        );
    }

    #[test]
    fn test_mutated_operators_keep_meaning() {
        let mut tree = parse("a + b * c").expect("parse should succeed");
        let add = tree
            .walk()
            .find(|&id| matches!(tree.node(id), Node::BinOp { op: ArithmeticOp::Add, .. }))
            .expect("addition present");
        if let Node::BinOp { op, .. } = tree.node_mut(add) {
            *op = ArithmeticOp::Pow;
        }
        assert_eq!(render(&tree), "a ** (b * c)");

        let mut tree = parse("-x + 1").expect("parse should succeed");
        let neg = tree
            .walk()
            .find(|&id| matches!(tree.node(id), Node::UnaryOp { .. }))
            .expect("negation present");
        if let Node::UnaryOp { op, .. } = tree.node_mut(neg) {
            *op = PrefixOp::Not;
        }
        assert_eq!(render(&tree), "(not x) + 1");
    }

    #[test]
    fn test_render_is_stable_across_constructs() {
        for source in [
            "x, y = y, x",
            "a = b = [1, 2.5, 'it\\'s', None, True]",
            "print(f() if 0 else g)",
            "assert x, 'boom'",
            "raise ValueError('bad')",
            "obj.attr[1:][::2] = {k: v}",
            "lambda x=lambda: 1: x",
            "not not x",
            "- - x",
            "a if b else c if d else e",
            "(a if b else c) if d else e",
            "1e309",
            "x = 1.5e-07",
            "f(lambda: 0, k=lambda y: y)",
            "a[b:c, d]",
            "while x: x -= 1; y = 2",
        ] {
            assert_stable(source);
        }
    }
}
