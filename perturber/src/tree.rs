//! Arena-owned syntax tree for the supported Python subset.
//!
//! Every node lives in the tree's [`Arena`]; parents refer to children by
//! [`NodeId`]. Mutation never reparents anything, it rewrites fields of a
//! node in place. Nodes replaced by a mutation stay allocated but are no
//! longer reachable from the root, so [`Tree::walk`] never yields them.

use std::collections::VecDeque;

use la_arena::{Arena, Idx};

use crate::symbol::{Symbol, SymbolTable};

pub type NodeId = Idx<Node>;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum LogicalOp {
    And,
    Or,
}

impl LogicalOp {
    pub const ALL: [Self; 2] = [Self::And, Self::Or];

    pub fn name(self) -> &'static str {
        match self {
            Self::And => "And",
            Self::Or => "Or",
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::And => "and",
            Self::Or => "or",
        }
    }
}

/// Operators shared by binary operations and augmented assignment.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ArithmeticOp {
    Add,
    Sub,
    Mult,
    Div,
    Mod,
    Pow,
    LShift,
    RShift,
    BitOr,
    BitXor,
    BitAnd,
    FloorDiv,
}

impl ArithmeticOp {
    pub const ALL: [Self; 12] = [
        Self::Add,
        Self::Sub,
        Self::Mult,
        Self::Div,
        Self::Mod,
        Self::Pow,
        Self::LShift,
        Self::RShift,
        Self::BitOr,
        Self::BitXor,
        Self::BitAnd,
        Self::FloorDiv,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Add => "Add",
            Self::Sub => "Sub",
            Self::Mult => "Mult",
            Self::Div => "Div",
            Self::Mod => "Mod",
            Self::Pow => "Pow",
            Self::LShift => "LShift",
            Self::RShift => "RShift",
            Self::BitOr => "BitOr",
            Self::BitXor => "BitXor",
            Self::BitAnd => "BitAnd",
            Self::FloorDiv => "FloorDiv",
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mult => "*",
            Self::Div => "/",
            Self::Mod => "%",
            Self::Pow => "**",
            Self::LShift => "<<",
            Self::RShift => ">>",
            Self::BitOr => "|",
            Self::BitXor => "^",
            Self::BitAnd => "&",
            Self::FloorDiv => "//",
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum PrefixOp {
    Invert,
    Not,
    UAdd,
    USub,
}

impl PrefixOp {
    pub const ALL: [Self; 4] = [Self::Invert, Self::Not, Self::UAdd, Self::USub];

    pub fn name(self) -> &'static str {
        match self {
            Self::Invert => "Invert",
            Self::Not => "Not",
            Self::UAdd => "UAdd",
            Self::USub => "USub",
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::Invert => "~",
            Self::Not => "not ",
            Self::UAdd => "+",
            Self::USub => "-",
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ComparisonOp {
    Eq,
    NotEq,
    Lt,
    LtE,
    Gt,
    GtE,
    Is,
    IsNot,
    In,
    NotIn,
}

impl ComparisonOp {
    pub fn name(self) -> &'static str {
        match self {
            Self::Eq => "Eq",
            Self::NotEq => "NotEq",
            Self::Lt => "Lt",
            Self::LtE => "LtE",
            Self::Gt => "Gt",
            Self::GtE => "GtE",
            Self::Is => "Is",
            Self::IsNot => "IsNot",
            Self::In => "In",
            Self::NotIn => "NotIn",
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::NotEq => "!=",
            Self::Lt => "<",
            Self::LtE => "<=",
            Self::Gt => ">",
            Self::GtE => ">=",
            Self::Is => "is",
            Self::IsNot => "is not",
            Self::In => "in",
            Self::NotIn => "not in",
        }
    }
}

/// Whether a reference reads (`Load`) or binds (`Store`) its target.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ExprContext {
    Load,
    Store,
}

impl ExprContext {
    pub fn name(self) -> &'static str {
        match self {
            Self::Load => "Load",
            Self::Store => "Store",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Constant {
    None,
    Bool(bool),
    /// Literals are unsigned; `-1` is a `UnaryOp` around `1`.
    Int(u128),
    Float(f64),
    Str(String),
}

impl Constant {
    /// Python source spelling of the constant.
    pub fn repr(&self) -> String {
        match self {
            Self::None => "None".to_string(),
            Self::Bool(true) => "True".to_string(),
            Self::Bool(false) => "False".to_string(),
            Self::Int(i) => i.to_string(),
            Self::Float(f) => repr_float(*f),
            Self::Str(s) => repr_str(s),
        }
    }
}

fn repr_float(f: f64) -> String {
    if f.is_infinite() {
        // Smallest literal that overflows to infinity.
        "1e309".to_string()
    } else {
        format!("{f:?}")
    }
}

fn repr_str(s: &str) -> String {
    let quote = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };
    let mut out = String::with_capacity(s.len() + 2);
    out.push(quote);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if (c as u32) < 0x20 || c as u32 == 0x7f => {
                out.push_str(&format!("\\x{:02x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

/// Positional parameters of a `def` or `lambda`. `defaults` bind to the
/// trailing `names`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Parameters {
    pub names: Vec<Symbol>,
    pub defaults: Vec<NodeId>,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Keyword {
    pub arg: Symbol,
    pub value: NodeId,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    Module {
        body: Vec<NodeId>,
    },

    // Statements
    FunctionDef {
        name: Symbol,
        params: Parameters,
        body: Vec<NodeId>,
    },
    Return {
        value: Option<NodeId>,
    },
    Assign {
        targets: Vec<NodeId>,
        value: NodeId,
    },
    AugAssign {
        target: NodeId,
        op: ArithmeticOp,
        value: NodeId,
    },
    For {
        target: NodeId,
        iter: NodeId,
        body: Vec<NodeId>,
    },
    While {
        test: NodeId,
        body: Vec<NodeId>,
    },
    If {
        test: NodeId,
        body: Vec<NodeId>,
        orelse: Vec<NodeId>,
    },
    Assert {
        test: NodeId,
        msg: Option<NodeId>,
    },
    Raise {
        exc: Option<NodeId>,
    },
    Expr {
        value: NodeId,
    },
    Pass,
    Break,
    Continue,

    // Expressions
    BoolOp {
        op: LogicalOp,
        values: Vec<NodeId>,
    },
    BinOp {
        left: NodeId,
        op: ArithmeticOp,
        right: NodeId,
    },
    UnaryOp {
        op: PrefixOp,
        operand: NodeId,
    },
    Lambda {
        params: Parameters,
        body: NodeId,
    },
    IfExp {
        test: NodeId,
        body: NodeId,
        orelse: NodeId,
    },
    Dict {
        keys: Vec<NodeId>,
        values: Vec<NodeId>,
    },
    Set {
        elts: Vec<NodeId>,
    },
    Compare {
        left: NodeId,
        ops: Vec<ComparisonOp>,
        comparators: Vec<NodeId>,
    },
    Call {
        func: NodeId,
        args: Vec<NodeId>,
        keywords: Vec<Keyword>,
    },
    Constant(Constant),
    Attribute {
        value: NodeId,
        attr: Symbol,
        ctx: ExprContext,
    },
    Subscript {
        value: NodeId,
        slice: NodeId,
        ctx: ExprContext,
    },
    Name {
        id: Symbol,
        ctx: ExprContext,
    },
    List {
        elts: Vec<NodeId>,
        ctx: ExprContext,
    },
    Tuple {
        elts: Vec<NodeId>,
        ctx: ExprContext,
    },
    Slice {
        lower: Option<NodeId>,
        upper: Option<NodeId>,
        step: Option<NodeId>,
    },
}

impl Node {
    /// Direct children in field order.
    pub fn children(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        match self {
            Node::Module { body } => out.extend(body),
            Node::FunctionDef { params, body, .. } => {
                out.extend(&params.defaults);
                out.extend(body);
            }
            Node::Return { value } => out.extend(value),
            Node::Assign { targets, value } => {
                out.extend(targets);
                out.push(*value);
            }
            Node::AugAssign { target, value, .. } => {
                out.push(*target);
                out.push(*value);
            }
            Node::For { target, iter, body } => {
                out.push(*target);
                out.push(*iter);
                out.extend(body);
            }
            Node::While { test, body } => {
                out.push(*test);
                out.extend(body);
            }
            Node::If { test, body, orelse } => {
                out.push(*test);
                out.extend(body);
                out.extend(orelse);
            }
            Node::Assert { test, msg } => {
                out.push(*test);
                out.extend(msg);
            }
            Node::Raise { exc } => out.extend(exc),
            Node::Expr { value } => out.push(*value),
            Node::Pass | Node::Break | Node::Continue => {}
            Node::BoolOp { values, .. } => out.extend(values),
            Node::BinOp { left, right, .. } => {
                out.push(*left);
                out.push(*right);
            }
            Node::UnaryOp { operand, .. } => out.push(*operand),
            Node::Lambda { params, body } => {
                out.extend(&params.defaults);
                out.push(*body);
            }
            Node::IfExp { test, body, orelse } => {
                out.push(*test);
                out.push(*body);
                out.push(*orelse);
            }
            Node::Dict { keys, values } => {
                out.extend(keys);
                out.extend(values);
            }
            Node::Set { elts } | Node::List { elts, .. } | Node::Tuple { elts, .. } => {
                out.extend(elts)
            }
            Node::Compare {
                left, comparators, ..
            } => {
                out.push(*left);
                out.extend(comparators);
            }
            Node::Call {
                func,
                args,
                keywords,
            } => {
                out.push(*func);
                out.extend(args);
                out.extend(keywords.iter().map(|k| k.value));
            }
            Node::Constant(_) | Node::Name { .. } => {}
            Node::Attribute { value, .. } => out.push(*value),
            Node::Subscript { value, slice, .. } => {
                out.push(*value);
                out.push(*slice);
            }
            Node::Slice { lower, upper, step } => {
                out.extend(lower);
                out.extend(upper);
                out.extend(step);
            }
        }
        out
    }
}

pub struct Tree {
    nodes: Arena<Node>,
    root: NodeId,
    symbols: SymbolTable,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {
    /// Create a tree holding an empty module.
    pub fn new() -> Self {
        let mut nodes = Arena::new();
        let root = nodes.alloc(Node::Module { body: Vec::new() });
        Self {
            nodes,
            root,
            symbols: SymbolTable::new(),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn alloc(&mut self, node: Node) -> NodeId {
        self.nodes.alloc(node)
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id]
    }

    pub fn to_sym(&mut self, name: &str) -> Symbol {
        self.symbols.to_sym(name)
    }

    pub fn from_sym(&self, sym: Symbol) -> &str {
        self.symbols.from_sym(sym)
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// Identifier of a `Name` node.
    pub fn identifier(&self, id: NodeId) -> Option<Symbol> {
        match self.node(id) {
            Node::Name { id, .. } => Some(*id),
            _ => None,
        }
    }

    /// Levels in the subtree under `id`; a leaf has depth 1.
    pub fn depth(&self, id: NodeId) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(id, 1)];
        while let Some((id, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            stack.extend(self.node(id).children().into_iter().map(|child| (child, depth + 1)));
        }
        deepest
    }

    /// Breadth-first traversal of every node reachable from the root.
    pub fn walk(&self) -> Walk<'_> {
        Walk {
            tree: self,
            queue: VecDeque::from([self.root]),
        }
    }

    /// Canonical, position-free rendering of the tree structure. Two trees
    /// dump identically exactly when they are structurally equal.
    pub fn dump(&self) -> String {
        self.dump_node(self.root)
    }

    fn dump_list(&self, ids: &[NodeId]) -> String {
        let items: Vec<String> = ids.iter().map(|&id| self.dump_node(id)).collect();
        format!("[{}]", items.join(", "))
    }

    fn dump_opt(&self, id: Option<NodeId>) -> String {
        match id {
            Some(id) => self.dump_node(id),
            None => "None".to_string(),
        }
    }

    fn dump_name(&self, sym: Symbol) -> String {
        repr_str(self.from_sym(sym))
    }

    fn dump_params(&self, params: &Parameters) -> String {
        let args: Vec<String> = params
            .names
            .iter()
            .map(|&n| format!("arg(arg={})", self.dump_name(n)))
            .collect();
        format!(
            "arguments(args=[{}], defaults={})",
            args.join(", "),
            self.dump_list(&params.defaults)
        )
    }

    fn dump_node(&self, id: NodeId) -> String {
        match self.node(id) {
            Node::Module { body } => format!("Module(body={})", self.dump_list(body)),
            Node::FunctionDef { name, params, body } => format!(
                "FunctionDef(name={}, args={}, body={})",
                self.dump_name(*name),
                self.dump_params(params),
                self.dump_list(body)
            ),
            Node::Return { value } => format!("Return(value={})", self.dump_opt(*value)),
            Node::Assign { targets, value } => format!(
                "Assign(targets={}, value={})",
                self.dump_list(targets),
                self.dump_node(*value)
            ),
            Node::AugAssign { target, op, value } => format!(
                "AugAssign(target={}, op={}(), value={})",
                self.dump_node(*target),
                op.name(),
                self.dump_node(*value)
            ),
            Node::For { target, iter, body } => format!(
                "For(target={}, iter={}, body={})",
                self.dump_node(*target),
                self.dump_node(*iter),
                self.dump_list(body)
            ),
            Node::While { test, body } => format!(
                "While(test={}, body={})",
                self.dump_node(*test),
                self.dump_list(body)
            ),
            Node::If { test, body, orelse } => format!(
                "If(test={}, body={}, orelse={})",
                self.dump_node(*test),
                self.dump_list(body),
                self.dump_list(orelse)
            ),
            Node::Assert { test, msg } => format!(
                "Assert(test={}, msg={})",
                self.dump_node(*test),
                self.dump_opt(*msg)
            ),
            Node::Raise { exc } => format!("Raise(exc={})", self.dump_opt(*exc)),
            Node::Expr { value } => format!("Expr(value={})", self.dump_node(*value)),
            Node::Pass => "Pass()".to_string(),
            Node::Break => "Break()".to_string(),
            Node::Continue => "Continue()".to_string(),
            Node::BoolOp { op, values } => format!(
                "BoolOp(op={}(), values={})",
                op.name(),
                self.dump_list(values)
            ),
            Node::BinOp { left, op, right } => format!(
                "BinOp(left={}, op={}(), right={})",
                self.dump_node(*left),
                op.name(),
                self.dump_node(*right)
            ),
            Node::UnaryOp { op, operand } => format!(
                "UnaryOp(op={}(), operand={})",
                op.name(),
                self.dump_node(*operand)
            ),
            Node::Lambda { params, body } => format!(
                "Lambda(args={}, body={})",
                self.dump_params(params),
                self.dump_node(*body)
            ),
            Node::IfExp { test, body, orelse } => format!(
                "IfExp(test={}, body={}, orelse={})",
                self.dump_node(*test),
                self.dump_node(*body),
                self.dump_node(*orelse)
            ),
            Node::Dict { keys, values } => format!(
                "Dict(keys={}, values={})",
                self.dump_list(keys),
                self.dump_list(values)
            ),
            Node::Set { elts } => format!("Set(elts={})", self.dump_list(elts)),
            Node::Compare {
                left,
                ops,
                comparators,
            } => {
                let ops: Vec<String> = ops.iter().map(|op| format!("{}()", op.name())).collect();
                format!(
                    "Compare(left={}, ops=[{}], comparators={})",
                    self.dump_node(*left),
                    ops.join(", "),
                    self.dump_list(comparators)
                )
            }
            Node::Call {
                func,
                args,
                keywords,
            } => {
                let keywords: Vec<String> = keywords
                    .iter()
                    .map(|k| {
                        format!(
                            "keyword(arg={}, value={})",
                            self.dump_name(k.arg),
                            self.dump_node(k.value)
                        )
                    })
                    .collect();
                format!(
                    "Call(func={}, args={}, keywords=[{}])",
                    self.dump_node(*func),
                    self.dump_list(args),
                    keywords.join(", ")
                )
            }
            Node::Constant(c) => format!("Constant(value={})", c.repr()),
            Node::Attribute { value, attr, ctx } => format!(
                "Attribute(value={}, attr={}, ctx={}())",
                self.dump_node(*value),
                self.dump_name(*attr),
                ctx.name()
            ),
            Node::Subscript { value, slice, ctx } => format!(
                "Subscript(value={}, slice={}, ctx={}())",
                self.dump_node(*value),
                self.dump_node(*slice),
                ctx.name()
            ),
            Node::Name { id, ctx } => {
                format!("Name(id={}, ctx={}())", self.dump_name(*id), ctx.name())
            }
            Node::List { elts, ctx } => {
                format!("List(elts={}, ctx={}())", self.dump_list(elts), ctx.name())
            }
            Node::Tuple { elts, ctx } => {
                format!("Tuple(elts={}, ctx={}())", self.dump_list(elts), ctx.name())
            }
            Node::Slice { lower, upper, step } => format!(
                "Slice(lower={}, upper={}, step={})",
                self.dump_opt(*lower),
                self.dump_opt(*upper),
                self.dump_opt(*step)
            ),
        }
    }
}

/// Iterator returned by [`Tree::walk`].
pub struct Walk<'t> {
    tree: &'t Tree,
    queue: VecDeque<NodeId>,
}

impl Iterator for Walk<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.queue.pop_front()?;
        self.queue.extend(self.tree.node(id).children());
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(tree: &mut Tree, s: &str) -> NodeId {
        let id = tree.to_sym(s);
        tree.alloc(Node::Name {
            id,
            ctx: ExprContext::Load,
        })
    }

    fn set_body(tree: &mut Tree, stmts: Vec<NodeId>) {
        let root = tree.root();
        if let Node::Module { body } = tree.node_mut(root) {
            *body = stmts;
        }
    }

    #[test]
    fn test_new_tree_is_empty_module() {
        let tree = Tree::new();
        assert_eq!(tree.dump(), "Module(body=[])");
        assert_eq!(tree.walk().count(), 1);
    }

    #[test]
    fn test_walk_is_breadth_first() {
        let mut tree = Tree::new();
        let a = name(&mut tree, "a");
        let b = name(&mut tree, "b");
        let c = name(&mut tree, "c");
        let inner = tree.alloc(Node::BinOp {
            left: a,
            op: ArithmeticOp::Add,
            right: b,
        });
        let outer = tree.alloc(Node::BinOp {
            left: inner,
            op: ArithmeticOp::Mult,
            right: c,
        });
        let stmt = tree.alloc(Node::Expr { value: outer });
        set_body(&mut tree, vec![stmt]);

        let order: Vec<NodeId> = tree.walk().collect();
        assert_eq!(order, vec![tree.root(), stmt, outer, inner, c, a, b]);
    }

    #[test]
    fn test_depth_counts_levels() {
        let mut tree = Tree::new();
        let a = name(&mut tree, "a");
        let b = name(&mut tree, "b");
        let inner = tree.alloc(Node::UnaryOp {
            op: PrefixOp::USub,
            operand: a,
        });
        let outer = tree.alloc(Node::BinOp {
            left: inner,
            op: ArithmeticOp::Add,
            right: b,
        });
        let stmt = tree.alloc(Node::Expr { value: outer });
        set_body(&mut tree, vec![stmt]);

        assert_eq!(tree.depth(b), 1);
        assert_eq!(tree.depth(stmt), 4);
        assert_eq!(tree.depth(tree.root()), 5);
    }

    #[test]
    fn test_walk_skips_detached_nodes() {
        let mut tree = Tree::new();
        let x = name(&mut tree, "x");
        let _orphan = name(&mut tree, "orphan");
        let stmt = tree.alloc(Node::Expr { value: x });
        set_body(&mut tree, vec![stmt]);
        assert_eq!(tree.walk().count(), 3);
    }

    #[test]
    fn test_dump_shape() {
        let mut tree = Tree::new();
        let x = name(&mut tree, "x");
        let one = tree.alloc(Node::Constant(Constant::Int(1)));
        let sum = tree.alloc(Node::BinOp {
            left: x,
            op: ArithmeticOp::Add,
            right: one,
        });
        let stmt = tree.alloc(Node::Expr { value: sum });
        set_body(&mut tree, vec![stmt]);
        assert_eq!(
            tree.dump(),
            "Module(body=[Expr(value=BinOp(left=Name(id='x', ctx=Load()), op=Add(), \
             right=Constant(value=1)))])"
        );
    }

    #[test]
    fn test_identifier_only_for_names() {
        let mut tree = Tree::new();
        let x = name(&mut tree, "x");
        let c = tree.alloc(Node::Constant(Constant::None));
        assert_eq!(tree.identifier(x), tree.symbols().lookup("x"));
        assert!(tree.identifier(c).is_none());
    }

    #[test]
    fn test_constant_repr() {
        assert_eq!(Constant::None.repr(), "None");
        assert_eq!(Constant::Bool(true).repr(), "True");
        assert_eq!(Constant::Int(1 << 64).repr(), "18446744073709551616");
        assert_eq!(Constant::Float(1.0).repr(), "1.0");
        assert_eq!(Constant::Float(f64::INFINITY).repr(), "1e309");
        assert_eq!(Constant::Str("a".into()).repr(), "'a'");
        assert_eq!(Constant::Str("it's".into()).repr(), "\"it's\"");
        assert_eq!(Constant::Str("a\nb\\".into()).repr(), "'a\\nb\\\\'");
        assert_eq!(Constant::Str("'\"".into()).repr(), "'\\'\"'");
    }

    #[test]
    fn test_operator_sets() {
        assert_eq!(LogicalOp::ALL.len(), 2);
        assert_eq!(ArithmeticOp::ALL.len(), 12);
        assert_eq!(PrefixOp::ALL.len(), 4);
        assert_eq!(ArithmeticOp::FloorDiv.symbol(), "//");
        assert_eq!(PrefixOp::Not.symbol(), "not ");
    }
}
