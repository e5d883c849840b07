use std::fmt;

use crate::tree::Node;

/// Node kinds the engine knows how to mutate.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum NodeKind {
    IfExp,
    Lambda,
    Dict,
    BoolOp,
    BinOp,
    UnaryOp,
    AugAssign,
    /// Load-context name reference, handled by renaming.
    Name,
}

impl NodeKind {
    pub const ALL: [Self; 8] = [
        Self::IfExp,
        Self::Lambda,
        Self::Dict,
        Self::BoolOp,
        Self::BinOp,
        Self::UnaryOp,
        Self::AugAssign,
        Self::Name,
    ];

    /// Classify `node`, or `None` when no mutation applies to its kind.
    pub fn of(node: &Node) -> Option<Self> {
        let kind = match node {
            Node::IfExp { .. } => Self::IfExp,
            Node::Lambda { .. } => Self::Lambda,
            Node::Dict { .. } => Self::Dict,
            Node::BoolOp { .. } => Self::BoolOp,
            Node::BinOp { .. } => Self::BinOp,
            Node::UnaryOp { .. } => Self::UnaryOp,
            Node::AugAssign { .. } => Self::AugAssign,
            Node::Name { .. } => Self::Name,
            _ => return None,
        };
        Some(kind)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::IfExp => "conditional-expression",
            Self::Lambda => "anonymous-function",
            Self::Dict => "dict-literal",
            Self::BoolOp => "boolean-op",
            Self::BinOp => "binary-op",
            Self::UnaryOp => "unary-op",
            Self::AugAssign => "augmented-assign",
            Self::Name => "name-reference",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{Constant, ExprContext, Tree};

    #[test]
    fn test_classifies_supported_kinds() {
        let mut tree = Tree::new();
        let id = tree.to_sym("x");
        let name = Node::Name {
            id,
            ctx: ExprContext::Load,
        };
        assert_eq!(NodeKind::of(&name), Some(NodeKind::Name));
        assert_eq!(
            NodeKind::of(&Node::Dict {
                keys: vec![],
                values: vec![]
            }),
            Some(NodeKind::Dict)
        );
        assert_eq!(NodeKind::of(&Node::Constant(Constant::None)), None);
        assert_eq!(NodeKind::of(&Node::Pass), None);
    }

    #[test]
    fn test_display_names() {
        assert_eq!(NodeKind::IfExp.to_string(), "conditional-expression");
        assert_eq!(NodeKind::AugAssign.to_string(), "augmented-assign");
    }
}
