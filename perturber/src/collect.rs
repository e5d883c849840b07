//! Candidate collection over the breadth-first walk of a tree.

use crate::kind::NodeKind;
use crate::registry::OperatorRegistry;
use crate::tree::{ExprContext, Node, NodeId, Tree};

/// Every reachable node satisfying `pred`, in walk order.
pub fn collect(tree: &Tree, pred: impl Fn(&Node) -> bool) -> Vec<NodeId> {
    tree.walk().filter(|&id| pred(tree.node(id))).collect()
}

/// Nodes whose kind has an operator in `registry`.
pub fn expressions(tree: &Tree, registry: &OperatorRegistry) -> Vec<NodeId> {
    collect(tree, |node| {
        NodeKind::of(node).is_some_and(|kind| registry.contains(kind))
    })
}

/// Name references that read a value.
pub fn variables(tree: &Tree) -> Vec<NodeId> {
    collect(tree, |node| {
        matches!(
            node,
            Node::Name {
                ctx: ExprContext::Load,
                ..
            }
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn kinds(tree: &Tree, ids: &[NodeId]) -> Vec<NodeKind> {
        ids.iter()
            .filter_map(|&id| NodeKind::of(tree.node(id)))
            .collect()
    }

    #[test]
    fn test_expressions_in_walk_order() {
        let tree = parse("x += (a if b else c) + (lambda: {})()").unwrap();
        let found = expressions(&tree, OperatorRegistry::global());
        assert_eq!(
            kinds(&tree, &found),
            vec![
                NodeKind::AugAssign,
                NodeKind::BinOp,
                NodeKind::IfExp,
                NodeKind::Lambda,
                NodeKind::Dict,
            ]
        );
    }

    #[test]
    fn test_variables_skip_store_context() {
        let tree = parse("y = x + z\nfor i in y:\n    i.attr = w").unwrap();
        let names: Vec<&str> = variables(&tree)
            .into_iter()
            .filter_map(|id| tree.identifier(id))
            .map(|sym| tree.from_sym(sym))
            .collect();
        assert_eq!(names, vec!["y", "x", "z", "w", "i"]);
    }

    #[test]
    fn test_nothing_to_collect() {
        let tree = parse("print('hello')").unwrap();
        assert!(expressions(&tree, OperatorRegistry::global()).is_empty());
        assert_eq!(variables(&tree).len(), 1);
        assert!(variables(&parse("1 + 2").unwrap()).is_empty());
    }
}
