use rand::RngCore;

use crate::config::MutationConfig;
use crate::kind::NodeKind;
use crate::operators;
use crate::tree::{NodeId, Tree};

/// Mutates the node at `NodeId` in place and returns its id.
pub type MutationFn = fn(&mut Tree, NodeId, &mut dyn RngCore, &MutationConfig) -> NodeId;

/// Fixed mapping from expression kinds to their mutation operator.
pub struct OperatorRegistry {
    entries: [(NodeKind, MutationFn); 7],
}

static REGISTRY: OperatorRegistry = OperatorRegistry {
    entries: [
        (NodeKind::IfExp, operators::swap_branches),
        (NodeKind::Lambda, operators::nullify_lambda),
        (NodeKind::Dict, operators::clear_dict),
        (NodeKind::BoolOp, operators::replace_logical_op),
        (NodeKind::BinOp, operators::replace_arithmetic_op),
        (NodeKind::UnaryOp, operators::replace_prefix_op),
        (NodeKind::AugAssign, operators::replace_augmented_op),
    ],
};

impl OperatorRegistry {
    /// The process-wide registry. Immutable, so it is shared freely.
    pub fn global() -> &'static Self {
        &REGISTRY
    }

    pub fn get(&self, kind: NodeKind) -> Option<MutationFn> {
        self.entries
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|&(_, f)| f)
    }

    pub fn contains(&self, kind: NodeKind) -> bool {
        self.get(kind).is_some()
    }

    pub fn kinds(&self) -> impl Iterator<Item = NodeKind> + '_ {
        self.entries.iter().map(|&(k, _)| k)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_covers_expression_kinds_only() {
        let registry = OperatorRegistry::global();
        assert_eq!(registry.kinds().count(), 7);
        for kind in NodeKind::ALL {
            assert_eq!(registry.contains(kind), kind != NodeKind::Name, "{kind}");
        }
    }

    #[test]
    fn test_registry_dispatches_to_matching_operator() {
        use rand::rngs::StdRng;
        use rand::SeedableRng;

        let mut tree = crate::parser::parse("f = lambda: 1").unwrap();
        let lambda = tree
            .walk()
            .find(|&id| NodeKind::of(tree.node(id)) == Some(NodeKind::Lambda))
            .unwrap();
        let op = OperatorRegistry::global().get(NodeKind::Lambda).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        op(&mut tree, lambda, &mut rng, &MutationConfig::default());
        assert_eq!(tree.dump(), crate::parser::parse("f = lambda: None").unwrap().dump());
    }
}
