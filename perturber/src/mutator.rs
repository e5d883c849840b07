use rand::seq::IndexedRandom;
use rand::RngCore;

use crate::config::MutationConfig;
use crate::kind::NodeKind;
use crate::registry::OperatorRegistry;
use crate::tree::{Node, NodeId, Tree};

/// What a successful mutation touched.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Mutation {
    pub node: NodeId,
    pub kind: NodeKind,
}

/// A Mutator changes at most one part of `obj` in place and reports it.
pub trait Mutator<T, C> {
    fn mutate(&mut self, obj: &mut T, context: C) -> Option<Mutation>;
}

/// Picks one expression candidate uniformly and applies its kind's operator.
pub struct ExpressionMutator<'a> {
    rng: &'a mut dyn RngCore,
    config: &'a MutationConfig,
    registry: &'a OperatorRegistry,
}

impl<'a> ExpressionMutator<'a> {
    pub fn new(
        rng: &'a mut dyn RngCore,
        config: &'a MutationConfig,
        registry: &'a OperatorRegistry,
    ) -> Self {
        Self {
            rng,
            config,
            registry,
        }
    }
}

impl Mutator<Tree, &[NodeId]> for ExpressionMutator<'_> {
    fn mutate(&mut self, tree: &mut Tree, candidates: &[NodeId]) -> Option<Mutation> {
        let &node = candidates.choose(&mut *self.rng)?;
        let kind = NodeKind::of(tree.node(node))?;
        let op = self.registry.get(kind)?;
        let node = op(tree, node, &mut *self.rng, self.config);
        tracing::debug!("Mutated {} node", kind);
        Some(Mutation { node, kind })
    }
}

/// Points one name reference at a different identifier taken from the
/// other candidates.
pub struct VariableRenamer<'a> {
    rng: &'a mut dyn RngCore,
}

impl<'a> VariableRenamer<'a> {
    pub fn new(rng: &'a mut dyn RngCore) -> Self {
        Self { rng }
    }
}

impl Mutator<Tree, &[NodeId]> for VariableRenamer<'_> {
    fn mutate(&mut self, tree: &mut Tree, candidates: &[NodeId]) -> Option<Mutation> {
        let &target = candidates.choose(&mut *self.rng)?;
        let current = tree.identifier(target)?;

        let others: Vec<NodeId> = candidates
            .iter()
            .copied()
            .filter(|&id| tree.identifier(id).is_some_and(|sym| sym != current))
            .collect();
        let Some(&source) = others.choose(&mut *self.rng) else {
            tracing::debug!(
                "No identifier other than '{}' to rename to",
                tree.from_sym(current)
            );
            return None;
        };
        let replacement = tree.identifier(source)?;

        tracing::debug!(
            "Renamed '{}' to '{}'",
            tree.from_sym(current),
            tree.from_sym(replacement)
        );
        if let Node::Name { id, .. } = tree.node_mut(target) {
            *id = replacement;
        }
        Some(Mutation {
            node: target,
            kind: NodeKind::Name,
        })
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::collect;
    use crate::parser::parse;

    #[test]
    fn test_expression_mutator_reports_kind() {
        let mut tree = parse("f = lambda x: x").unwrap();
        let candidates = collect::expressions(&tree, OperatorRegistry::global());
        let mut rng = StdRng::seed_from_u64(5);
        let config = MutationConfig::default();
        let mut mutator = ExpressionMutator::new(&mut rng, &config, OperatorRegistry::global());

        let mutation = mutator.mutate(&mut tree, &candidates).unwrap();
        assert_eq!(mutation.kind, NodeKind::Lambda);
        assert_eq!(mutation.node, candidates[0]);
        assert_eq!(tree.dump(), parse("f = lambda x: None").unwrap().dump());
    }

    #[test]
    fn test_expression_mutator_without_candidates() {
        let mut tree = parse("x").unwrap();
        let mut rng = StdRng::seed_from_u64(5);
        let config = MutationConfig::default();
        let mut mutator = ExpressionMutator::new(&mut rng, &config, OperatorRegistry::global());
        assert!(mutator.mutate(&mut tree, &[]).is_none());
    }

    #[test]
    fn test_renamer_uses_another_identifier() {
        for seed in 0..32 {
            let mut tree = parse("print(a + b)").unwrap();
            let before = tree.dump();
            let candidates = collect::variables(&tree);
            let mut rng = StdRng::seed_from_u64(seed);
            let mutation = VariableRenamer::new(&mut rng)
                .mutate(&mut tree, &candidates)
                .unwrap();

            assert_eq!(mutation.kind, NodeKind::Name);
            assert!(candidates.contains(&mutation.node));
            assert_ne!(tree.dump(), before);
            // Only a reference changes; the set of identifiers does not grow.
            for id in collect::variables(&tree) {
                let name = tree.from_sym(tree.identifier(id).unwrap());
                assert!(["print", "a", "b"].contains(&name));
            }
        }
    }

    #[test]
    fn test_renamer_noop_when_all_names_match() {
        let mut tree = parse("x + x * x").unwrap();
        let before = tree.dump();
        let candidates = collect::variables(&tree);
        let mut rng = StdRng::seed_from_u64(0);
        assert!(VariableRenamer::new(&mut rng)
            .mutate(&mut tree, &candidates)
            .is_none());
        assert_eq!(tree.dump(), before);
    }
}
