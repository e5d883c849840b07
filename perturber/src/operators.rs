//! Expression mutation operators.
//!
//! Each operator receives a node of its kind, rewrites it in place and
//! returns the same id. An operator called on a node of another kind leaves
//! it untouched.

use rand::{Rng, RngCore};

use crate::config::MutationConfig;
use crate::tree::{ArithmeticOp, Constant, LogicalOp, Node, NodeId, PrefixOp, Tree};

/// Draw uniformly from `options`. May return the value already in place.
fn pick<T: Copy>(rng: &mut dyn RngCore, options: &[T]) -> T {
    options[rng.random_range(0..options.len())]
}

/// Swap the branches of `body if test else orelse` with probability
/// `p_swap_branches`.
pub fn swap_branches(
    tree: &mut Tree,
    id: NodeId,
    rng: &mut dyn RngCore,
    config: &MutationConfig,
) -> NodeId {
    if let Node::IfExp { body, orelse, .. } = tree.node_mut(id) {
        if rng.random_bool(config.p_swap_branches()) {
            std::mem::swap(body, orelse);
        }
    }
    id
}

/// Replace a lambda's body with `None`.
pub fn nullify_lambda(
    tree: &mut Tree,
    id: NodeId,
    _rng: &mut dyn RngCore,
    _config: &MutationConfig,
) -> NodeId {
    if !matches!(tree.node(id), Node::Lambda { .. }) {
        return id;
    }
    let none = tree.alloc(Node::Constant(Constant::None));
    if let Node::Lambda { body, .. } = tree.node_mut(id) {
        *body = none;
    }
    id
}

/// Empty a dict literal, keys and values together, with probability
/// `p_clear_dict`.
pub fn clear_dict(
    tree: &mut Tree,
    id: NodeId,
    rng: &mut dyn RngCore,
    config: &MutationConfig,
) -> NodeId {
    if let Node::Dict { keys, values } = tree.node_mut(id) {
        if rng.random_bool(config.p_clear_dict()) {
            keys.clear();
            values.clear();
        }
    }
    id
}

pub fn replace_logical_op(
    tree: &mut Tree,
    id: NodeId,
    rng: &mut dyn RngCore,
    _config: &MutationConfig,
) -> NodeId {
    if let Node::BoolOp { op, .. } = tree.node_mut(id) {
        *op = pick(rng, &LogicalOp::ALL);
    }
    id
}

pub fn replace_arithmetic_op(
    tree: &mut Tree,
    id: NodeId,
    rng: &mut dyn RngCore,
    _config: &MutationConfig,
) -> NodeId {
    if let Node::BinOp { op, .. } = tree.node_mut(id) {
        *op = pick(rng, &ArithmeticOp::ALL);
    }
    id
}

pub fn replace_prefix_op(
    tree: &mut Tree,
    id: NodeId,
    rng: &mut dyn RngCore,
    _config: &MutationConfig,
) -> NodeId {
    if let Node::UnaryOp { op, .. } = tree.node_mut(id) {
        *op = pick(rng, &PrefixOp::ALL);
    }
    id
}

/// `x += 1` draws from the same operators as a binary operation.
pub fn replace_augmented_op(
    tree: &mut Tree,
    id: NodeId,
    rng: &mut dyn RngCore,
    _config: &MutationConfig,
) -> NodeId {
    if let Node::AugAssign { op, .. } = tree.node_mut(id) {
        *op = pick(rng, &ArithmeticOp::ALL);
    }
    id
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::parser::parse;

    fn find(tree: &Tree, pred: impl Fn(&Node) -> bool) -> NodeId {
        tree.walk()
            .find(|&id| pred(tree.node(id)))
            .expect("node should be present")
    }

    #[test]
    fn test_swap_branches_respects_probability() {
        let mut tree = parse("a if cond else b").unwrap();
        let id = find(&tree, |n| matches!(n, Node::IfExp { .. }));
        let before = tree.dump();
        let mut rng = StdRng::seed_from_u64(7);

        let never = MutationConfig::new(0.5, 0.0, 0.5).unwrap();
        swap_branches(&mut tree, id, &mut rng, &never);
        assert_eq!(tree.dump(), before);

        let always = MutationConfig::new(0.5, 1.0, 0.5).unwrap();
        swap_branches(&mut tree, id, &mut rng, &always);
        let Node::IfExp { body, orelse, .. } = tree.node(id) else {
            panic!("still a conditional expression");
        };
        assert_eq!(tree.from_sym(tree.identifier(*body).unwrap()), "b");
        assert_eq!(tree.from_sym(tree.identifier(*orelse).unwrap()), "a");
    }

    #[test]
    fn test_nullify_lambda_keeps_parameters() {
        let mut tree = parse("lambda x, y=2: x + y").unwrap();
        let id = find(&tree, |n| matches!(n, Node::Lambda { .. }));
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(
            nullify_lambda(&mut tree, id, &mut rng, &MutationConfig::default()),
            id
        );
        assert_eq!(
            tree.dump(),
            parse("lambda x, y=2: None").unwrap().dump()
        );
    }

    #[test]
    fn test_clear_dict_is_all_or_nothing() {
        let config = MutationConfig::default();
        for seed in 0..64 {
            let mut tree = parse("{1: 'a', 2: 'b'}").unwrap();
            let id = find(&tree, |n| matches!(n, Node::Dict { .. }));
            let mut rng = StdRng::seed_from_u64(seed);
            clear_dict(&mut tree, id, &mut rng, &config);
            let Node::Dict { keys, values } = tree.node(id) else {
                panic!("still a dict");
            };
            assert_eq!(keys.len(), values.len());
            assert!(keys.len() == 0 || keys.len() == 2);
        }
    }

    #[test]
    fn test_operator_replacement_covers_the_whole_set() {
        let mut tree = parse("a + b").unwrap();
        let id = find(&tree, |n| matches!(n, Node::BinOp { .. }));
        let mut rng = StdRng::seed_from_u64(42);
        let mut seen = HashSet::new();
        for _ in 0..500 {
            replace_arithmetic_op(&mut tree, id, &mut rng, &MutationConfig::default());
            let Node::BinOp { op, .. } = tree.node(id) else {
                panic!("still a binary operation");
            };
            seen.insert(*op);
        }
        assert_eq!(seen.len(), ArithmeticOp::ALL.len());
        // Operands are left alone.
        let Node::BinOp { left, right, .. } = tree.node(id) else {
            unreachable!()
        };
        assert_eq!(tree.from_sym(tree.identifier(*left).unwrap()), "a");
        assert_eq!(tree.from_sym(tree.identifier(*right).unwrap()), "b");
    }

    #[test]
    fn test_prefix_and_logical_ops_stay_in_their_sets() {
        let mut tree = parse("not a or -b").unwrap();
        let bool_op = find(&tree, |n| matches!(n, Node::BoolOp { .. }));
        let unary = find(&tree, |n| matches!(n, Node::UnaryOp { .. }));
        let mut rng = StdRng::seed_from_u64(3);
        let mut prefixes = HashSet::new();
        let mut logicals = HashSet::new();
        for _ in 0..200 {
            replace_logical_op(&mut tree, bool_op, &mut rng, &MutationConfig::default());
            replace_prefix_op(&mut tree, unary, &mut rng, &MutationConfig::default());
            if let Node::BoolOp { op, .. } = tree.node(bool_op) {
                logicals.insert(*op);
            }
            if let Node::UnaryOp { op, .. } = tree.node(unary) {
                prefixes.insert(*op);
            }
        }
        assert_eq!(logicals.len(), 2);
        assert_eq!(prefixes.len(), 4);
    }

    #[test]
    fn test_augmented_op_and_kind_mismatch() {
        let mut tree = parse("x += 1").unwrap();
        let aug = find(&tree, |n| matches!(n, Node::AugAssign { .. }));
        let name = find(&tree, |n| matches!(n, Node::Name { .. }));
        let before = tree.dump();
        let mut rng = StdRng::seed_from_u64(11);
        replace_arithmetic_op(&mut tree, aug, &mut rng, &MutationConfig::default());
        nullify_lambda(&mut tree, name, &mut rng, &MutationConfig::default());
        assert_eq!(tree.dump(), before);

        replace_augmented_op(&mut tree, aug, &mut rng, &MutationConfig::default());
        assert!(tree.dump().starts_with("Module(body=[AugAssign(target=Name(id='x', ctx=Store())"));
    }
}
