//! Single-mutation perturbation of Python programs.
//!
//! A [`Perturber`] parses a program, picks one node of a mutable kind and
//! perturbs it in place, then renders the tree back to source. The result is
//! a syntactically valid "mutant" of the input, useful as a negative example
//! or a mutation-testing target.
//!
//! ```
//! use perturber::Perturber;
//!
//! let mut engine = Perturber::seeded(7);
//! let mutant = engine.mutate_expression("f = lambda x: x").unwrap();
//! assert_eq!(mutant, "f = lambda x: None");
//! assert!(!engine.trees_equal("f = lambda x: x", &mutant).unwrap());
//! ```

pub mod collect;
pub mod config;
mod emit;
mod engine;
pub mod error;
pub mod kind;
mod lexer;
pub mod mutator;
pub mod operators;
mod parser;
pub mod registry;
pub mod symbol;
pub mod syntax;
mod token;
pub mod tree;

pub use crate::config::MutationConfig;
pub use crate::engine::Perturber;
pub use crate::error::{Error, ParseError, Result};
pub use crate::kind::NodeKind;
pub use crate::mutator::{Mutation, Mutator};
pub use crate::registry::{MutationFn, OperatorRegistry};
pub use crate::syntax::{Parse, Python, Render};
pub use crate::tree::{NodeId, Tree};
