//! The mutation engine.
//!
//! Every entry point parses its input, collects candidates, mutates at most
//! one node and renders the result:
//!
//! | Entry point | Candidates | Nothing to mutate |
//! |-------------|------------|-------------------|
//! | [`Perturber::mutate`] | variables and expressions, one category chosen by coin | tree rendered unmutated |
//! | [`Perturber::mutate_expression`] | expressions | input returned verbatim |
//! | [`Perturber::mutate_variable`] | load-context names | input returned verbatim |

use rand::rngs::{StdRng, ThreadRng};
use rand::{Rng, RngCore, SeedableRng};

use crate::collect;
use crate::config::MutationConfig;
use crate::error::Result;
use crate::mutator::{ExpressionMutator, Mutation, Mutator, VariableRenamer};
use crate::registry::OperatorRegistry;
use crate::syntax::{Parse, Python, Render};
use crate::tree::{NodeId, Tree};

/// Produces single-mutation variants ("mutants") of source programs.
///
/// The parser, the renderer and the random source are injected; the
/// operator registry is the shared [`OperatorRegistry::global`].
pub struct Perturber<P = Python, E = Python, R = ThreadRng> {
    parser: P,
    renderer: E,
    rng: R,
    config: MutationConfig,
    registry: &'static OperatorRegistry,
}

impl<P: Parse, E: Render, R: RngCore> Perturber<P, E, R> {
    pub fn new(parser: P, renderer: E, rng: R) -> Self {
        Self {
            parser,
            renderer,
            rng,
            config: MutationConfig::default(),
            registry: OperatorRegistry::global(),
        }
    }

    pub fn with_config(mut self, config: MutationConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &MutationConfig {
        &self.config
    }

    /// Rename a variable or adjust an expression, chosen by a coin with
    /// bias `p_variable`.
    ///
    /// When the chosen category has nothing to mutate the tree is rendered
    /// unchanged; the other category is not tried.
    pub fn mutate(&mut self, code: &str) -> Result<String> {
        let mut tree = self.parser.parse(code)?;
        let variables = collect::variables(&tree);
        let expressions = collect::expressions(&tree, self.registry);
        tracing::trace!(
            "Collected {} variable and {} expression candidates",
            variables.len(),
            expressions.len()
        );

        let mutation = if self.rng.random_bool(self.config.p_variable()) {
            tracing::debug!("Mutating a variable");
            self.replace_variable(&mut tree, &variables)
        } else {
            tracing::debug!("Mutating an expression");
            self.adjust_expression(&mut tree, &expressions)
        };
        if mutation.is_none() {
            tracing::debug!("No mutation applied, rendering the tree unchanged");
        }
        Ok(self.renderer.render(&tree))
    }

    /// Mutate one expression. Returns `code` verbatim when it contains no
    /// mutable expression.
    pub fn mutate_expression(&mut self, code: &str) -> Result<String> {
        let mut tree = self.parser.parse(code)?;
        let expressions = collect::expressions(&tree, self.registry);
        tracing::trace!("Collected {} expression candidates", expressions.len());

        if self.adjust_expression(&mut tree, &expressions).is_none() {
            tracing::debug!("No expression to mutate, returning input verbatim");
            return Ok(code.to_string());
        }
        Ok(self.renderer.render(&tree))
    }

    /// Point one variable reference at another identifier from the same
    /// program. Returns `code` verbatim when fewer than two references exist
    /// or all of them share one identifier.
    pub fn mutate_variable(&mut self, code: &str) -> Result<String> {
        let mut tree = self.parser.parse(code)?;
        let variables = collect::variables(&tree);
        tracing::trace!("Collected {} variable candidates", variables.len());

        if variables.len() < 2 {
            tracing::debug!("Fewer than two variables, returning input verbatim");
            return Ok(code.to_string());
        }
        if self.replace_variable(&mut tree, &variables).is_none() {
            tracing::debug!("Single distinct variable, returning input verbatim");
            return Ok(code.to_string());
        }
        Ok(self.renderer.render(&tree))
    }

    /// Whether `a` and `b` parse to structurally identical trees. Formatting,
    /// comments and redundant parentheses do not matter.
    pub fn trees_equal(&self, a: &str, b: &str) -> Result<bool> {
        let a = self.parser.parse(a)?;
        let b = self.parser.parse(b)?;
        Ok(a.dump() == b.dump())
    }

    /// Apply the registered operator to one uniformly chosen candidate.
    pub fn adjust_expression(&mut self, tree: &mut Tree, candidates: &[NodeId]) -> Option<Mutation> {
        ExpressionMutator::new(&mut self.rng, &self.config, self.registry).mutate(tree, candidates)
    }

    /// Rename one uniformly chosen candidate to another candidate's
    /// identifier.
    pub fn replace_variable(&mut self, tree: &mut Tree, candidates: &[NodeId]) -> Option<Mutation> {
        VariableRenamer::new(&mut self.rng).mutate(tree, candidates)
    }
}

impl Perturber<Python, Python, StdRng> {
    /// Bundled Python collaborator with a reproducible random sequence.
    pub fn seeded(seed: u64) -> Self {
        Self::new(Python, Python, StdRng::seed_from_u64(seed))
    }
}

impl Default for Perturber {
    fn default() -> Self {
        Self::new(Python, Python, rand::rng())
    }
}
