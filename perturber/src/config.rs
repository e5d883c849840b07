use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Probabilities steering the random choices of a mutation.
///
/// Every value lies within `[0, 1]`: the fields are only set through
/// [`MutationConfig::new`], deserialization and `Default`.
///
/// ```compile_fail
/// let config = perturber::MutationConfig {
///     p_variable: 1.5,
///     p_swap_branches: 0.5,
///     p_clear_dict: 0.5,
/// };
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawMutationConfig")]
pub struct MutationConfig {
    p_variable: f64,
    p_swap_branches: f64,
    p_clear_dict: f64,
}

/// The configuration table before range checks.
#[derive(Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawMutationConfig {
    p_variable: f64,
    p_swap_branches: f64,
    p_clear_dict: f64,
}

impl Default for RawMutationConfig {
    fn default() -> Self {
        let MutationConfig {
            p_variable,
            p_swap_branches,
            p_clear_dict,
        } = MutationConfig::default();
        Self {
            p_variable,
            p_swap_branches,
            p_clear_dict,
        }
    }
}

impl TryFrom<RawMutationConfig> for MutationConfig {
    type Error = Error;

    fn try_from(raw: RawMutationConfig) -> Result<Self> {
        Self::new(raw.p_variable, raw.p_swap_branches, raw.p_clear_dict)
    }
}

impl MutationConfig {
    pub fn new(p_variable: f64, p_swap_branches: f64, p_clear_dict: f64) -> Result<Self> {
        let config = Self {
            p_variable,
            p_swap_branches,
            p_clear_dict,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let raw: RawMutationConfig = toml::from_str(text)?;
        Self::try_from(raw)
    }

    /// Chance that `mutate` renames a variable instead of adjusting an
    /// expression.
    pub fn p_variable(&self) -> f64 {
        self.p_variable
    }

    /// Chance that a conditional expression has its branches swapped.
    pub fn p_swap_branches(&self) -> f64 {
        self.p_swap_branches
    }

    /// Chance that a dict literal is emptied.
    pub fn p_clear_dict(&self) -> f64 {
        self.p_clear_dict
    }

    fn validate(&self) -> Result<()> {
        for (key, value) in [
            ("p_variable", self.p_variable),
            ("p_swap_branches", self.p_swap_branches),
            ("p_clear_dict", self.p_clear_dict),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::Config(format!(
                    "{key} must be within [0, 1], got {value}"
                )));
            }
        }
        Ok(())
    }
}

impl Default for MutationConfig {
    fn default() -> Self {
        Self {
            p_variable: 0.5,
            p_swap_branches: 0.5,
            p_clear_dict: 0.5,
        }
    }
}
