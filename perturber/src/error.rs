//! Error types for the perturber.

use thiserror::Error;

use crate::token::Span;

/// Result type alias for perturber operations
pub type Result<T> = std::result::Result<T, Error>;

/// Source text that is not valid in the supported language subset.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("parse error at line {line}, column {column}: {message}")]
pub struct ParseError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

impl ParseError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            line: span.line,
            column: span.column,
        }
    }

    pub fn unexpected(expected: &str, found: &str, span: Span) -> Self {
        Self::new(format!("expected {expected}, found {found}"), span)
    }

    pub fn unsupported(construct: &str, span: Span) -> Self {
        Self::new(format!("unsupported syntax: {construct}"), span)
    }
}

/// Errors that can occur during perturber operations
#[derive(Error, Debug)]
pub enum Error {
    /// Input could not be parsed
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Configuration value out of range
    #[error("configuration error: {0}")]
    Config(String),

    /// Configuration text is not valid TOML for the expected schema
    #[error("configuration error: {0}")]
    Toml(#[from] toml::de::Error),
}
