//! Domain errors for the SEO Refinery optimization core.

use thiserror::Error;

/// Domain-level errors raised by models and the scoring services.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Invalid category weights: sum is {sum}, expected 1.0")]
    InvalidWeights { sum: f64 },

    #[error("Iteration budget of {max_iterations} exhausted")]
    IterationBudgetExceeded { max_iterations: u32 },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl From<regex::Error> for DomainError {
    fn from(err: regex::Error) -> Self {
        Self::InvalidPattern(err.to_string())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

/// A sub-metric that could not be computed.
///
/// Absorbed by the scorer: the sub-metric is recorded as anomalous, valued
/// 0, and logged at warn level.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoringAnomaly {
    #[error("draft contains no words")]
    NoWords,

    #[error("sub-metric {metric} produced a non-finite value")]
    NonFinite { metric: String },
}
