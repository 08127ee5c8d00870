//! Error types for adgraph.

use crate::node::NodeId;
use thiserror::Error;

/// Errors reported by derivative queries and helpers.
///
/// Numeric domain problems (`sqrt(-1)`, `ln(0)`, ...) are never reported
/// here; they surface as NaN or infinite values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdError {
    /// The queried handle is not a parameter reached by the backward pass.
    #[error("no derivative recorded for node {id}")]
    NotFound { id: NodeId },

    /// A buffer or parameter list has the wrong length.
    #[error("dimension mismatch: expected {expected} elements, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// A gradient-check configuration failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, AdError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_problem() {
        let err = AdError::DimensionMismatch {
            expected: 3,
            actual: 2,
        };
        assert_eq!(
            err.to_string(),
            "dimension mismatch: expected 3 elements, got 2"
        );

        let err = AdError::InvalidConfig("step must be positive".into());
        assert_eq!(err.to_string(), "invalid configuration: step must be positive");
    }
}
