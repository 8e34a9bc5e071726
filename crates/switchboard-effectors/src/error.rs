//! Effector error types.

use thiserror::Error;

/// Errors surfaced by effector phases.
///
/// Step-level execution problems are not errors: they become `failed` or
/// `blocked` step results so the receipt stays complete. An error here
/// means the phase itself could not run.
#[derive(Debug, Error)]
pub enum EffectorError {
    /// The request shape was invalid for this effector.
    #[error("invalid request: {0}")]
    Validation(String),

    /// A step referenced data the effector cannot interpret.
    #[error("malformed step: {0}")]
    MalformedStep(String),

    /// Unexpected I/O failure outside any single step.
    #[error("effector I/O failed: {0}")]
    Io(String),
}

/// Result alias for effector operations.
pub type EffectorResult<T> = Result<T, EffectorError>;
