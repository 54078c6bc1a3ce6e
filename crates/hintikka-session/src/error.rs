//! Session error types.

use hintikka_core::{ModelError, ParseError};
use hintikka_event::EventError;

/// Errors reported by the external valuation solver boundary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SolverError {
    #[error("solver unavailable: {0}")]
    Unavailable(String),

    #[error("malformed solver output: {0}")]
    Malformed(String),
}

/// Errors that can occur while building or driving a session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("formula error: {0}")]
    Parse(#[from] ParseError),

    #[error("model error: {0}")]
    Model(#[from] ModelError),

    #[error("update error: {0}")]
    Event(#[from] EventError),

    /// The description is well-formed JSON but not a usable model.
    #[error("invalid model description: {0}")]
    Description(String),

    #[error(transparent)]
    Solver(#[from] SolverError),

    #[error("unknown proposition: {0}")]
    UnknownProposition(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for session operations.
pub type Result<T> = std::result::Result<T, SessionError>;
