//! Event model error types.

use hintikka_core::{GraphError, ModelError};

/// Errors raised while building or applying event models.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EventError {
    /// The epistemic model rejected a query or construction step.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// The event graph rejected a construction step.
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("no event named {0}")]
    UnknownEvent(String),

    #[error("the event model has no pointed event")]
    NoPointedEvent,

    /// The pointed world did not survive together with the pointed event.
    #[error("event model cannot be applied: world {world} does not admit event {event}")]
    NotApplicable { world: String, event: String },

    /// No world survived the update.
    #[error("contradictory update: no world survives")]
    Contradictory,

    #[error("no transition applies to world {0}")]
    NoTransition(String),
}

/// Result type alias for event model operations.
pub type Result<T> = std::result::Result<T, EventError>;
