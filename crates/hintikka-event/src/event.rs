//! Events and the event-model interface.

use std::fmt;

use hintikka_core::Formula;

use crate::error::Result;
use crate::postcondition::Postcondition;

/// One possible event: where it can happen and what it does.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub precondition: Formula,
    pub postcondition: Postcondition,
}

impl Event {
    pub fn new(precondition: Formula, postcondition: Postcondition) -> Self {
        Self {
            precondition,
            postcondition,
        }
    }

    /// An event that changes nothing where `precondition` holds.
    pub fn trivial(precondition: Formula) -> Self {
        Self::new(precondition, Postcondition::Trivial)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.postcondition {
            Postcondition::Trivial => write!(f, "pre: {}", self.precondition),
            ref post => write!(f, "pre: {}; post: {}", self.precondition, post),
        }
    }
}

/// An update that can be applied to models of type `M`.
///
/// `apply` never mutates its input; callers swap in the returned model once
/// it has been fully built.
pub trait EventModel<M: ?Sized> {
    type Output;

    /// Whether the update is meaningful at `model`'s pointed world.
    fn is_applicable_in(&self, model: &M) -> Result<bool>;

    fn apply(&self, model: &M) -> Result<Self::Output>;
}
