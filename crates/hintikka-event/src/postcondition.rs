//! Postconditions: how an event rewrites the world it happens in.
//!
//! `perform` always returns a new world value. Assignments are evaluated in
//! the model *before* the update, so `p := q, q := p` swaps the two values.

use std::collections::BTreeMap;
use std::fmt;

use hintikka_core::{EpistemicModel, Formula, World, WorldValuation};

use crate::error::{EventError, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum Postcondition {
    /// The world is copied unchanged.
    Trivial,
    /// Each proposition takes the value of its formula at the source world.
    Assignments(BTreeMap<String, Formula>),
    /// The world is replaced by the target of the first transition whose
    /// guard proposition holds at the source world.
    WorldTransfer(Vec<(String, WorldValuation)>),
}

impl Postcondition {
    /// The world that event application produces from world `id` of `model`.
    pub fn perform<M>(&self, model: &M, id: &str) -> Result<WorldValuation>
    where
        M: EpistemicModel + ?Sized,
    {
        let world = model.world(id).ok_or_else(|| model.unknown_world(id))?;
        match self {
            Postcondition::Trivial => Ok(world.clone()),
            Postcondition::Assignments(assignments) => {
                let mut next = world.clone();
                for (prop, formula) in assignments {
                    let value = model.model_check(id, formula)?;
                    next = next.assign(prop.clone(), value);
                }
                Ok(next)
            }
            Postcondition::WorldTransfer(transitions) => transitions
                .iter()
                .find(|(guard, _)| world.model_check(guard))
                .map(|(_, target)| target.clone())
                .ok_or_else(|| EventError::NoTransition(id.to_string())),
        }
    }
}

impl fmt::Display for Postcondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Postcondition::Trivial => write!(f, "idle"),
            Postcondition::Assignments(assignments) => {
                let parts: Vec<String> = assignments
                    .iter()
                    .map(|(p, formula)| format!("{p}:={formula}"))
                    .collect();
                write!(f, "{}", parts.join(" "))
            }
            Postcondition::WorldTransfer(transitions) => {
                let parts: Vec<String> = transitions
                    .iter()
                    .map(|(guard, target)| format!("{guard}=>{{{target}}}"))
                    .collect();
                write!(f, "{}", parts.join(" "))
            }
        }
    }
}
