//! Bisimulation contraction by signature refinement.
//!
//! Worlds start out grouped by valuation. Each round assigns every world the
//! signature `(group, successor groups per agent)` and regroups by equal
//! signatures. A round can only split groups, never merge them, so the group
//! count is non-decreasing and bounded by the world count; refinement stops
//! the first round that count does not change.

use std::collections::{BTreeSet, HashMap};

use tracing::debug;

use crate::error::ModelError;
use crate::model::explicit::ExplicitEpistemicModel;
use crate::model::EpistemicModel;

type Signature = (usize, Vec<BTreeSet<usize>>);

/// Compute the quotient of `model` under bisimilarity for `agents`.
///
/// Groups are numbered in order of first appearance over the model's world
/// order, and the quotient names them `w1`, `w2`, ... accordingly. The new
/// pointed world is the group of the old one.
pub fn contract(
    model: &ExplicitEpistemicModel,
    agents: &[String],
) -> Result<ExplicitEpistemicModel, ModelError> {
    let pointed = model.pointed_world().ok_or(ModelError::NoPointedWorld)?;
    let ids = model.world_ids();
    let index: HashMap<&str, usize> = ids
        .iter()
        .enumerate()
        .map(|(i, id)| (id.as_str(), i))
        .collect();
    let position = |id: &str| {
        index
            .get(id)
            .copied()
            .ok_or_else(|| model.unknown_world(id))
    };

    let mut by_valuation: HashMap<String, usize> = HashMap::new();
    let mut group = Vec::with_capacity(ids.len());
    for id in ids {
        let world = model.world(id).ok_or_else(|| model.unknown_world(id))?;
        let fresh = by_valuation.len();
        group.push(*by_valuation.entry(world.to_string()).or_insert(fresh));
    }
    let mut count = by_valuation.len();

    let mut rounds = 0;
    loop {
        rounds += 1;
        let mut by_signature: HashMap<Signature, usize> = HashMap::new();
        let mut next = Vec::with_capacity(ids.len());
        for (i, id) in ids.iter().enumerate() {
            let mut reach = Vec::with_capacity(agents.len());
            for agent in agents {
                let mut targets = BTreeSet::new();
                for s in model.successors(id, agent)? {
                    targets.insert(group[position(s)?]);
                }
                reach.push(targets);
            }
            let fresh = by_signature.len();
            next.push(*by_signature.entry((group[i], reach)).or_insert(fresh));
        }
        group = next;
        let refined = by_signature.len();
        if refined == count {
            break;
        }
        count = refined;
    }
    debug!(worlds = ids.len(), classes = count, rounds, "contracted model");

    let mut representative: Vec<usize> = vec![usize::MAX; count];
    for (i, g) in group.iter().enumerate() {
        if representative[*g] == usize::MAX {
            representative[*g] = i;
        }
    }
    let name = |g: usize| format!("w{}", g + 1);

    let mut quotient = ExplicitEpistemicModel::new(agents.iter().cloned());
    for (g, rep) in representative.iter().enumerate() {
        let id = &ids[*rep];
        let world = model.world(id).ok_or_else(|| model.unknown_world(id))?;
        quotient.add_world(name(g), world.clone())?;
    }
    for (g, rep) in representative.iter().enumerate() {
        let id = &ids[*rep];
        for agent in agents {
            for s in model.successors(id, agent)? {
                quotient.add_edge(agent, &name(g), &name(group[position(s)?]))?;
            }
        }
    }
    quotient.set_pointed_world(&name(group[position(pointed)?]))?;
    Ok(quotient)
}
