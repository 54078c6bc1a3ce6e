//! Shared proptest strategies for small random models and formulas.

use proptest::prelude::*;

use crate::formula::Formula;
use crate::model::explicit::ExplicitEpistemicModel;
use crate::world::WorldValuation;

const ATOMS: [&str; 3] = ["p", "q", "r"];
const AGENTS: [&str; 2] = ["a", "b"];

fn agent() -> impl Strategy<Value = &'static str> {
    prop::sample::select(AGENTS.to_vec())
}

pub(crate) fn formula_strategy() -> impl Strategy<Value = Formula> {
    let leaf = prop_oneof![
        Just(Formula::True),
        Just(Formula::False),
        prop::sample::select(ATOMS.to_vec()).prop_map(|p| Formula::atom(p)),
        (0usize..3).prop_map(|n| Formula::exactly(n, ATOMS)),
    ];
    leaf.prop_recursive(4, 32, 3, |inner| {
        prop_oneof![
            inner.clone().prop_map(Formula::negate),
            prop::collection::vec(inner.clone(), 1..3).prop_map(Formula::And),
            prop::collection::vec(inner.clone(), 1..3).prop_map(Formula::Or),
            prop::collection::vec(inner.clone(), 1..3).prop_map(Formula::Xor),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| Formula::imply(a, b)),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| Formula::equiv(a, b)),
            (agent(), inner.clone()).prop_map(|(a, f)| Formula::k(a, f)),
            (agent(), inner.clone()).prop_map(|(a, f)| Formula::kpos(a, f)),
            (agent(), inner).prop_map(|(a, f)| Formula::kw(a, f)),
        ]
    })
}

/// Models of one to five worlds over `p, q, r` with random edges for `a`
/// and `b`, pointed at the first world.
pub(crate) fn model_strategy() -> impl Strategy<Value = ExplicitEpistemicModel> {
    (1usize..6)
        .prop_flat_map(|n| {
            (
                prop::collection::vec(prop::collection::vec(any::<bool>(), 3), n),
                prop::collection::vec((0usize..2, 0..n, 0..n), 0..n * n * 2),
            )
        })
        .prop_map(|(valuations, edges)| {
            let mut m = ExplicitEpistemicModel::new(AGENTS);
            for (i, bits) in valuations.iter().enumerate() {
                let props = ATOMS
                    .iter()
                    .zip(bits)
                    .filter(|(_, on)| **on)
                    .map(|(p, _)| *p);
                m.add_world(format!("w{i}"), WorldValuation::from_true(props))
                    .unwrap();
            }
            for (agent, src, dst) in edges {
                m.add_edge(AGENTS[agent], &format!("w{src}"), &format!("w{dst}"))
                    .unwrap();
            }
            m.set_pointed_world("w0").unwrap();
            m
        })
}
