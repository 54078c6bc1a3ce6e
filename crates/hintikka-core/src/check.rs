//! The model checker: recursive evaluation of a [`Formula`] at a world.

use crate::error::ModelError;
use crate::formula::Formula;
use crate::model::EpistemicModel;
use crate::world::World;

/// Evaluate `formula` at world `id` of `model`.
///
/// Fails only when `id` (or a world reached from it) is not in the model.
/// Nothing is cached between calls.
pub fn model_check<M>(model: &M, id: &str, formula: &Formula) -> Result<bool, ModelError>
where
    M: EpistemicModel + ?Sized,
{
    let world = model.world(id).ok_or_else(|| model.unknown_world(id))?;

    match formula {
        Formula::True => Ok(true),
        Formula::False => Ok(false),
        Formula::Atomic(p) => Ok(world.model_check(p)),
        Formula::Not(f) => Ok(!model_check(model, id, f)?),
        Formula::And(fs) => {
            for f in fs {
                if !model_check(model, id, f)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        Formula::Or(fs) => {
            for f in fs {
                if model_check(model, id, f)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        Formula::Xor(fs) => {
            let mut hits = 0;
            for f in fs {
                if model_check(model, id, f)? {
                    hits += 1;
                    if hits > 1 {
                        return Ok(false);
                    }
                }
            }
            Ok(hits == 1)
        }
        Formula::Imply(a, b) => Ok(!model_check(model, id, a)? || model_check(model, id, b)?),
        Formula::Equiv(a, b) => Ok(model_check(model, id, a)? == model_check(model, id, b)?),
        Formula::K { agent, formula } => {
            for s in model.successors(id, agent)? {
                if !model_check(model, s, formula)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        Formula::Kpos { agent, formula } => {
            for s in model.successors(id, agent)? {
                if model_check(model, s, formula)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        Formula::Kw { agent, formula } => {
            let mut seen: Option<bool> = None;
            for s in model.successors(id, agent)? {
                let value = model_check(model, s, formula)?;
                match seen {
                    None => seen = Some(value),
                    Some(first) if first != value => return Ok(false),
                    Some(_) => {}
                }
            }
            Ok(true)
        }
        Formula::Exactly { count, atoms } => {
            let hits = atoms.iter().filter(|p| world.model_check(p)).count();
            Ok(hits == *count)
        }
        Formula::Yesterday(f) => match model.previous() {
            Some(previous) => match previous.pointed_world() {
                Some(pointed) => model_check(previous, pointed, f),
                None => Ok(false),
            },
            None => Ok(false),
        },
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use proptest::prelude::*;

    use super::*;
    use crate::formula::create_update_formula;
    use crate::model::explicit::ExplicitEpistemicModel;
    use crate::testing::{formula_strategy, model_strategy};
    use crate::world::WorldValuation;

    fn p() -> Formula {
        Formula::atom("p")
    }

    fn two_worlds() -> ExplicitEpistemicModel {
        let mut m = ExplicitEpistemicModel::new(["a"]);
        m.add_world("w1", WorldValuation::from_true(["p"])).unwrap();
        m.add_world("w2", WorldValuation::default()).unwrap();
        m.bulk_add_edges("a");
        m.set_pointed_world("w1").unwrap();
        m
    }

    fn single(props: &[&str]) -> ExplicitEpistemicModel {
        let mut m = ExplicitEpistemicModel::new(["a"]);
        m.add_world("w", WorldValuation::from_true(props.iter().copied()))
            .unwrap();
        m
    }

    #[test]
    fn unknown_world_fails() {
        let m = two_worlds();
        assert!(matches!(
            model_check(&m, "w3", &Formula::True),
            Err(ModelError::UnknownWorld { .. })
        ));
    }

    #[test]
    fn uncertainty_between_two_worlds() {
        let m = two_worlds();
        assert!(!model_check(&m, "w1", &Formula::k("a", p())).unwrap());
        assert!(model_check(&m, "w1", &Formula::kpos("a", p())).unwrap());
        assert!(!model_check(&m, "w1", &Formula::kw("a", p())).unwrap());
        assert!(model_check(&m, "w1", &Formula::kw("a", Formula::True)).unwrap());
    }

    #[test]
    fn modalities_without_successors() {
        let m = single(&[]);
        assert!(model_check(&m, "w", &Formula::k("a", Formula::False)).unwrap());
        assert!(!model_check(&m, "w", &Formula::kpos("a", Formula::True)).unwrap());
        assert!(model_check(&m, "w", &Formula::kw("a", p())).unwrap());
    }

    #[test]
    fn xor_counts_hits() {
        let m = single(&["p", "q"]);
        let q = Formula::atom("q");
        let r = Formula::atom("r");
        assert!(model_check(&m, "w", &Formula::Xor(vec![p(), r.clone()])).unwrap());
        assert!(!model_check(&m, "w", &Formula::Xor(vec![p(), q, r.clone()])).unwrap());
        assert!(!model_check(&m, "w", &Formula::Xor(vec![r])).unwrap());
    }

    #[test]
    fn implication_and_equivalence() {
        let m = single(&["p"]);
        let q = Formula::atom("q");
        assert!(!model_check(&m, "w", &Formula::imply(p(), q.clone())).unwrap());
        assert!(model_check(&m, "w", &Formula::imply(q.clone(), p())).unwrap());
        assert!(!model_check(&m, "w", &Formula::equiv(p(), q.clone())).unwrap());
        assert!(model_check(&m, "w", &Formula::equiv(q.clone().negate(), p())).unwrap());
    }

    #[test]
    fn exactly_counts_listed_atoms() {
        let f = Formula::exactly(2, ["p", "q", "r"]);
        assert!(model_check(&single(&["p", "q"]), "w", &f).unwrap());
        assert!(!model_check(&single(&["p"]), "w", &f).unwrap());
        assert!(!model_check(&single(&["p", "q", "r"]), "w", &f).unwrap());
    }

    #[test]
    fn update_formula_selects_matching_world() {
        let mut values = BTreeMap::new();
        values.insert("p".to_string(), true);
        values.insert("q".to_string(), false);
        let f = create_update_formula(&values);
        assert!(model_check(&single(&["p"]), "w", &f).unwrap());
        assert!(!model_check(&single(&["p", "q"]), "w", &f).unwrap());
    }

    #[test]
    fn yesterday_on_explicit_model_is_false() {
        let m = single(&["p"]);
        assert!(!model_check(&m, "w", &Formula::yesterday(Formula::True)).unwrap());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(128))]

        #[test]
        fn knowledge_is_dual_of_possibility(m in model_strategy(), f in formula_strategy()) {
            for id in m.world_ids() {
                for agent in ["a", "b"] {
                    let k = model_check(&m, id, &Formula::k(agent, f.clone())).unwrap();
                    let pos = model_check(&m, id, &Formula::kpos(agent, f.clone().negate())).unwrap();
                    prop_assert_eq!(k, !pos);
                }
            }
        }

        #[test]
        fn knows_whether_is_uniformity(m in model_strategy(), f in formula_strategy()) {
            for id in m.world_ids() {
                let kw = model_check(&m, id, &Formula::kw("a", f.clone())).unwrap();
                let values: Vec<bool> = m
                    .successors(id, "a")
                    .unwrap()
                    .iter()
                    .map(|s| model_check(&m, s, &f).unwrap())
                    .collect();
                let uniform = values.iter().all(|v| *v) || values.iter().all(|v| !*v);
                prop_assert_eq!(kw, uniform);
            }
        }

        #[test]
        fn evaluation_is_total_on_known_worlds(m in model_strategy(), f in formula_strategy()) {
            for id in m.world_ids() {
                prop_assert!(model_check(&m, id, &f).is_ok());
            }
        }
    }
}
