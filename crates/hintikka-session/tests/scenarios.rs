//! End-to-end scenarios through the public API of all three library crates.

use std::collections::BTreeMap;

use hintikka_core::{
    create_update_formula, parse_formula, EpistemicModel, ExplicitEpistemicModel, Formula,
    WorldValuation,
};
use hintikka_event::{EventError, ExplicitEventModel, Postcondition};
use hintikka_session::{
    seed_agent_model, DescriptionCache, Modality, ModelDescription, Query, Representation,
    Session, SessionConfig, StaticValuations, TransitionSpec,
};

const COIN: &str = r#"{
    "name": "coin",
    "initialModel": {
        "worlds": [
            {"name": "w1", "props": ["p"]},
            {"name": "w2", "props": []}
        ],
        "pointedWorld": "w1"
    }
}"#;

fn coin_model() -> ExplicitEpistemicModel {
    ModelDescription::from_json(COIN)
        .unwrap()
        .build_explicit("a")
        .unwrap()
}

#[test]
fn complete_relation_hides_the_coin() {
    let m = coin_model();
    assert!(!m.model_check("w1", &Formula::k("a", Formula::atom("p"))).unwrap());
    assert!(m.model_check("w1", &Formula::kpos("a", Formula::atom("p"))).unwrap());
}

#[test]
fn public_announcement_leaves_one_reachable_world() {
    let m = coin_model();
    let announce = ExplicitEventModel::public_announcement(Formula::atom("p"), ["a"]);
    let after = announce.apply_and_prune(&m).unwrap();
    assert_eq!(after.world_ids(), ["w1_e".to_string()]);
    assert!(after
        .model_check("w1_e", &Formula::k("a", Formula::atom("p")))
        .unwrap());

    // Saying it again changes nothing but the names.
    let again = announce.apply_and_prune(&after).unwrap();
    assert_eq!(again.world_count(), 1);
    assert_eq!(again.pointed_world(), Some("w1_e_e"));
}

#[test]
fn update_formula_matches_only_its_valuation() {
    let mut values = BTreeMap::new();
    values.insert("p".to_string(), true);
    values.insert("q".to_string(), false);
    let f = create_update_formula(&values);

    let mut m = ExplicitEpistemicModel::new(["a"]);
    m.add_world("yes", WorldValuation::from_true(["p"])).unwrap();
    m.add_world("no", WorldValuation::from_true(["p", "q"])).unwrap();
    assert!(m.model_check("yes", &f).unwrap());
    assert!(!m.model_check("no", &f).unwrap());
}

#[test]
fn exactly_counts_true_atoms() {
    let mut m = ExplicitEpistemicModel::new(["a"]);
    m.add_world("two", WorldValuation::from_true(["p", "q"])).unwrap();
    m.add_world("one", WorldValuation::from_true(["p"])).unwrap();
    let f = parse_formula("(exactly 2 p q r)").unwrap();
    assert!(m.model_check("two", &f).unwrap());
    assert!(!m.model_check("one", &f).unwrap());
}

#[test]
fn failed_session_updates_are_reported_not_raised() {
    let mut session = Session::from_json(COIN, SessionConfig::default()).unwrap();
    let before = session.summary();

    let out = session.announce(&Formula::atom("p").negate()).unwrap();
    assert!(!out.success);
    assert_eq!(session.summary(), before);

    let out = session.announce(&Formula::atom("p")).unwrap();
    assert!(out.success);
    assert_eq!(out.summary.worlds, 1);
}

#[test]
fn contradictory_and_inapplicable_are_distinct() {
    let m = coin_model();
    let nothing = ExplicitEventModel::public_announcement(Formula::False, ["a"]);
    // `f` (not bottom) survives everywhere, but the pointed pair does not.
    assert!(matches!(
        nothing.product(&m),
        Err(EventError::NotApplicable { .. })
    ));

    let mut impossible = ExplicitEventModel::new(["a"]);
    impossible
        .add_event("e", Formula::atom("missing"), Postcondition::Trivial)
        .unwrap();
    impossible.set_pointed_event("e").unwrap();
    assert_eq!(impossible.product(&m).unwrap_err(), EventError::Contradictory);
}

#[test]
fn queries_over_an_agent_session() {
    let config = SessionConfig {
        representation: Representation::Agent,
        ..SessionConfig::default()
    };
    let mut session = Session::from_json(COIN, config).unwrap();
    let queries = [
        Query::new(1, Modality::Knows, "p"),
        Query::new(2, Modality::Possible, "p").negate_prop(),
    ];
    let results = session.evaluate(&queries).unwrap();
    assert!(!results[&1]);
    assert!(results[&2]);

    let mut knowledge = BTreeMap::new();
    knowledge.insert("p".to_string(), true);
    assert!(session.update(knowledge).unwrap().success);
    let results = session.evaluate(&queries).unwrap();
    assert!(results[&1]);
    assert!(!results[&2]);
}

#[test]
fn transitions_after_solver_seeding() {
    let formula = parse_formula("(at_a xor at_b)").unwrap();
    let mut source = StaticValuations::new([vec!["p0"], vec!["p1"]]);
    let seeded = seed_agent_model(&mut source, &formula, 8, "a").unwrap();
    assert_eq!(seeded.world_count(), 2);

    let explicit = seeded.to_explicit().unwrap();
    let description = ModelDescription::from_model(Some("seeded".into()), &explicit);
    let config = SessionConfig {
        representation: Representation::Agent,
        ..SessionConfig::default()
    };
    let mut session = Session::new(description, config).unwrap();
    let out = session
        .transition(&[TransitionSpec::new("at_a", "at_b")])
        .unwrap();
    assert!(out.success);
    assert!(session.check_text("(K a at_b)").unwrap());
}

#[test]
fn cache_dedupes_sessions_by_content() {
    let mut cache = DescriptionCache::new();
    let (first, _) = cache.get_or_insert(COIN).unwrap();
    let exported = ModelDescription::from_model(Some("coin".into()), &coin_model());
    let second = cache.insert(exported).unwrap();
    assert_ne!(first, second);
    assert_eq!(cache.len(), 2);

    let description = cache.get(&first).unwrap().clone();
    let session = Session::new(description, SessionConfig::default()).unwrap();
    assert_eq!(session.description().name(), "coin");
}

#[test]
fn contraction_keeps_answers() {
    let text = r#"{
        "initialModel": {
            "worlds": [
                {"name": "u1", "props": ["p"]},
                {"name": "u2", "props": ["p"]},
                {"name": "v", "props": []}
            ]
        }
    }"#;
    let m = ModelDescription::from_json(text)
        .unwrap()
        .build_explicit("a")
        .unwrap();
    let small = m.contract(&["a".to_string()]).unwrap();
    assert_eq!(small.world_count(), 2);
    for f in ["(K a p)", "(Kpos a p)", "(Kw a p)", "(K a (Kpos a (not p)))"] {
        let f = parse_formula(f).unwrap();
        assert_eq!(m.check(&f).unwrap(), small.check(&f).unwrap());
    }
}
