use test_log::test;

use pmc_rs::checker::ModelChecker;
use pmc_rs::choice::Choice;
use pmc_rs::config::Configuration;
use pmc_rs::error::Error;
use pmc_rs::formula::Formula;
use pmc_rs::lmc::Lmc;
use pmc_rs::model::Model;
use pmc_rs::probability::Probability;
use pmc_rs::Engine;

/// Knuth-Yao die: a fair six-sided die simulated with a fair coin.
///
/// Intermediate states name the faces still possible; `3123` and `6456`
/// flip once more and either settle or go back ("rethrow").
struct Die {
    declare_loops: bool,
}

impl Model for Die {
    type State = u32;

    fn initial_state(&self) -> u32 {
        0
    }

    fn step(&self, state: &u32, choice: &mut Choice) -> u32 {
        match *state {
            0 => choice.choose(&[123, 456]),
            123 => choice.choose(&[12, 3123]),
            456 => choice.choose(&[45, 6456]),
            12 => choice.choose(&[1, 2]),
            3123 => choice.choose(&[3, 123]),
            45 => choice.choose(&[4, 5]),
            6456 => choice.choose(&[6, 456]),
            face => {
                if self.declare_loops {
                    choice.stay();
                }
                face
            }
        }
    }

    fn evaluate(&self, state: &u32) -> bool {
        *state == 6
    }
}

fn die_chain() -> Lmc<u32> {
    pmc_rs::build_chain(&Die { declare_loops: true }).unwrap()
}

#[test]
fn test_chain_shape() {
    let lmc = die_chain();
    assert_eq!(lmc.num_states(), 13);
    assert_eq!(*lmc.initial_state(), 0);
    for face in 1..=6 {
        let i = lmc.index_of(&face).unwrap();
        assert_eq!(lmc.transitions(i).len(), 1);
        assert_eq!(lmc.transitions(i)[0].target, i);
    }
}

#[test]
fn test_outgoing_sums() {
    let lmc = die_chain();
    for i in 0..lmc.num_states() {
        let sum: Probability = lmc.transitions(i).iter().map(|t| t.probability).sum();
        assert!(sum.is_one(1e-9), "state {:?} sums to {}", lmc.state(i), sum.value());
    }
}

#[test]
fn test_rebuild_is_isomorphic() {
    let a = die_chain();
    let b = die_chain();
    assert_eq!(a.num_states(), b.num_states());
    assert_eq!(a.num_transitions(), b.num_transitions());
    for (i, state) in a.states().enumerate() {
        let j = b.index_of(state).unwrap();
        for t in a.transitions(i) {
            let target = b.index_of(a.state(t.target)).unwrap();
            let u = b.transitions(j).iter().find(|u| u.target == target).unwrap();
            assert_eq!(t.probability, u.probability);
        }
    }
}

#[test]
fn test_reachability() {
    let die = Die { declare_loops: true };
    assert!(pmc_rs::check_reachability(&die, |s| *s == 6).unwrap());
    assert!(!pmc_rs::check_reachability(&die, |s| *s == 7).unwrap());

    let lmc = die_chain();
    let six = lmc.formula_label().unwrap();
    assert!(lmc.is_reachable(six));
    let path: Vec<u32> = lmc.find_path(six).unwrap().into_iter().map(|i| *lmc.state(i)).collect();
    assert_eq!(path, vec![0, 456, 6456, 6]);
}

#[test]
fn test_bounded_values() {
    let lmc = die_chain();
    let six = |s: &u32| *s == 6;
    let expected = [0.0, 0.0, 0.0, 0.125, 0.125, 0.15625];
    for (k, p) in expected.into_iter().enumerate() {
        let actual = pmc_rs::bounded_probability(&lmc, six, k).unwrap();
        assert!(actual.is_around(p, 1e-12), "k = {}: {} instead of {}", k, actual.value(), p);
    }
}

#[test]
fn test_bound_zero() {
    let lmc = die_chain();
    assert_eq!(pmc_rs::bounded_probability(&lmc, |s| *s == 0, 0).unwrap(), Probability::ONE);
    assert_eq!(pmc_rs::bounded_probability(&lmc, |s| *s == 6, 0).unwrap(), Probability::ZERO);
}

#[test]
fn test_monotone_and_converges() {
    let lmc = die_chain();
    let mut last = Probability::ZERO;
    for k in 0..60 {
        let p = pmc_rs::bounded_probability(&lmc, |s| *s == 6, k).unwrap();
        assert!(p >= last);
        last = p;
    }
    assert!(last.is_around(1.0 / 6.0, 1e-9));

    let checker = ModelChecker::new(&lmc);
    let p = checker.unbounded_finally(lmc.formula_label().unwrap()).unwrap();
    assert!(p.is_around(1.0 / 6.0, 1e-9));
}

#[test]
fn test_every_face_is_fair() {
    let engine = Engine::default();
    let lmc = engine.build_chain(&Die { declare_loops: true }).unwrap();
    let checker = ModelChecker::new(&lmc);
    for face in 1..=6 {
        let targets = lmc.satisfying(|s| *s == face);
        let p = checker.unbounded_finally(&targets).unwrap();
        assert!(p.is_around(1.0 / 6.0, 1e-9), "face {}: {}", face, p.value());
    }
}

#[test]
fn test_formulas_on_labels() {
    let lmc = pmc_rs::builder::ChainBuilder::new(&Die { declare_loops: true })
        .label("low", |s| (1..=3).contains(s))
        .label("face", |s| (1..=6).contains(s))
        .build()
        .unwrap();
    let checker = ModelChecker::new(&lmc);

    let low = Formula::label("low");
    let face = Formula::label("face");
    let p = checker.calculate_probability(&Formula::finally(low.clone())).unwrap();
    assert!(p.is_around(0.5, 1e-9));
    let p = checker.calculate_probability(&Formula::finally(face.clone())).unwrap();
    assert!(p.is_one(1e-9));
    let p = checker
        .calculate_probability(&Formula::bounded_finally(face & !low, 3))
        .unwrap();
    assert!(p.is_around(0.375, 1e-12));
}

/// A model whose `step` never chooses and never moves.
struct Stuck;

impl Model for Stuck {
    type State = &'static str;

    fn initial_state(&self) -> &'static str {
        "stuck"
    }

    fn step(&self, state: &&'static str, _choice: &mut Choice) -> &'static str {
        *state
    }

    fn evaluate(&self, _state: &&'static str) -> bool {
        true
    }
}

#[test]
fn test_stuck_model() {
    let lmc = pmc_rs::build_chain(&Stuck).unwrap();
    assert_eq!(lmc.num_states(), 1);
    assert_eq!(lmc.num_transitions(), 1);
    assert_eq!(lmc.transitions(0)[0].probability, Probability::ONE);
    assert_eq!(lmc.transitions(0)[0].target, 0);

    assert!(!pmc_rs::check_reachability(&Stuck, |s| *s != "stuck").unwrap());
    for k in 0..5 {
        assert_eq!(pmc_rs::bounded_probability(&lmc, |_| true, k).unwrap(), Probability::ONE);
        assert_eq!(pmc_rs::bounded_probability(&lmc, |_| false, k).unwrap(), Probability::ZERO);
    }
}

#[test]
fn test_strict_mode() {
    let strict = Engine::new(Configuration {
        strict: true,
        ..Configuration::default()
    });

    let err = strict.build_chain(&Stuck).unwrap_err();
    assert_eq!(
        err,
        Error::UndefinedTransition {
            state: "\"stuck\"".to_string()
        }
    );

    // Faces fall through without declaring a self-loop.
    let err = strict.build_chain(&Die { declare_loops: false }).unwrap_err();
    assert!(matches!(err, Error::UndefinedTransition { .. }));

    // Declared self-loops pass.
    assert_eq!(strict.build_chain(&Die { declare_loops: true }).unwrap().num_states(), 13);
}

#[test]
fn test_state_ceiling() {
    let engine = Engine::new(Configuration {
        max_states: 5,
        ..Configuration::default()
    });
    let err = engine.build_chain(&Die { declare_loops: true }).unwrap_err();
    assert!(matches!(err, Error::StateSpaceOverflow { limit: 5, .. }));
}
