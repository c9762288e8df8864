//! Chain builder: explicit state-space exploration of a model.
//!
//! Exploration is a breadth-first worklist over state indices. A state is
//! marked as visited (stored) the moment it is first discovered, so states
//! reached along several paths, and cycles back to known states, are expanded
//! exactly once. Since indices are handed out in discovery order and the
//! worklist is FIFO, states are expanded in index order.

use std::collections::VecDeque;

use log::{debug, info};

use crate::bitset::BitSet;
use crate::config::Configuration;
use crate::error::Result;
use crate::interceptor::BranchInterceptor;
use crate::lmc::{Lmc, Transition, FORMULA_LABEL};
use crate::model::Model;
use crate::storage::StateStorage;

type Predicate<'a, S> = Box<dyn Fn(&S) -> bool + 'a>;

/// Builds the labeled Markov chain of a model.
///
/// # Examples
///
/// ```
/// use pmc_rs::builder::ChainBuilder;
/// use pmc_rs::choice::Choice;
/// use pmc_rs::model::Model;
///
/// /// Counts up to 3 and then stays there.
/// struct Counter;
///
/// impl Model for Counter {
///     type State = u8;
///     fn initial_state(&self) -> u8 { 0 }
///     fn step(&self, s: &u8, _choice: &mut Choice) -> u8 { (*s + 1).min(3) }
///     fn evaluate(&self, s: &u8) -> bool { *s == 3 }
/// }
///
/// let lmc = ChainBuilder::new(&Counter)
///     .label("even", |s| s % 2 == 0)
///     .build()
///     .unwrap();
/// assert_eq!(lmc.num_states(), 4);
/// assert_eq!(lmc.label("even").unwrap().len(), 2);
/// ```
pub struct ChainBuilder<'a, M: Model> {
    model: &'a M,
    conf: Configuration,
    labels: Vec<(String, Predicate<'a, M::State>)>,
}

impl<'a, M: Model> ChainBuilder<'a, M> {
    pub fn new(model: &'a M) -> Self {
        Self {
            model,
            conf: Configuration::default(),
            labels: Vec::new(),
        }
    }

    pub fn with_config(mut self, conf: Configuration) -> Self {
        self.conf = conf;
        self
    }

    /// Record an additional named state predicate as a label of the chain.
    pub fn label(mut self, name: impl Into<String>, pred: impl Fn(&M::State) -> bool + 'a) -> Self {
        self.labels.push((name.into(), Box::new(pred)));
        self
    }

    /// Explore the model and return its chain.
    pub fn build(self) -> Result<Lmc<M::State>> {
        info!("Building chain (max {} states)", self.conf.max_states);

        let mut storage = StateStorage::new(self.conf.max_states);
        let (initial, _) = storage.put(self.model.initial_state())?;

        let mut interceptor = BranchInterceptor::new(self.model, &self.conf);
        let mut worklist = VecDeque::from([initial]);
        let mut expanded: Vec<Vec<Transition>> = Vec::new();

        while let Some(index) = worklist.pop_front() {
            debug_assert_eq!(index, expanded.len());
            let outcomes = interceptor.successors(&storage[index])?;

            let mut transitions = Vec::with_capacity(outcomes.len());
            for (probability, target) in outcomes {
                let (target, is_new) = storage.put(target)?;
                if is_new {
                    worklist.push_back(target);
                }
                transitions.push(Transition { probability, target });
            }
            debug!("expanded #{} into {} transitions, {} states known", index, transitions.len(), storage.len());
            expanded.push(transitions);
        }

        let mut lmc = Lmc::new(storage, initial);
        for (index, transitions) in expanded.into_iter().enumerate() {
            lmc.set_transitions(index, transitions);
        }

        let formula = lmc.satisfying(|s| self.model.evaluate(s));
        lmc.add_label(FORMULA_LABEL, formula);
        for (name, pred) in &self.labels {
            let states = BitSet::from_fn(lmc.num_states(), |i| pred(lmc.state(i)));
            lmc.add_label(name.clone(), states);
        }

        info!("Built chain with {} states and {} transitions", lmc.num_states(), lmc.num_transitions());
        Ok(lmc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    use crate::choice::Choice;
    use crate::error::Error;

    /// Random walk on a ring of `size` positions.
    struct Ring {
        size: u32,
    }

    impl Model for Ring {
        type State = u32;

        fn initial_state(&self) -> u32 {
            0
        }

        fn step(&self, state: &u32, choice: &mut Choice) -> u32 {
            let delta = choice.choose(&[1, self.size - 1]);
            (state + delta) % self.size
        }

        fn evaluate(&self, state: &u32) -> bool {
            *state == self.size / 2
        }
    }

    #[test]
    fn test_ring() {
        let lmc = ChainBuilder::new(&Ring { size: 6 }).build().unwrap();
        assert_eq!(lmc.num_states(), 6);
        assert_eq!(lmc.num_transitions(), 12);
        assert_eq!(lmc.initial_index(), 0);
        assert_eq!(*lmc.initial_state(), 0);
        assert!(lmc.validate(1e-9).is_ok());
        assert_eq!(lmc.formula_label().unwrap().iter().collect::<Vec<_>>(), vec![lmc.index_of(&3).unwrap()]);
    }

    #[test]
    fn test_every_state_sums_to_one() {
        let lmc = ChainBuilder::new(&Ring { size: 7 }).build().unwrap();
        for i in 0..lmc.num_states() {
            let sum: f64 = lmc.transitions(i).iter().map(|t| t.probability.value()).sum();
            assert!((sum - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_overflow() {
        let conf = Configuration {
            max_states: 4,
            ..Configuration::default()
        };
        let err = ChainBuilder::new(&Ring { size: 10 }).with_config(conf).build().unwrap_err();
        assert!(matches!(err, Error::StateSpaceOverflow { limit: 4, .. }));
    }

    #[test]
    fn test_extra_labels() {
        let lmc = ChainBuilder::new(&Ring { size: 4 })
            .label("zero", |s| *s == 0)
            .label("odd", |s| s % 2 == 1)
            .build()
            .unwrap();
        assert_eq!(lmc.label_names(), &[FORMULA_LABEL.to_string(), "zero".to_string(), "odd".to_string()]);
        assert_eq!(lmc.label("odd").unwrap().len(), 2);
    }

    /// Counter that offers one more option on every call of `step`.
    struct Growing {
        calls: std::cell::Cell<usize>,
    }

    impl Model for Growing {
        type State = usize;

        fn initial_state(&self) -> usize {
            0
        }

        fn step(&self, _state: &usize, choice: &mut Choice) -> usize {
            self.calls.set(self.calls.get() + 1);
            choice.choose_index(self.calls.get() + 1)
        }

        fn evaluate(&self, _state: &usize) -> bool {
            false
        }
    }

    #[test]
    fn test_nondeterminism_aborts_build() {
        let model = Growing { calls: Default::default() };
        let err = ChainBuilder::new(&model).build().unwrap_err();
        match err {
            Error::ModelNondeterminism { state, path, .. } => {
                assert_eq!(state, "0");
                assert_eq!(path, vec![1]);
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_repeated_builds_agree() {
        let a = ChainBuilder::new(&Ring { size: 5 }).build().unwrap();
        let b = ChainBuilder::new(&Ring { size: 5 }).build().unwrap();
        assert_eq!(a.num_states(), b.num_states());
        for (i, s) in a.states().enumerate() {
            let j = b.index_of(s).unwrap();
            let mut ta: Vec<_> = a.transitions(i).iter().map(|t| (a.state(t.target), t.probability.value())).collect();
            let mut tb: Vec<_> = b.transitions(j).iter().map(|t| (b.state(t.target), t.probability.value())).collect();
            ta.sort_by(|x, y| x.partial_cmp(y).unwrap());
            tb.sort_by(|x, y| x.partial_cmp(y).unwrap());
            assert_eq!(ta, tb);
        }
    }
}
