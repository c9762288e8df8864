//! Labeled Markov chains.
//!
//! An [`Lmc`] is the explicit, immutable result of exploring a model: every
//! reachable state gets a dense [`StateIndex`] (the initial state is `0` for
//! chains built from a model), the outgoing transitions of all states are
//! stored back to back in one vector, and each label is a [`BitSet`] of the
//! states satisfying it.
//!
//! # Examples
//!
//! Chains can also be assembled by hand:
//!
//! ```
//! use pmc_rs::lmc::Lmc;
//!
//! // 'a' -> 'b' with 1/2, 'a' -> 'a' with 1/2, 'b' loops.
//! let lmc = Lmc::from_parts(
//!     vec!['a', 'b'],
//!     0,
//!     vec![vec![(0.5, 1), (0.5, 0)], vec![(1.0, 1)]],
//! )
//! .unwrap()
//! .with_label("is_b", |c| *c == 'b');
//!
//! assert_eq!(lmc.num_states(), 2);
//! assert!(lmc.validate(1e-9).is_ok());
//! assert!(lmc.label("is_b").unwrap().contains(1));
//! ```

use std::fmt::Debug;
use std::hash::Hash;

use crate::bitset::BitSet;
use crate::error::{Error, Result};
use crate::probability::Probability;
use crate::storage::StateStorage;

pub type StateIndex = usize;

/// Label under which the model's own `evaluate` is cached.
pub const FORMULA_LABEL: &str = "formula";

/// A probabilistic edge to `target`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transition {
    pub probability: Probability,
    pub target: StateIndex,
}

/// Location of a state's transitions in the shared transition vector.
#[derive(Debug, Copy, Clone, Default)]
struct StateEntry {
    from: usize,
    elements: usize,
}

pub struct Lmc<S> {
    storage: StateStorage<S>,
    entries: Vec<StateEntry>,
    transitions: Vec<Transition>,
    initial: StateIndex,
    label_names: Vec<String>,
    labels: Vec<BitSet>,
}

impl<S> Debug for Lmc<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lmc")
            .field("states", &self.num_states())
            .field("transitions", &self.num_transitions())
            .field("initial", &self.initial)
            .field("labels", &self.label_names)
            .finish()
    }
}

impl<S> Lmc<S> {
    pub(crate) fn new(storage: StateStorage<S>, initial: StateIndex) -> Self {
        let num_states = storage.len();
        Self {
            storage,
            entries: vec![StateEntry::default(); num_states],
            transitions: Vec::new(),
            initial,
            label_names: Vec::new(),
            labels: Vec::new(),
        }
    }

    /// Append the outgoing transitions of `state`. Each state is set once.
    pub(crate) fn set_transitions(&mut self, state: StateIndex, transitions: impl IntoIterator<Item = Transition>) {
        if state >= self.entries.len() {
            self.entries.resize(state + 1, StateEntry::default());
        }
        assert_eq!(self.entries[state].elements, 0, "Transitions of state {} already set", state);
        let from = self.transitions.len();
        self.transitions.extend(transitions);
        self.entries[state] = StateEntry {
            from,
            elements: self.transitions.len() - from,
        };
    }

    pub(crate) fn add_label(&mut self, name: impl Into<String>, states: BitSet) {
        let name = name.into();
        assert_eq!(states.universe(), self.num_states(), "Label '{}' has wrong universe", name);
        match self.label_names.iter().position(|n| *n == name) {
            Some(i) => self.labels[i] = states,
            None => {
                self.label_names.push(name);
                self.labels.push(states);
            }
        }
    }

    pub fn num_states(&self) -> usize {
        self.storage.len()
    }
    pub fn num_transitions(&self) -> usize {
        self.transitions.len()
    }

    pub fn initial_index(&self) -> StateIndex {
        self.initial
    }
    pub fn initial_state(&self) -> &S {
        self.storage.state(self.initial)
    }

    /// Get the state value with the given index.
    pub fn state(&self, index: StateIndex) -> &S {
        self.storage.state(index)
    }

    /// Iterate over all state values in index order.
    pub fn states(&self) -> impl Iterator<Item = &S> {
        self.storage.iter()
    }

    /// Outgoing transitions of the given state.
    pub fn transitions(&self, index: StateIndex) -> &[Transition] {
        let entry = self.entries[index];
        &self.transitions[entry.from..entry.from + entry.elements]
    }

    /// Targets of the transitions of `index` with positive probability.
    pub fn successors(&self, index: StateIndex) -> impl Iterator<Item = StateIndex> + '_ {
        self.transitions(index)
            .iter()
            .filter(|t| t.probability.value() > 0.0)
            .map(|t| t.target)
    }

    pub fn label_names(&self) -> &[String] {
        &self.label_names
    }

    /// States carrying the label `name`.
    pub fn label(&self, name: &str) -> Result<&BitSet> {
        self.label_names
            .iter()
            .position(|n| n == name)
            .map(|i| &self.labels[i])
            .ok_or_else(|| Error::UnknownLabel(name.to_string()))
    }

    /// States satisfying the model's formula.
    pub fn formula_label(&self) -> Result<&BitSet> {
        self.label(FORMULA_LABEL)
    }

    /// States satisfying an arbitrary predicate.
    pub fn satisfying(&self, pred: impl Fn(&S) -> bool) -> BitSet {
        BitSet::from_fn(self.num_states(), |i| pred(self.state(i)))
    }

    /// Check that the chain is a well-formed Markov chain.
    ///
    /// Every state needs at least one transition, every probability must lie
    /// in `[0, 1]`, every target must exist, and the outgoing probabilities of
    /// each state must sum to one within `tolerance`.
    pub fn validate(&self, tolerance: f64) -> Result<()> {
        let n = self.num_states();
        if self.initial >= n {
            return Err(Error::InvalidChain {
                state: self.initial,
                reason: format!("initial state is out of range (chain has {} states)", n),
            });
        }
        if self.entries.len() != n {
            return Err(Error::InvalidChain {
                state: self.entries.len().min(n),
                reason: "transitions are not set for every state".to_string(),
            });
        }
        for state in 0..n {
            let transitions = self.transitions(state);
            if transitions.is_empty() {
                return Err(Error::InvalidChain {
                    state,
                    reason: "state has no outgoing transition".to_string(),
                });
            }
            let mut sum = Probability::ZERO;
            for t in transitions {
                if !t.probability.is_in_unit_interval() {
                    return Err(Error::InvalidChain {
                        state,
                        reason: format!("transition probability {} is outside [0, 1]", t.probability.value()),
                    });
                }
                if t.target >= n {
                    return Err(Error::InvalidChain {
                        state,
                        reason: format!("transition target #{} does not exist", t.target),
                    });
                }
                sum += t.probability;
            }
            if !sum.is_one(tolerance) {
                return Err(Error::InvalidChain {
                    state,
                    reason: format!("outgoing probabilities sum to {} instead of 1", sum.value()),
                });
            }
        }
        Ok(())
    }
}

impl<S> Lmc<S>
where
    S: Eq + Hash + Debug,
{
    /// Assemble a chain from explicit states and transitions.
    ///
    /// `transitions[i]` lists the `(probability, target)` pairs of `states[i]`.
    /// Structural errors (duplicate states, dangling targets, an initial
    /// index outside the state list) are rejected
    /// here; probability sums are checked by [`validate`][Lmc::validate].
    pub fn from_parts(states: Vec<S>, initial: StateIndex, transitions: Vec<Vec<(f64, StateIndex)>>) -> Result<Self> {
        if states.len() != transitions.len() {
            return Err(Error::InvalidChain {
                state: states.len().min(transitions.len()),
                reason: format!("{} states but {} transition lists", states.len(), transitions.len()),
            });
        }
        let n = states.len();
        if initial >= n {
            return Err(Error::InvalidChain {
                state: initial,
                reason: format!("initial state is out of range (chain has {} states)", n),
            });
        }
        let mut storage = StateStorage::new(n);
        for (i, s) in states.into_iter().enumerate() {
            let description = format!("{:?}", s);
            let (_, is_new) = storage.put(s)?;
            if !is_new {
                return Err(Error::InvalidChain {
                    state: i,
                    reason: format!("duplicate state {}", description),
                });
            }
        }

        let mut lmc = Lmc::new(storage, initial);
        for (i, list) in transitions.into_iter().enumerate() {
            if let Some(&(_, target)) = list.iter().find(|(_, t)| *t >= n) {
                return Err(Error::InvalidChain {
                    state: i,
                    reason: format!("transition target #{} does not exist", target),
                });
            }
            lmc.set_transitions(
                i,
                list.into_iter().map(|(p, target)| Transition {
                    probability: p.into(),
                    target,
                }),
            );
        }
        Ok(lmc)
    }

    /// Find the index of a state value.
    pub fn index_of(&self, state: &S) -> Option<StateIndex> {
        self.storage.index_of(state)
    }

    /// Attach (or replace) the label `name`, evaluating `pred` once per state.
    pub fn with_label(mut self, name: impl Into<String>, pred: impl Fn(&S) -> bool) -> Self {
        let states = self.satisfying(pred);
        self.add_label(name, states);
        self
    }
}
