//! Executable models.
//!
//! An executable model is ordinary Rust code: a starting state, a
//! deterministic `step` function that may ask the engine to resolve
//! probabilistic branches through [`Choice`], and a boolean formula over
//! states. The engine never looks inside the state; it only clones, compares
//! and hashes it.
//!
//! # Examples
//!
//! A fair coin that keeps being flipped:
//!
//! ```
//! use pmc_rs::choice::Choice;
//! use pmc_rs::model::Model;
//!
//! struct Coin;
//!
//! impl Model for Coin {
//!     type State = bool;
//!
//!     fn initial_state(&self) -> bool {
//!         false
//!     }
//!
//!     fn step(&self, _state: &bool, choice: &mut Choice) -> bool {
//!         choice.choose(&[false, true])
//!     }
//!
//!     fn evaluate(&self, state: &bool) -> bool {
//!         *state
//!     }
//! }
//!
//! let chain = pmc_rs::build_chain(&Coin).unwrap();
//! assert_eq!(chain.num_states(), 2);
//! ```

use std::fmt::Debug;
use std::hash::Hash;

use crate::choice::Choice;

pub trait Model {
    /// Model configuration. Equal states are the same chain node.
    type State: Clone + Eq + Hash + Debug;

    fn initial_state(&self) -> Self::State;

    /// Compute the successor of `state`.
    ///
    /// Must be deterministic apart from the values returned by `choice`:
    /// the engine replays `step` once per combination of choices.
    fn step(&self, state: &Self::State, choice: &mut Choice) -> Self::State;

    /// The formula of interest. Must be free of side effects.
    fn evaluate(&self, state: &Self::State) -> bool;
}

impl<M> Model for &M
where
    M: Model + ?Sized,
{
    type State = M::State;

    fn initial_state(&self) -> Self::State {
        (**self).initial_state()
    }

    fn step(&self, state: &Self::State, choice: &mut Choice) -> Self::State {
        (**self).step(state, choice)
    }

    fn evaluate(&self, state: &Self::State) -> bool {
        (**self).evaluate(state)
    }
}
