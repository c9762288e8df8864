//! # pmc-rs: Probabilistic model checking of executable models
//!
//! **`pmc-rs`** analyzes probabilistic systems that are written as plain Rust
//! code. A model supplies an initial state, a `step` function that resolves
//! probabilistic branches through a [`Choice`][crate::choice::Choice], and a
//! formula over states. The engine turns the model into an explicit
//! **labeled Markov chain** and answers questions about it.
//!
//! ## How it works
//!
//! - The **branch interceptor** replays `step` once for every combination of
//!   choices, recording which option was taken at each `choose` call, and
//!   collects the resulting probability distribution over successor states.
//! - The **chain builder** explores all reachable states breadth-first and
//!   records every distribution as transitions of an [`Lmc`][crate::lmc::Lmc].
//! - The **reachability checker** asks whether a satisfying state is reachable
//!   at all.
//! - The **model checker** computes the probability of reaching a satisfying
//!   state within `k` transitions (and, more generally, bounded and unbounded
//!   until formulas).
//!
//! ## Basic Usage
//!
//! A fair die simulated by a fair coin (Knuth and Yao):
//!
//! ```rust
//! use pmc_rs::choice::Choice;
//! use pmc_rs::model::Model;
//!
//! struct Die;
//!
//! impl Model for Die {
//!     type State = u32;
//!
//!     fn initial_state(&self) -> u32 {
//!         0
//!     }
//!
//!     fn step(&self, state: &u32, choice: &mut Choice) -> u32 {
//!         match *state {
//!             0 => choice.choose(&[123, 456]),
//!             123 => choice.choose(&[12, 3123]),
//!             456 => choice.choose(&[45, 6456]),
//!             12 => choice.choose(&[1, 2]),
//!             3123 => choice.choose(&[3, 123]),
//!             45 => choice.choose(&[4, 5]),
//!             6456 => choice.choose(&[6, 456]),
//!             face => {
//!                 choice.stay();
//!                 face
//!             }
//!         }
//!     }
//!
//!     fn evaluate(&self, state: &u32) -> bool {
//!         *state == 6
//!     }
//! }
//!
//! // 1. Is a six possible at all?
//! assert!(pmc_rs::check_reachability(&Die, |s| *s == 6).unwrap());
//!
//! // 2. Build the chain once...
//! let chain = pmc_rs::build_chain(&Die).unwrap();
//! assert_eq!(chain.num_states(), 13);
//!
//! // 3. ...and query it.
//! let p = pmc_rs::bounded_probability(&chain, |s| *s == 6, 3).unwrap();
//! assert!(p.is_around(0.125, 1e-12));
//! ```
//!
//! ## Core Components
//!
//! - **[`model`]** and **[`choice`]**: what a model implements and the branch-selection primitive.
//! - **[`builder`]**: explicit state-space exploration into an [`Lmc`][crate::lmc::Lmc].
//! - **[`checker`]**: bounded and unbounded probabilities of [`formula`]s.
//! - **[`dot`]**: Graphviz export of chains.
//! - **[`Engine`]**: all of the above behind one [`Configuration`][crate::config::Configuration].

pub mod bitset;
pub mod builder;
pub mod checker;
pub mod choice;
pub mod config;
pub mod dot;
pub mod error;
pub mod formula;
pub mod interceptor;
pub mod lmc;
pub mod model;
pub mod probability;
pub mod reachability;
pub mod storage;

use crate::builder::ChainBuilder;
use crate::checker::ModelChecker;
use crate::config::Configuration;
use crate::error::Result;
use crate::lmc::Lmc;
use crate::model::Model;
use crate::probability::Probability;

/// Analysis entry point sharing one configuration.
///
/// ```
/// use pmc_rs::config::Configuration;
/// use pmc_rs::Engine;
///
/// let engine = Engine::new(Configuration {
///     strict: true,
///     ..Configuration::small()
/// });
/// assert!(engine.config().strict);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Engine {
    conf: Configuration,
}

impl Engine {
    pub fn new(conf: Configuration) -> Self {
        Self { conf }
    }

    pub fn config(&self) -> &Configuration {
        &self.conf
    }

    /// Build the labeled Markov chain of `model`.
    pub fn build_chain<M: Model>(&self, model: &M) -> Result<Lmc<M::State>> {
        ChainBuilder::new(model).with_config(self.conf.clone()).build()
    }

    /// Whether a state satisfying `pred` is reachable in `model`, exploring on the fly.
    pub fn check_reachability<M, F>(&self, model: &M, pred: F) -> Result<bool>
    where
        M: Model,
        F: Fn(&M::State) -> bool,
    {
        reachability::check_reachability(model, pred, &self.conf)
    }

    /// Probability of reaching a state satisfying `pred` within `bound` transitions.
    pub fn bounded_probability<S>(&self, lmc: &Lmc<S>, pred: impl Fn(&S) -> bool, bound: usize) -> Result<Probability> {
        let targets = lmc.satisfying(pred);
        ModelChecker::with_config(lmc, self.conf.clone()).bounded_probability(&targets, bound)
    }
}

/// Build the labeled Markov chain of `model` with the default configuration.
pub fn build_chain<M: Model>(model: &M) -> Result<Lmc<M::State>> {
    Engine::default().build_chain(model)
}

/// Whether a state satisfying `pred` is reachable in `model`.
pub fn check_reachability<M, F>(model: &M, pred: F) -> Result<bool>
where
    M: Model,
    F: Fn(&M::State) -> bool,
{
    Engine::default().check_reachability(model, pred)
}

/// Probability of reaching a state of `lmc` satisfying `pred` within `bound` transitions.
pub fn bounded_probability<S>(lmc: &Lmc<S>, pred: impl Fn(&S) -> bool, bound: usize) -> Result<Probability> {
    Engine::default().bounded_probability(lmc, pred, bound)
}
