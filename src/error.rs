//! Errors reported while exploring a model or analyzing a chain.
//!
//! Model errors are deterministic: rerunning the same model reproduces them.
//! Every variant carries enough context (the offending state rendered with
//! `Debug`, the choice path taken) to locate the problem in the model.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// A replay of `step` with an identical choice prefix took a different shape.
    #[error("model is nondeterministic in state {state} on choice path {path:?}: {reason}")]
    ModelNondeterminism {
        state: String,
        path: Vec<usize>,
        reason: String,
    },

    /// `step` neither made a choice nor changed the state, and no self-loop was declared.
    #[error("undefined transition: state {state} has no outgoing transition (declare a self-loop with `Choice::stay`)")]
    UndefinedTransition { state: String },

    /// The number of discovered states exceeded the configured ceiling.
    #[error("state space overflow: more than {limit} states discovered (while adding {state})")]
    StateSpaceOverflow { limit: usize, state: String },

    /// A single `step` produced more choice paths than the configured ceiling.
    #[error("successor overflow: state {state} has more than {limit} choice paths")]
    SuccessorOverflow { limit: usize, state: String },

    /// A weighted choice received weights that do not form a distribution.
    #[error("invalid choice in state {state} on choice path {path:?}: {reason}")]
    InvalidChoice {
        state: String,
        path: Vec<usize>,
        reason: String,
    },

    /// The chain handed to an analysis is malformed.
    #[error("invalid chain at state #{state}: {reason}")]
    InvalidChain { state: usize, reason: String },

    #[error("unknown label '{0}'")]
    UnknownLabel(String),

    #[error("unsupported formula: {0}")]
    UnsupportedFormula(String),

    /// Value iteration did not reach the requested precision.
    #[error("value iteration did not converge after {iterations} iterations (residual {residual:e})")]
    NoConvergence { iterations: usize, residual: f64 },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
