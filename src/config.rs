//! Engine configuration.
//!
//! All ceilings turn unbounded work into a reported error instead of a hang
//! or an out-of-memory condition.

/// Configuration options for exploration and analysis.
///
/// Use `Configuration::default()` for standard settings, or one of the
/// capacity presets.
///
/// # Examples
///
/// ```
/// use pmc_rs::config::Configuration;
///
/// let conf = Configuration {
///     strict: true,
///     ..Configuration::small()
/// };
/// assert_eq!(conf.max_states, 1024);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Configuration {
    /// Maximal number of states a chain may contain (default: `1 << 20`)
    pub max_states: usize,
    /// Maximal number of choice paths of a single `step` (default: `1 << 14`)
    pub max_successors: usize,
    /// Reject states whose `step` silently does nothing (default: false)
    pub strict: bool,
    /// Tolerance for outgoing probabilities summing to one (default: `1e-9`)
    pub tolerance: f64,
    /// Convergence threshold of value iteration (default: `1e-12`)
    pub epsilon: f64,
    /// Maximal number of value-iteration sweeps (default: `1 << 20`)
    pub max_iterations: usize,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            max_states: 1 << 20,
            max_successors: 1 << 14,
            strict: false,
            tolerance: 1e-9,
            epsilon: 1e-12,
            max_iterations: 1 << 20,
        }
    }
}

impl Configuration {
    /// Capacity for toy models: 1024 states.
    pub fn small() -> Self {
        Self {
            max_states: 1024,
            max_successors: 1024 << 2,
            ..Self::default()
        }
    }

    pub fn normal() -> Self {
        Self {
            max_states: 1 << 21,
            max_successors: 1 << 16,
            ..Self::default()
        }
    }

    pub fn large() -> Self {
        Self {
            max_states: 1 << 26,
            max_successors: 1 << 18,
            ..Self::default()
        }
    }
}
