//! The branch-selection primitive.
//!
//! A [`Choice`] is handed to [`Model::step`][crate::model::Model::step]. It does
//! not draw random numbers: it answers every `choose` call with a
//! pre-selected option and records the shape of the choice tree, so that the
//! [interceptor][crate::interceptor] can replay `step` once per path.
//!
//! # Replay
//!
//! The choices made along one execution of `step` form a stack of frames.
//! Each frame stores the option currently forced at that depth, the number of
//! options offered, and the probability of the path prefix ending with it.
//! Moving to the next path pops exhausted frames and advances the topmost one
//! that still has untried options (depth-first enumeration over the choice
//! tree). During a replay, calls below the stack height return the forced
//! option; calls beyond it push a fresh frame and return option `0`.

use log::trace;

use crate::probability::Probability;

#[derive(Debug, Copy, Clone)]
struct Frame {
    /// Index of the option forced at this depth.
    current: usize,
    /// Number of options offered at this depth.
    count: usize,
    /// Probability of the path prefix ending with this choice.
    probability: Probability,
}

/// Contract violation detected while replaying a path.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Violation {
    Nondeterminism(String),
    InvalidWeights(String),
}

/// Branch-selection handle passed to `step`; replays one choice path per call.
#[derive(Debug, Default)]
pub struct Choice {
    stack: Vec<Frame>,
    /// Number of `choose` calls made during the current replay.
    depth: usize,
    first_path: bool,
    self_loop: bool,
    violation: Option<(Vec<usize>, Violation)>,
}

impl Choice {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Choose one of `options`, each with probability `1/N`.
    ///
    /// # Panics
    ///
    /// Panics if `options` is empty.
    pub fn choose<T: Clone>(&mut self, options: &[T]) -> T {
        let index = self.choose_index(options.len());
        options[index].clone()
    }

    /// Choose one of `options` according to their relative weights.
    ///
    /// Weights must be finite and positive; they are normalized to sum to one.
    ///
    /// # Panics
    ///
    /// Panics if `options` is empty.
    pub fn choose_weighted<T: Clone>(&mut self, options: &[(f64, T)]) -> T {
        let weights: Vec<f64> = options.iter().map(|(w, _)| *w).collect();
        let index = self.choose_index_weighted(&weights);
        options[index].1.clone()
    }

    /// Choose an index in `0..count` uniformly.
    ///
    /// # Panics
    ///
    /// Panics if `count` is zero.
    pub fn choose_index(&mut self, count: usize) -> usize {
        assert!(count > 0, "Choice requires at least one option");
        let uniform = Probability::new(1.0 / count as f64);
        self.resolve(count, |_| uniform)
    }

    /// Choose an index in `0..weights.len()` according to relative weights.
    ///
    /// # Panics
    ///
    /// Panics if `weights` is empty.
    pub fn choose_index_weighted(&mut self, weights: &[f64]) -> usize {
        assert!(!weights.is_empty(), "Choice requires at least one option");

        if let Some(w) = weights.iter().find(|w| !w.is_finite() || **w <= 0.0) {
            self.record(Violation::InvalidWeights(format!(
                "weight {} in {:?} is not a positive finite number",
                w, weights
            )));
        }
        let total: f64 = weights.iter().sum();
        self.resolve(weights.len(), |i| Probability::new(weights[i] / total))
    }

    /// Declare that the current state deliberately loops to itself.
    ///
    /// Only matters in strict mode, where a `step` that makes no choice and
    /// returns its input unchanged is otherwise rejected.
    pub fn stay(&mut self) {
        self.self_loop = true;
    }

    fn resolve(&mut self, count: usize, probability_of: impl Fn(usize) -> Probability) -> usize {
        let previous = self.prefix_probability();
        let depth = self.depth;
        self.depth += 1;

        if depth < self.stack.len() {
            let is_top = depth + 1 == self.stack.len();
            let frame = self.stack[depth];
            if frame.count != count {
                self.record(Violation::Nondeterminism(format!(
                    "choice #{} offered {} options on replay, previously {}",
                    depth, count, frame.count
                )));
                return frame.current.min(count - 1);
            }
            // Only the topmost frame was advanced since the previous replay.
            if is_top {
                self.stack[depth].probability = previous * probability_of(frame.current);
            }
            trace!("replay choice #{}: forced {} of {}", depth, frame.current, count);
            return frame.current;
        }

        trace!("new choice #{}: {} options", depth, count);
        self.stack.push(Frame {
            current: 0,
            count,
            probability: previous * probability_of(0),
        });
        0
    }

    fn prefix_probability(&self) -> Probability {
        if self.depth == 0 {
            Probability::ONE
        } else {
            self.stack[self.depth - 1].probability
        }
    }

    fn record(&mut self, violation: Violation) {
        if self.violation.is_none() {
            self.violation = Some((self.path(), violation));
        }
    }

    /// Reset for a new `step` source state.
    pub(crate) fn begin(&mut self) {
        self.stack.clear();
        self.depth = 0;
        self.first_path = true;
        self.self_loop = false;
        self.violation = None;
    }

    /// Advance to the next unexplored path. Returns `false` once all paths are done.
    pub(crate) fn prepare_next_path(&mut self) -> bool {
        self.depth = 0;
        self.self_loop = false;

        if self.first_path {
            self.first_path = false;
            return true;
        }

        while let Some(mut frame) = self.stack.pop() {
            if frame.current + 1 < frame.count {
                frame.current += 1;
                self.stack.push(frame);
                return true;
            }
        }
        false
    }

    /// Finish the current replay, reporting any violation observed during it.
    pub(crate) fn finish_path(&mut self) -> Result<(), (Vec<usize>, Violation)> {
        if self.violation.is_none() && self.depth < self.stack.len() {
            let reason = format!(
                "replay stopped after {} choices, previously at least {}",
                self.depth,
                self.stack.len()
            );
            self.record(Violation::Nondeterminism(reason));
        }
        match self.violation.take() {
            Some(v) => Err(v),
            None => Ok(()),
        }
    }

    /// Probability of the path just replayed.
    pub(crate) fn path_probability(&self) -> Probability {
        self.prefix_probability()
    }

    /// Indices forced along the current path.
    pub(crate) fn path(&self) -> Vec<usize> {
        self.stack.iter().map(|f| f.current).collect()
    }

    /// Number of `choose` calls made during the current replay.
    pub(crate) fn depth(&self) -> usize {
        self.depth
    }

    pub(crate) fn declared_self_loop(&self) -> bool {
        self.self_loop
    }
}
