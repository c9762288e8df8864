//! Bounded probability calculator.
//!
//! Computes `P(phi U<=k psi)` on a chain: the probability that a random walk
//! from the initial state reaches a `psi`-state within `k` transitions, passing
//! only through `phi`-states before that. Reaching a `psi`-state absorbs the
//! walk, so later visits are not counted again. Plain bounded reachability
//! ("finally") is the special case `phi = true`.
//!
//! Let `x_r[s]` be the probability from `s` with `r` steps remaining:
//!
//! - `x_r[s] = 1` if `s` satisfies `psi`,
//! - `x_r[s] = 0` if `s` satisfies neither `phi` nor `psi`, or if `r = 0`,
//! - `x_r[s] = sum(p * x_{r-1}[t])` over the transitions `s -p-> t` otherwise.
//!
//! Layers are computed bottom-up from `r = 0`, each one only reading the
//! previous one, so two vectors suffice and cycles need no special care.
//! The unbounded variant iterates the same recurrence until successive layers
//! differ by less than `epsilon`.

use log::{debug, info};

use crate::bitset::BitSet;
use crate::config::Configuration;
use crate::error::{Error, Result};
use crate::formula::Formula;
use crate::lmc::Lmc;
use crate::probability::Probability;

pub struct ModelChecker<'a, S> {
    lmc: &'a Lmc<S>,
    conf: Configuration,
}

impl<'a, S> ModelChecker<'a, S> {
    pub fn new(lmc: &'a Lmc<S>) -> Self {
        Self::with_config(lmc, Configuration::default())
    }

    pub fn with_config(lmc: &'a Lmc<S>, conf: Configuration) -> Self {
        Self { lmc, conf }
    }

    /// Probability of reaching `targets` within `bound` transitions.
    pub fn bounded_probability(&self, targets: &BitSet, bound: usize) -> Result<Probability> {
        self.bounded_until(None, targets, bound)
    }

    /// Probability of `phi U<=bound psi`; `phi = None` means `true`.
    pub fn bounded_until(&self, phi: Option<&BitSet>, psi: &BitSet, bound: usize) -> Result<Probability> {
        self.lmc.validate(self.conf.tolerance)?;
        info!("Computing bounded until with bound {}", bound);

        let mut current = self.initial_layer(psi);
        let mut next = vec![0.0; current.len()];
        for r in 1..=bound {
            self.step_layer(phi, psi, &current, &mut next);
            std::mem::swap(&mut current, &mut next);
            debug!("layer {}: {} at initial state", r, current[self.lmc.initial_index()]);
            if current == next {
                debug!("layer {} is a fixed point, skipping the remaining {} layers", r, bound - r);
                break;
            }
        }

        let result = Probability::new(current[self.lmc.initial_index()].min(1.0));
        info!("Probability within {} steps: {}", bound, result);
        Ok(result)
    }

    /// Probability of eventually reaching `targets`.
    pub fn unbounded_finally(&self, targets: &BitSet) -> Result<Probability> {
        self.unbounded_until(None, targets)
    }

    /// Probability of `phi U psi`, by value iteration.
    ///
    /// Fails with [`Error::NoConvergence`] if successive iterations still
    /// differ by at least `epsilon` after `max_iterations` sweeps.
    pub fn unbounded_until(&self, phi: Option<&BitSet>, psi: &BitSet) -> Result<Probability> {
        self.lmc.validate(self.conf.tolerance)?;
        info!("Computing unbounded until (epsilon {:e})", self.conf.epsilon);

        let mut current = self.initial_layer(psi);
        let mut next = vec![0.0; current.len()];
        let mut residual = f64::INFINITY;
        for iteration in 1..=self.conf.max_iterations {
            self.step_layer(phi, psi, &current, &mut next);
            residual = current.iter().zip(&next).map(|(a, b)| (a - b).abs()).fold(0.0, f64::max);
            std::mem::swap(&mut current, &mut next);
            if residual < self.conf.epsilon {
                let result = Probability::new(current[self.lmc.initial_index()].min(1.0));
                info!("Converged after {} iterations: {}", iteration, result);
                return Ok(result);
            }
        }
        Err(Error::NoConvergence {
            iterations: self.conf.max_iterations,
            residual,
        })
    }

    /// Probability of a path formula, with state subformulas resolved via labels.
    pub fn calculate_probability(&self, formula: &Formula) -> Result<Probability> {
        let (phi, psi, bound) = formula
            .as_until()
            .ok_or_else(|| Error::UnsupportedFormula(formula.to_string()))?;
        info!("Checking {}", formula);

        let phi = phi.map(|f| f.satisfying_states(self.lmc)).transpose()?;
        let psi = psi.satisfying_states(self.lmc)?;
        match bound {
            Some(k) => self.bounded_until(phi.as_ref(), &psi, k),
            None => self.unbounded_until(phi.as_ref(), &psi),
        }
    }

    fn initial_layer(&self, psi: &BitSet) -> Vec<f64> {
        (0..self.lmc.num_states())
            .map(|s| if psi.contains(s) { 1.0 } else { 0.0 })
            .collect()
    }

    fn step_layer(&self, phi: Option<&BitSet>, psi: &BitSet, current: &[f64], next: &mut [f64]) {
        for (s, value) in next.iter_mut().enumerate() {
            *value = if psi.contains(s) {
                1.0
            } else if phi.is_some_and(|phi| !phi.contains(s)) {
                0.0
            } else {
                self.lmc
                    .transitions(s)
                    .iter()
                    .map(|t| t.probability.value() * current[t.target])
                    .sum()
            };
        }
    }
}
