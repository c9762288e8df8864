//! Branch interceptor: the probabilistic successors of a single state.
//!
//! [`BranchInterceptor::successors`] runs [`Model::step`] once per path of the
//! choice tree rooted at the given state (see [`choice`][crate::choice]) and
//! collects the resulting distribution. Paths that end in the same state are
//! merged into one outcome whose probability is the sum over those paths.

use std::collections::HashMap;

use log::{debug, trace};

use crate::choice::{Choice, Violation};
use crate::config::Configuration;
use crate::error::{Error, Result};
use crate::model::Model;
use crate::probability::Probability;

pub struct BranchInterceptor<'a, M: Model> {
    model: &'a M,
    conf: &'a Configuration,
    choice: Choice,
}

impl<'a, M: Model> BranchInterceptor<'a, M> {
    pub fn new(model: &'a M, conf: &'a Configuration) -> Self {
        Self {
            model,
            conf,
            choice: Choice::new(),
        }
    }

    /// Compute all `(probability, successor)` outcomes of `state`.
    ///
    /// Outcomes are listed in the order their first path was enumerated, and
    /// their probabilities are normalized to sum exactly to one.
    pub fn successors(&mut self, state: &M::State) -> Result<Vec<(Probability, M::State)>> {
        let mut outcomes: Vec<(Probability, M::State)> = Vec::new();
        let mut positions: HashMap<M::State, usize> = HashMap::new();
        let mut paths = 0usize;

        self.choice.begin();
        while self.choice.prepare_next_path() {
            let target = self.model.step(state, &mut self.choice);

            if let Err((path, violation)) = self.choice.finish_path() {
                let state = format!("{:?}", state);
                return Err(match violation {
                    Violation::Nondeterminism(reason) => Error::ModelNondeterminism { state, path, reason },
                    Violation::InvalidWeights(reason) => Error::InvalidChoice { state, path, reason },
                });
            }

            paths += 1;
            if paths > self.conf.max_successors {
                return Err(Error::SuccessorOverflow {
                    limit: self.conf.max_successors,
                    state: format!("{:?}", state),
                });
            }

            if self.conf.strict && self.choice.depth() == 0 && !self.choice.declared_self_loop() && &target == state {
                return Err(Error::UndefinedTransition {
                    state: format!("{:?}", state),
                });
            }

            let probability = self.choice.path_probability();
            trace!("path {:?} -> {:?} with {}", self.choice.path(), target, probability);

            match positions.get(&target) {
                Some(&i) => outcomes[i].0 += probability,
                None => {
                    positions.insert(target.clone(), outcomes.len());
                    outcomes.push((probability, target));
                }
            }
        }

        let total: Probability = outcomes.iter().map(|(p, _)| *p).sum();
        if total != Probability::ONE {
            debug!("normalizing outcomes of {:?}: sum was {:e}", state, total.value());
            for (p, _) in outcomes.iter_mut() {
                *p = Probability::new(p.value() / total.value());
            }
        }

        debug!("{:?}: {} paths, {} successors", state, paths, outcomes.len());
        Ok(outcomes)
    }
}
