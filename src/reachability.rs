//! Reachability checker.
//!
//! Answers the possibility question "can a state satisfying some predicate be
//! reached from the initial state?", ignoring the actual probabilities: only
//! transitions with positive probability count as edges.
//!
//! Two flavors exist:
//! - on a built [`Lmc`], via [`Lmc::is_reachable`] and [`Lmc::find_path`];
//! - on-the-fly on a [`Model`], via [`check_reachability`], which explores
//!   the model depth-first and stops at the first satisfying state without
//!   building a chain.

use std::collections::VecDeque;

use log::{debug, info};

use crate::bitset::BitSet;
use crate::config::Configuration;
use crate::error::Result;
use crate::interceptor::BranchInterceptor;
use crate::lmc::{Lmc, StateIndex};
use crate::model::Model;
use crate::storage::StateStorage;

impl<S> Lmc<S> {
    /// All states reachable from the initial state (including it).
    pub fn reachable_states(&self) -> BitSet {
        let mut visited = BitSet::new(self.num_states());
        let mut stack = vec![self.initial_index()];
        visited.insert(self.initial_index());
        while let Some(state) = stack.pop() {
            for next in self.successors(state) {
                if visited.insert(next) {
                    stack.push(next);
                }
            }
        }
        visited
    }

    /// Whether any state in `targets` is reachable from the initial state.
    pub fn is_reachable(&self, targets: &BitSet) -> bool {
        self.find_path(targets).is_some()
    }

    /// Shortest path (in transitions) from the initial state to some state in
    /// `targets`, as a sequence of state indices starting with the initial one.
    ///
    /// Returns `None` when no target is reachable.
    pub fn find_path(&self, targets: &BitSet) -> Option<Vec<StateIndex>> {
        let n = self.num_states();
        let initial = self.initial_index();
        let mut parent = vec![usize::MAX; n];
        let mut visited = BitSet::new(n);
        let mut queue = VecDeque::from([initial]);
        visited.insert(initial);

        while let Some(state) = queue.pop_front() {
            if targets.contains(state) {
                let mut path = vec![state];
                let mut current = state;
                while current != initial {
                    current = parent[current];
                    path.push(current);
                }
                path.reverse();
                return Some(path);
            }
            for next in self.successors(state) {
                if visited.insert(next) {
                    parent[next] = state;
                    queue.push_back(next);
                }
            }
        }
        None
    }
}

/// Check whether a state satisfying `pred` is reachable in `model`.
///
/// The model is explored depth-first, one state at a time, and exploration
/// stops as soon as a satisfying state is found. The state-count ceiling of
/// `conf` applies exactly as during chain building.
pub fn check_reachability<M, F>(model: &M, pred: F, conf: &Configuration) -> Result<bool>
where
    M: Model,
    F: Fn(&M::State) -> bool,
{
    info!("Checking reachability on the fly");

    let mut visited = StateStorage::new(conf.max_states);
    let mut interceptor = BranchInterceptor::new(model, conf);

    let initial = model.initial_state();
    if pred(&initial) {
        info!("Initial state {:?} satisfies the predicate", initial);
        return Ok(true);
    }
    let (index, _) = visited.put(initial)?;
    let mut stack = vec![index];

    while let Some(index) = stack.pop() {
        let outcomes = interceptor.successors(&visited[index])?;
        for (probability, target) in outcomes {
            if probability.value() <= 0.0 {
                continue;
            }
            if pred(&target) {
                info!("Found satisfying state {:?} after visiting {} states", target, visited.len());
                return Ok(true);
            }
            let (next, is_new) = visited.put(target)?;
            if is_new {
                stack.push(next);
            }
        }
        debug!("{} states visited, {} pending", visited.len(), stack.len());
    }

    info!("No satisfying state among {} reachable states", visited.len());
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    use crate::choice::Choice;
    use crate::error::Error;

    fn chain() -> Lmc<u8> {
        // 0 -> {1, 2}, 1 -> 3, 2 -> 2, 3 -> 3, 4 -> 0 (unreachable), plus a zero edge 2 -> 4.
        Lmc::from_parts(
            vec![0, 1, 2, 3, 4],
            0,
            vec![
                vec![(0.5, 1), (0.5, 2)],
                vec![(1.0, 3)],
                vec![(1.0, 2), (0.0, 4)],
                vec![(1.0, 3)],
                vec![(1.0, 0)],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_reachable_states() {
        let lmc = chain();
        assert_eq!(lmc.reachable_states().iter().collect::<Vec<_>>(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_is_reachable() {
        let lmc = chain();
        assert!(lmc.is_reachable(&lmc.satisfying(|s| *s == 3)));
        assert!(lmc.is_reachable(&lmc.satisfying(|s| *s == 0)));
        assert!(!lmc.is_reachable(&lmc.satisfying(|s| *s == 4)));
        assert!(!lmc.is_reachable(&BitSet::new(5)));
    }

    #[test]
    fn test_find_path() {
        let lmc = chain();
        assert_eq!(lmc.find_path(&lmc.satisfying(|s| *s == 3)), Some(vec![0, 1, 3]));
        assert_eq!(lmc.find_path(&lmc.satisfying(|s| *s == 0)), Some(vec![0]));
        assert_eq!(lmc.find_path(&lmc.satisfying(|s| *s == 4)), None);
    }

    /// Doubles modulo 11, starting from 1, with an optional increment.
    struct Doubling;

    impl Model for Doubling {
        type State = u32;

        fn initial_state(&self) -> u32 {
            1
        }

        fn step(&self, state: &u32, choice: &mut Choice) -> u32 {
            let inc = choice.choose(&[0, 1]);
            (state * 2 + inc) % 11
        }

        fn evaluate(&self, state: &u32) -> bool {
            *state == 0
        }
    }

    #[test]
    fn test_on_the_fly() {
        let conf = Configuration::default();
        assert!(check_reachability(&Doubling, |s| *s == 7, &conf).unwrap());
        assert!(check_reachability(&Doubling, |s| *s == 1, &conf).unwrap());
        assert!(!check_reachability(&Doubling, |s| *s > 20, &conf).unwrap());
    }

    #[test]
    fn test_on_the_fly_ceiling() {
        let conf = Configuration {
            max_states: 3,
            ..Configuration::default()
        };
        let err = check_reachability(&Doubling, |s| *s > 20, &conf).unwrap_err();
        assert!(matches!(err, Error::StateSpaceOverflow { limit: 3, .. }));
    }
}
