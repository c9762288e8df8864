//! Formulas over chain labels.
//!
//! State formulas ([`Label`][Formula::Label] and the boolean connectives) are
//! evaluated directly to a set of states. Path formulas
//! ([`Finally`][Formula::Finally], [`Until`][Formula::Until] and their bounded
//! versions) are what the [checker][crate::checker] computes probabilities of.
//!
//! # Examples
//!
//! ```
//! use pmc_rs::formula::Formula;
//!
//! let six = Formula::label("six");
//! let safe = !Formula::label("error");
//! let f = Formula::bounded_until(safe, six, 4);
//! assert_eq!(f.to_string(), "(( ! error) U<=4 six)");
//! assert!(!f.is_state_formula());
//! ```

use std::fmt::{Display, Formatter};
use std::ops::{BitAnd, BitOr, Not};

use crate::bitset::BitSet;
use crate::error::{Error, Result};
use crate::lmc::Lmc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Formula {
    /// States carrying the named label.
    Label(String),
    Not(Box<Formula>),
    And(Box<Formula>, Box<Formula>),
    Or(Box<Formula>, Box<Formula>),
    Implies(Box<Formula>, Box<Formula>),
    Equivalent(Box<Formula>, Box<Formula>),
    /// Eventually reach the operand.
    Finally(Box<Formula>),
    /// Reach the operand within the given number of transitions.
    BoundedFinally(Box<Formula>, usize),
    /// Stay in the left operand until the right operand holds.
    Until(Box<Formula>, Box<Formula>),
    BoundedUntil(Box<Formula>, Box<Formula>, usize),
}

impl Formula {
    pub fn label(name: impl Into<String>) -> Self {
        Formula::Label(name.into())
    }

    pub fn implies(self, rhs: Self) -> Self {
        Formula::Implies(Box::new(self), Box::new(rhs))
    }

    pub fn equivalent(self, rhs: Self) -> Self {
        Formula::Equivalent(Box::new(self), Box::new(rhs))
    }

    pub fn finally(f: Self) -> Self {
        Formula::Finally(Box::new(f))
    }

    pub fn bounded_finally(f: Self, bound: usize) -> Self {
        Formula::BoundedFinally(Box::new(f), bound)
    }

    pub fn until(phi: Self, psi: Self) -> Self {
        Formula::Until(Box::new(phi), Box::new(psi))
    }

    pub fn bounded_until(phi: Self, psi: Self, bound: usize) -> Self {
        Formula::BoundedUntil(Box::new(phi), Box::new(psi), bound)
    }

    /// Whether the formula contains no path operator.
    pub fn is_state_formula(&self) -> bool {
        match self {
            Formula::Label(_) => true,
            Formula::Not(f) => f.is_state_formula(),
            Formula::And(a, b) | Formula::Or(a, b) | Formula::Implies(a, b) | Formula::Equivalent(a, b) => {
                a.is_state_formula() && b.is_state_formula()
            }
            Formula::Finally(_) | Formula::BoundedFinally(..) | Formula::Until(..) | Formula::BoundedUntil(..) => false,
        }
    }

    /// View a path formula as `phi U<=bound psi`.
    ///
    /// `Finally` has no `phi` (it is `true U psi`), and unbounded operators
    /// have no bound. Returns `None` for state formulas.
    pub fn as_until(&self) -> Option<(Option<&Formula>, &Formula, Option<usize>)> {
        match self {
            Formula::Finally(f) => Some((None, f, None)),
            Formula::BoundedFinally(f, k) => Some((None, f, Some(*k))),
            Formula::Until(phi, psi) => Some((Some(phi), psi, None)),
            Formula::BoundedUntil(phi, psi, k) => Some((Some(phi), psi, Some(*k))),
            _ => None,
        }
    }

    /// Evaluate a state formula to the set of states of `lmc` satisfying it.
    pub fn satisfying_states<S>(&self, lmc: &Lmc<S>) -> Result<BitSet> {
        Ok(match self {
            Formula::Label(name) => lmc.label(name)?.clone(),
            Formula::Not(f) => f.satisfying_states(lmc)?.complement(),
            Formula::And(a, b) => a.satisfying_states(lmc)?.intersection(&b.satisfying_states(lmc)?),
            Formula::Or(a, b) => a.satisfying_states(lmc)?.union(&b.satisfying_states(lmc)?),
            Formula::Implies(a, b) => a.satisfying_states(lmc)?.complement().union(&b.satisfying_states(lmc)?),
            Formula::Equivalent(a, b) => {
                let a = a.satisfying_states(lmc)?;
                let b = b.satisfying_states(lmc)?;
                let both = a.intersection(&b);
                let neither = a.complement().intersection(&b.complement());
                both.union(&neither)
            }
            _ => return Err(Error::UnsupportedFormula(self.to_string())),
        })
    }
}

impl Display for Formula {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Formula::Label(name) => write!(f, "{}", name),
            Formula::Not(x) => write!(f, "( ! {})", x),
            Formula::And(a, b) => write!(f, "({} && {})", a, b),
            Formula::Or(a, b) => write!(f, "({} || {})", a, b),
            Formula::Implies(a, b) => write!(f, "({} -> {})", a, b),
            Formula::Equivalent(a, b) => write!(f, "({} <-> {})", a, b),
            Formula::Finally(x) => write!(f, "( F {})", x),
            Formula::BoundedFinally(x, k) => write!(f, "( F<={} {})", k, x),
            Formula::Until(a, b) => write!(f, "({} U {})", a, b),
            Formula::BoundedUntil(a, b, k) => write!(f, "({} U<={} {})", a, k, b),
        }
    }
}

impl Not for Formula {
    type Output = Formula;

    fn not(self) -> Self::Output {
        Formula::Not(Box::new(self))
    }
}

impl BitAnd for Formula {
    type Output = Formula;

    fn bitand(self, rhs: Self) -> Self::Output {
        Formula::And(Box::new(self), Box::new(rhs))
    }
}

impl BitOr for Formula {
    type Output = Formula;

    fn bitor(self, rhs: Self) -> Self::Output {
        Formula::Or(Box::new(self), Box::new(rhs))
    }
}
