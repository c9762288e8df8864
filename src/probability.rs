use std::fmt::{Display, Formatter};
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul};

/// Probability of a transition, a path, or a formula.
///
/// A thin wrapper around `f64`. Arithmetic is plain floating-point; the
/// tolerance-aware predicates ([`is_one`][Probability::is_one],
/// [`is_around`][Probability::is_around]) are what callers should use to
/// compare results.
#[derive(Debug, Copy, Clone, Default, PartialEq, PartialOrd)]
pub struct Probability(f64);

impl Probability {
    pub const ZERO: Self = Self(0.0);
    pub const ONE: Self = Self(1.0);

    pub const fn new(value: f64) -> Self {
        Self(value)
    }

    /// Return the underlying floating-point value.
    pub const fn value(self) -> f64 {
        self.0
    }

    pub fn complement(self) -> Self {
        Self(1.0 - self.0)
    }

    /// Whether this is a usable transition probability, i.e. in `(0, 1]`.
    pub fn is_valid(self) -> bool {
        self.0 > 0.0 && self.0 <= 1.0
    }

    /// Whether the value lies in the closed unit interval.
    pub fn is_in_unit_interval(self) -> bool {
        (0.0..=1.0).contains(&self.0)
    }

    pub fn is_one(self, tolerance: f64) -> bool {
        self.is_around(1.0, tolerance)
    }

    pub fn is_around(self, desired: f64, tolerance: f64) -> bool {
        self.0 >= desired - tolerance && self.0 <= desired + tolerance
    }
}

impl From<f64> for Probability {
    fn from(value: f64) -> Self {
        Self(value)
    }
}

impl Add for Probability {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Probability {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Mul for Probability {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Self(self.0 * rhs.0)
    }
}

impl Sum for Probability {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, p| acc + p)
    }
}

impl Display for Probability {
    /// Values of at least `0.1` print with two decimals. Smaller values are
    /// scaled by powers of ten (up to `10^-10`) so that tiny probabilities stay
    /// readable, e.g. `1.25×10^-3`.
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let value = self.0;
        if value * 10.0 >= 1.0 {
            return write!(f, "{:.2}", value);
        }
        if value == 0.0 {
            return write!(f, "0");
        }
        let mut scaled = value;
        for i in 0..10 {
            if scaled >= 1.0 {
                return write!(f, "{:.2}×10^-{}", scaled, i);
            }
            scaled *= 10.0;
        }
        write!(f, "{:E}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validity() {
        assert!(Probability::ONE.is_valid());
        assert!(Probability::new(0.25).is_valid());
        assert!(!Probability::ZERO.is_valid());
        assert!(!Probability::new(1.5).is_valid());
        assert!(!Probability::new(f64::NAN).is_valid());

        assert!(Probability::ZERO.is_in_unit_interval());
        assert!(!Probability::new(-0.1).is_in_unit_interval());
    }

    #[test]
    fn test_tolerance() {
        let p = Probability::new(0.1) + Probability::new(0.2) + Probability::new(0.7);
        assert!(p.is_one(1e-9));
        assert!(!Probability::new(0.99).is_one(1e-9));
        assert!(Probability::new(1.0 / 6.0).is_around(0.1666, 1e-3));
    }

    #[test]
    fn test_sum_and_product() {
        let total: Probability = [0.5, 0.25, 0.25].into_iter().map(Probability::new).sum();
        assert_eq!(total, Probability::ONE);
        assert_eq!(Probability::new(0.5) * Probability::new(0.5), Probability::new(0.25));
        assert_eq!(Probability::new(0.25).complement(), Probability::new(0.75));
    }

    #[test]
    fn test_display() {
        assert_eq!(Probability::new(0.5).to_string(), "0.50");
        assert_eq!(Probability::ONE.to_string(), "1.00");
        assert_eq!(Probability::new(0.0125).to_string(), "1.25×10^-2");
        assert_eq!(Probability::ZERO.to_string(), "0");
    }
}
