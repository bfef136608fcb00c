use std::{
    fmt,
    ops::{Add, AddAssign, Neg, Sub, SubAssign},
};

use crate::{EngineError, ResultEngine};

/// Signed money amount represented as **integer minor units** (cents).
///
/// Use this type for monetary arithmetic in the engine (available amounts,
/// goal targets, balance deltas) to avoid floating-point drift. Persisted
/// columns stay plain `i64`.
///
/// # Examples
///
/// ```rust
/// use engine::MoneyCents;
///
/// let amount = MoneyCents::new(12_34);
/// assert_eq!(amount.cents(), 1234);
/// assert_eq!(amount.to_string(), "12.34");
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct MoneyCents(i64);

impl MoneyCents {
    pub const ZERO: MoneyCents = MoneyCents(0);

    /// Largest amount accepted as input: one trillion major units. Sums of
    /// bounded amounts stay far from `i64` overflow.
    pub const MAX: MoneyCents = MoneyCents(100_000_000_000_000);

    /// Creates a new amount from integer cents.
    #[must_use]
    pub const fn new(cents: i64) -> Self {
        Self(cents)
    }

    /// Creates a strictly positive amount, as required for transaction
    /// magnitudes.
    pub fn positive(cents: i64, label: &str) -> ResultEngine<Self> {
        if cents <= 0 {
            return Err(EngineError::Validation(format!("{label} must be > 0")));
        }
        Self::bounded(cents, label)
    }

    /// Creates a non-negative amount (allocations, targets).
    pub fn non_negative(cents: i64, label: &str) -> ResultEngine<Self> {
        if cents < 0 {
            return Err(EngineError::Validation(format!("{label} must be >= 0")));
        }
        Self::bounded(cents, label)
    }

    fn bounded(cents: i64, label: &str) -> ResultEngine<Self> {
        if cents > Self::MAX.0 {
            return Err(EngineError::Validation(format!(
                "{label} must be at most {}",
                Self::MAX
            )));
        }
        Ok(Self(cents))
    }

    /// Returns the raw value in cents.
    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    /// Clamps negative values to zero.
    #[must_use]
    pub const fn floor_zero(self) -> Self {
        if self.0 < 0 { Self(0) } else { self }
    }

    /// Checked addition (returns `None` on overflow).
    #[must_use]
    pub fn checked_add(self, rhs: MoneyCents) -> Option<MoneyCents> {
        self.0.checked_add(rhs.0).map(MoneyCents)
    }

    /// Checked subtraction (returns `None` on overflow).
    #[must_use]
    pub fn checked_sub(self, rhs: MoneyCents) -> Option<MoneyCents> {
        self.0.checked_sub(rhs.0).map(MoneyCents)
    }

    /// Checked multiplication by an integer factor.
    #[must_use]
    pub fn checked_mul(self, factor: i64) -> Option<MoneyCents> {
        self.0.checked_mul(factor).map(MoneyCents)
    }

    /// Splits a non-negative amount in `parts`, rounding up so that
    /// `parts * result >= self`.
    ///
    /// Returns `None` when `parts <= 0` or the amount is negative.
    #[must_use]
    pub fn ceil_div(self, parts: i64) -> Option<MoneyCents> {
        if parts <= 0 || self.0 < 0 {
            return None;
        }
        Some(MoneyCents(self.0.div_euclid(parts) + i64::from(self.0 % parts != 0)))
    }
}

impl fmt::Display for MoneyCents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let major = abs / 100;
        let minor = abs % 100;
        write!(f, "{sign}{major}.{minor:02}")
    }
}

impl From<i64> for MoneyCents {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<MoneyCents> for i64 {
    fn from(value: MoneyCents) -> Self {
        value.0
    }
}

impl Add for MoneyCents {
    type Output = MoneyCents;

    fn add(self, rhs: MoneyCents) -> Self::Output {
        MoneyCents(self.0 + rhs.0)
    }
}

impl AddAssign for MoneyCents {
    fn add_assign(&mut self, rhs: MoneyCents) {
        self.0 += rhs.0;
    }
}

impl Sub for MoneyCents {
    type Output = MoneyCents;

    fn sub(self, rhs: MoneyCents) -> Self::Output {
        MoneyCents(self.0 - rhs.0)
    }
}

impl SubAssign for MoneyCents {
    fn sub_assign(&mut self, rhs: MoneyCents) {
        self.0 -= rhs.0;
    }
}

impl Neg for MoneyCents {
    type Output = MoneyCents;

    fn neg(self) -> Self::Output {
        MoneyCents(-self.0)
    }
}

impl std::iter::Sum for MoneyCents {
    fn sum<I: Iterator<Item = MoneyCents>>(iter: I) -> Self {
        iter.fold(MoneyCents::ZERO, |acc, value| acc + value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats_minor_units() {
        assert_eq!(MoneyCents::new(0).to_string(), "0.00");
        assert_eq!(MoneyCents::new(1).to_string(), "0.01");
        assert_eq!(MoneyCents::new(1050).to_string(), "10.50");
        assert_eq!(MoneyCents::new(-1050).to_string(), "-10.50");
    }

    #[test]
    fn ceil_div_rounds_up() {
        assert_eq!(MoneyCents::new(1000).ceil_div(3), Some(MoneyCents::new(334)));
        assert_eq!(MoneyCents::new(900).ceil_div(3), Some(MoneyCents::new(300)));
        assert_eq!(MoneyCents::new(0).ceil_div(4), Some(MoneyCents::ZERO));
        assert_eq!(MoneyCents::new(100).ceil_div(0), None);
    }

    #[test]
    fn positive_rejects_zero_and_negative() {
        assert!(MoneyCents::positive(0, "amount").is_err());
        assert!(MoneyCents::positive(-5, "amount").is_err());
        assert_eq!(MoneyCents::positive(5, "amount").unwrap().cents(), 5);
        assert!(MoneyCents::non_negative(0, "allocated").is_ok());
    }

    #[test]
    fn amounts_above_max_are_rejected() {
        assert!(MoneyCents::positive(MoneyCents::MAX.cents(), "amount").is_ok());
        assert!(MoneyCents::positive(MoneyCents::MAX.cents() + 1, "amount").is_err());
        assert!(MoneyCents::non_negative(i64::MAX, "allocated").is_err());
    }

    #[test]
    fn floor_zero_clamps_overspend() {
        assert_eq!(MoneyCents::new(-500).floor_zero(), MoneyCents::ZERO);
        assert_eq!(MoneyCents::new(300).floor_zero(), MoneyCents::new(300));
    }
}
