//! Fixed-scale decimal money type.
//!
//! Every monetary amount in the system — order totals, payments, cash
//! movements, fiscal document lines — is a [`Money`], never a float.
//! Internally it wraps [`rust_decimal::Decimal`]; storage and wire
//! representation round to 2 fractional digits, half-up, only at the edge
//! (construction/serialization). Intermediate computation (percentage
//! discounts, split-bill division) keeps up to 4 internal digits before the
//! final rounding step, per the design note on money in the specification.

use rust_decimal::Decimal;
use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Sub};

/// Number of fractional digits money is stored/displayed at.
pub const STORAGE_SCALE: u32 = 2;
/// Number of fractional digits intermediate computations are kept at
/// before the final rounding step (percentage discounts, splits).
const INTERNAL_SCALE: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);

    /// Construct from a `Decimal`, rounding half-up to [`STORAGE_SCALE`].
    pub fn new(value: Decimal) -> Self {
        Money(value.round_dp_with_strategy(
            STORAGE_SCALE,
            RoundingStrategy::MidpointAwayFromZero,
        ))
    }

    /// Construct from whole cents (e.g. `850` -> 8.50), avoiding any float
    /// round-trip at call sites that already deal in integer cents.
    pub fn from_cents(cents: i64) -> Self {
        Money(Decimal::new(cents, STORAGE_SCALE))
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// Apply a percentage (0..=100) at [`INTERNAL_SCALE`] precision, then
    /// round the result back down to storage scale.
    pub fn percentage_of(&self, percent: Decimal) -> Money {
        let factor = percent / Decimal::ONE_HUNDRED;
        let raw = (self.0 * factor).round_dp(INTERNAL_SCALE);
        Money::new(raw)
    }

    /// Split into `n` equal shares with any remainder (due to rounding)
    /// distributed to the first shares, so the shares always sum back to
    /// the original amount exactly.
    pub fn split_even(&self, n: u32) -> Vec<Money> {
        assert!(n > 0, "cannot split into zero shares");
        let n_dec = Decimal::from(n);
        let base = Money::new(self.0 / n_dec);
        let mut shares = vec![base; n as usize];
        let distributed: Decimal = base.0 * n_dec;
        let mut remainder = self.0 - distributed;
        let cent = Decimal::new(1, STORAGE_SCALE);
        let mut i = 0usize;
        while remainder >= cent && i < shares.len() {
            shares[i].0 += cent;
            remainder -= cent;
            i += 1;
        }
        shares
    }

    pub fn checked_sub(&self, other: Money) -> Option<Money> {
        Some(Money::new(self.0 - other.0))
    }
}

impl TryFrom<Decimal> for Money {
    type Error = std::convert::Infallible;
    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Ok(Money::new(value))
    }
}

impl From<Money> for Decimal {
    fn from(m: Money) -> Self {
        m.0
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::ZERO
    }
}

impl Add for Money {
    type Output = Money;
    fn add(self, rhs: Money) -> Money {
        Money::new(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Money;
    fn sub(self, rhs: Money) -> Money {
        Money::new(self.0 - rhs.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_half_up_to_two_places() {
        let m = Money::new(Decimal::new(10005, 3)); // 10.005
        assert_eq!(m.to_string(), "10.01");
    }

    #[test]
    fn percentage_discount_is_precise() {
        let total = Money::from_cents(999); // 9.99
        let ten_pct = total.percentage_of(Decimal::TEN);
        assert_eq!(ten_pct.to_string(), "1.00");
    }

    #[test]
    fn split_even_remainder_goes_to_first_shares() {
        let total = Money::from_cents(1000); // 10.00
        let shares = total.split_even(3);
        assert_eq!(shares.iter().copied().sum::<Money>(), total);
        assert_eq!(shares[0].to_string(), "3.34");
        assert_eq!(shares[1].to_string(), "3.33");
        assert_eq!(shares[2].to_string(), "3.33");
    }
}
