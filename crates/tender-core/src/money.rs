//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  A split payment has to reconcile to the bill within one paisa.        │
//! │  Summing floats across six payment methods drifts past that.           │
//! │                                                                         │
//! │  OUR SOLUTION: Integer minor units (paise/cents)                        │
//! │    Allocation amounts, totals and limits are all i64 minor units.      │
//! │    Fractional steps (tax, inclusive discounts, fees) use Decimal       │
//! │    and round exactly once, half away from zero.                        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use tender_core::money::Money;
//!
//! let price = Money::from_major(2500);          // ₹2500.00
//! let doubled = price * 2;                      // ₹5000.00
//! let total = price + Money::from_cents(50);    // ₹2500.50
//! assert_eq!(doubled.cents(), 500_000);
//! assert_eq!(total.to_string(), "₹2500.50");
//! ```

use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (paise).
///
/// ## Design Decisions
/// - **i64 (signed)**: `remaining` and validation deltas can be negative;
///   allocation entries themselves are kept non-negative by the engine
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support for JSON serialization
///
/// ## User Workflow Context
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                    Where Money is Used                                  │
/// │                                                                         │
/// │  CartLine.price ──► compute_total ──► payable total                    │
/// │                                            │                            │
/// │                                            ▼                            │
/// │  MembershipBalance ──► AllocationEngine (cash, card, upi, ...)          │
/// │                                            │                            │
/// │                                            ▼                            │
/// │                        PaymentValidator ──► PaymentReceipt             │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from minor units (paise/cents).
    ///
    /// ## Example
    /// ```rust
    /// use tender_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // ₹10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from whole major units.
    ///
    /// Policy limits and scenario amounts are whole rupees, so this is the
    /// usual way to write them.
    #[inline]
    pub const fn from_major(major: i64) -> Self {
        Money(major * 100)
    }

    /// Creates a Money value from major and minor units.
    ///
    /// ## Note
    /// For negative amounts, only the major unit should be negative.
    /// `from_major_minor(-5, 50)` = -5.50, not -4.50
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Converts a value typed by a cashier (in major units) to Money.
    ///
    /// Malformed entry never fails: NaN, infinities and negatives all
    /// become zero, everything else is rounded to the nearest paisa.
    ///
    /// ## Example
    /// ```rust
    /// use tender_core::money::Money;
    ///
    /// assert_eq!(Money::from_user_input(12.34).cents(), 1234);
    /// assert_eq!(Money::from_user_input(f64::NAN), Money::zero());
    /// assert_eq!(Money::from_user_input(-40.0), Money::zero());
    /// ```
    pub fn from_user_input(value: f64) -> Self {
        if !value.is_finite() || value <= 0.0 {
            return Money::zero();
        }
        // `as` saturates at i64::MAX for absurdly large input
        Money((value * 100.0).round() as i64)
    }

    /// Rounds a decimal amount in major units to the nearest minor unit,
    /// half away from zero.
    ///
    /// ## Example
    /// ```rust
    /// use rust_decimal::Decimal;
    /// use tender_core::money::Money;
    ///
    /// let amount = Decimal::new(33045, 3); // 33.045
    /// assert_eq!(Money::from_decimal(amount).cents(), 3305);
    /// ```
    pub fn from_decimal(amount: Decimal) -> Self {
        let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        let saturated = if rounded.is_sign_negative() {
            i64::MIN
        } else {
            i64::MAX
        };
        Money((rounded * Decimal::ONE_HUNDRED).to_i64().unwrap_or(saturated))
    }

    /// Returns the value as an exact decimal in major units.
    #[inline]
    pub fn to_decimal(&self) -> Decimal {
        Decimal::new(self.0, 2)
    }

    /// Returns the value in minor units.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (rupees) portion.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn minor_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.saturating_abs())
    }

    /// Clamps negative values to zero.
    #[inline]
    pub const fn non_negative(&self) -> Self {
        if self.0 < 0 {
            Money(0)
        } else {
            *self
        }
    }

    /// Subtracts, flooring the result at zero.
    ///
    /// ## Example
    /// ```rust
    /// use tender_core::money::Money;
    ///
    /// let due = Money::from_major(100).saturating_sub_zero(Money::from_major(250));
    /// assert!(due.is_zero());
    /// ```
    #[inline]
    pub const fn saturating_sub_zero(&self, other: Money) -> Self {
        let diff = self.0.saturating_sub(other.0);
        if diff < 0 {
            Money(0)
        } else {
            Money(diff)
        }
    }

    /// Returns `percent`% of this amount, rounded half up to the paisa.
    ///
    /// ## Example
    /// ```rust
    /// use tender_core::money::Money;
    ///
    /// let bill = Money::from_cents(1001);
    /// assert_eq!(bill.percentage(50).cents(), 501);
    /// ```
    pub fn percentage(&self, percent: u32) -> Money {
        // i128 prevents overflow on large amounts
        let part = (self.0 as i128 * percent as i128 + 50) / 100;
        Money(part as i64)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display shows money with the rupee sign and two decimals.
///
/// ## Note
/// Used in validation messages. The UI may re-format for localisation.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}₹{}.{:02}", sign, self.major().abs(), self.minor_part())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

// Operators saturate at the i64 bounds instead of overflowing.
impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_sub(other.0);
    }
}

/// Multiplication by i64 (for quantity calculations).
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arithmetic_saturates_at_bounds() {
        let max = Money::from_cents(i64::MAX);
        assert_eq!(max + Money::from_cents(1), max);
        assert_eq!(Money::from_cents(i64::MIN) - Money::from_cents(1), Money::from_cents(i64::MIN));
        assert_eq!(Money::from_cents(i64::MIN).abs(), max);

        let total: Money = [max, max, Money::from_cents(5)].into_iter().sum();
        assert_eq!(total, max);

        let mut acc = max;
        acc += max;
        assert_eq!(acc, max);
    }

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(money.major(), 10);
        assert_eq!(money.minor_part(), 99);
    }

    #[test]
    fn test_from_major_minor() {
        assert_eq!(Money::from_major_minor(10, 99).cents(), 1099);
        assert_eq!(Money::from_major_minor(-5, 50).cents(), -550);
        assert_eq!(Money::from_major(3304).cents(), 330_400);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1099)), "₹10.99");
        assert_eq!(format!("{}", Money::from_major(3000)), "₹3000.00");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-₹5.50");
        assert_eq!(format!("{}", Money::zero()), "₹0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((a * 3).cents(), 3000);

        let total: Money = [a, b, b].iter().sum();
        assert_eq!(total.cents(), 2000);
    }

    #[test]
    fn test_user_input_is_clamped() {
        assert_eq!(Money::from_user_input(4000.0), Money::from_major(4000));
        assert_eq!(Money::from_user_input(0.25).cents(), 25);
        assert!(Money::from_user_input(f64::NAN).is_zero());
        assert!(Money::from_user_input(f64::INFINITY).is_zero());
        assert!(Money::from_user_input(-0.01).is_zero());
    }

    #[test]
    fn test_decimal_round_trip_rounds_half_away_from_zero() {
        assert_eq!(Money::from_decimal(Decimal::new(1005, 3)).cents(), 101); // 1.005
        assert_eq!(Money::from_decimal(Decimal::new(-1005, 3)).cents(), -101);
        assert_eq!(Money::from_decimal(Decimal::new(1004, 3)).cents(), 100);
        assert_eq!(Money::from_cents(330_400).to_decimal(), Decimal::new(3304, 0));
    }

    #[test]
    fn test_saturating_sub_zero() {
        let total = Money::from_major(4130);
        assert!(total.saturating_sub_zero(Money::from_major(28_500)).is_zero());
        assert_eq!(
            Money::from_major(10_000).saturating_sub_zero(Money::from_major(2_500)),
            Money::from_major(7_500)
        );
    }

    #[test]
    fn test_percentage() {
        assert_eq!(Money::from_major(10_000).percentage(25), Money::from_major(2_500));
        assert_eq!(Money::from_cents(3).percentage(50).cents(), 2);
        assert!(Money::from_major(10).percentage(0).is_zero());
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());

        let negative = Money::from_cents(-100);
        assert!(negative.is_negative());
        assert_eq!(negative.non_negative(), Money::zero());
        assert_eq!(negative.abs().cents(), 100);
    }
}
