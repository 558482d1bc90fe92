//! # Cart Pricing
//!
//! Turns priced cart lines and discounts into the single payable total the
//! payment side works against.
//!
//! ## Pricing Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Per line                                                               │
//! │                                                                         │
//! │  price_excl × qty ─────────────────────────► subtotal_excl              │
//! │  discount_incl ÷ (1 + rate) ───────────────► discount_excl              │
//! │  max(0, subtotal_excl − discount_excl) ────► net_excl                   │
//! │  net_excl × rate ──────────────────────────► tax                        │
//! │                                                                         │
//! │  Whole cart                                                             │
//! │                                                                         │
//! │  Σ (net_excl + tax) − global_discount_incl ──► round 2dp ──► total     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All intermediate steps are exact decimals; the only rounding happens on
//! the final figure, half away from zero.
//!
//! ## Example
//! ```rust
//! use tender_core::cart::{compute_total, CartLine};
//! use tender_core::{Money, TaxRate};
//!
//! let gst = TaxRate::from_bps(1800);
//! let lines = vec![
//!     CartLine::new(Money::from_major(2500), 1, Money::from_major(590), gst).unwrap(),
//!     CartLine::new(Money::from_major(1000), 1, Money::from_major(236), gst).unwrap(),
//! ];
//! assert_eq!(compute_total(&lines, Money::zero()), Money::from_major(3304));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::TaxRate;
use crate::validation::{
    validate_cart_size, validate_non_negative, validate_quantity, validate_tax_rate_bps,
};

// =============================================================================
// Cart Line
// =============================================================================

/// One priced line of the cart.
///
/// Fields are private so a line can only exist in a validated state;
/// JSON from the order-entry UI goes through the same checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", try_from = "RawCartLine")]
pub struct CartLine {
    /// Unit price excluding tax.
    price_excl: Money,
    quantity: i64,
    /// Discount for the whole line, expressed tax-inclusive.
    discount_incl: Money,
    tax_rate: TaxRate,
}

/// Unchecked wire form of [`CartLine`].
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCartLine {
    price_excl: Money,
    quantity: i64,
    #[serde(default)]
    discount_incl: Money,
    #[serde(default)]
    tax_rate: TaxRate,
}

impl TryFrom<RawCartLine> for CartLine {
    type Error = ValidationError;

    fn try_from(raw: RawCartLine) -> Result<Self, Self::Error> {
        CartLine::new(raw.price_excl, raw.quantity, raw.discount_incl, raw.tax_rate)
    }
}

impl CartLine {
    /// Creates a validated cart line.
    ///
    /// ## Errors
    /// - negative price or discount
    /// - quantity outside 1..=999
    /// - tax rate above 100%
    pub fn new(
        price_excl: Money,
        quantity: i64,
        discount_incl: Money,
        tax_rate: TaxRate,
    ) -> Result<Self, ValidationError> {
        validate_non_negative("price", price_excl)?;
        validate_quantity(quantity)?;
        validate_non_negative("discount", discount_incl)?;
        validate_tax_rate_bps(tax_rate.bps())?;

        Ok(CartLine {
            price_excl,
            quantity,
            discount_incl,
            tax_rate,
        })
    }

    #[inline]
    pub fn price_excl(&self) -> Money {
        self.price_excl
    }

    #[inline]
    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    #[inline]
    pub fn discount_incl(&self) -> Money {
        self.discount_incl
    }

    #[inline]
    pub fn tax_rate(&self) -> TaxRate {
        self.tax_rate
    }

    fn amounts(&self) -> LineAmounts {
        let subtotal_excl = self.price_excl.to_decimal() * Decimal::from(self.quantity);
        let discount_excl = self.discount_incl.to_decimal() / (Decimal::ONE + self.tax_rate.fraction());
        // A discount can zero a line but never push it negative
        let net_excl = (subtotal_excl - discount_excl).max(Decimal::ZERO);
        let tax = net_excl * self.tax_rate.fraction();

        LineAmounts {
            subtotal_excl,
            discount_excl,
            net_excl,
            tax,
        }
    }
}

/// Exact, unrounded figures for one line.
#[derive(Debug, Clone, Copy, Default)]
struct LineAmounts {
    subtotal_excl: Decimal,
    discount_excl: Decimal,
    net_excl: Decimal,
    tax: Decimal,
}

impl std::ops::Add for LineAmounts {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        LineAmounts {
            subtotal_excl: self.subtotal_excl + other.subtotal_excl,
            discount_excl: self.discount_excl + other.discount_excl,
            net_excl: self.net_excl + other.net_excl,
            tax: self.tax + other.tax,
        }
    }
}

fn sum_lines(lines: &[CartLine]) -> LineAmounts {
    lines
        .iter()
        .map(CartLine::amounts)
        .fold(LineAmounts::default(), |acc, line| acc + line)
}

// =============================================================================
// Total Calculation
// =============================================================================

/// Computes the payable total of a cart.
///
/// Pure and deterministic. The global discount is already tax-inclusive so
/// it is subtracted from the inclusive value directly. A negative global
/// discount is treated as zero, and a discount larger than the cart yields
/// a total of zero rather than a negative bill.
///
/// ## Example
/// ```rust
/// use tender_core::cart::{compute_total, CartLine};
/// use tender_core::{Money, TaxRate};
///
/// let gst = TaxRate::from_bps(1800);
/// let lines = vec![
///     CartLine::new(Money::from_major(2500), 1, Money::zero(), gst).unwrap(),
///     CartLine::new(Money::from_major(1000), 1, Money::zero(), gst).unwrap(),
/// ];
/// // 4130 inclusive, minus 826 global discount
/// assert_eq!(compute_total(&lines, Money::from_major(826)), Money::from_major(3304));
/// assert_eq!(compute_total(&[], Money::zero()), Money::zero());
/// ```
pub fn compute_total(lines: &[CartLine], global_discount_incl: Money) -> Money {
    let sums = sum_lines(lines);
    let inclusive = sums.net_excl + sums.tax;
    Money::from_decimal(inclusive - global_discount_incl.non_negative().to_decimal()).non_negative()
}

// =============================================================================
// Cart
// =============================================================================

/// An ordered set of cart lines plus a cart-wide inclusive discount.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", try_from = "RawCart")]
pub struct Cart {
    lines: Vec<CartLine>,
    global_discount_incl: Money,
}

/// Unchecked wire form of [`Cart`]; lines are already checked one by one.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCart {
    lines: Vec<CartLine>,
    #[serde(default)]
    global_discount_incl: Money,
}

impl TryFrom<RawCart> for Cart {
    type Error = ValidationError;

    fn try_from(raw: RawCart) -> Result<Self, Self::Error> {
        Cart::from_lines(raw.lines, raw.global_discount_incl)
    }
}

impl Cart {
    /// Creates an empty cart.
    pub fn new() -> Self {
        Cart::default()
    }

    /// Creates a cart from already validated lines.
    pub fn from_lines(
        lines: Vec<CartLine>,
        global_discount_incl: Money,
    ) -> Result<Self, ValidationError> {
        validate_cart_size(lines.len())?;
        validate_non_negative("global_discount", global_discount_incl)?;
        Ok(Cart {
            lines,
            global_discount_incl,
        })
    }

    /// Appends a line.
    pub fn add_line(&mut self, line: CartLine) -> Result<(), ValidationError> {
        validate_cart_size(self.lines.len() + 1)?;
        self.lines.push(line);
        Ok(())
    }

    /// Replaces the cart-wide inclusive discount.
    pub fn set_global_discount(&mut self, discount_incl: Money) -> Result<(), ValidationError> {
        validate_non_negative("global_discount", discount_incl)?;
        self.global_discount_incl = discount_incl;
        Ok(())
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn global_discount_incl(&self) -> Money {
        self.global_discount_incl
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The amount the payment side has to allocate.
    pub fn payable_total(&self) -> Money {
        compute_total(&self.lines, self.global_discount_incl)
    }

    /// Rounded breakdown for the receipt and the cart panel.
    pub fn totals(&self) -> CartTotals {
        CartTotals::from(self)
    }
}

/// Cart totals summary for display.
///
/// Each part is rounded on its own, so the parts can disagree with `total`
/// by a paisa. `total` is always the exact [`compute_total`] result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    pub line_count: usize,
    pub total_quantity: i64,
    pub subtotal_excl: Money,
    pub line_discounts_excl: Money,
    pub net_excl: Money,
    pub tax: Money,
    pub gross_incl: Money,
    pub global_discount_incl: Money,
    pub total: Money,
}

impl From<&Cart> for CartTotals {
    fn from(cart: &Cart) -> Self {
        let sums = sum_lines(&cart.lines);
        CartTotals {
            line_count: cart.lines.len(),
            total_quantity: cart.lines.iter().map(CartLine::quantity).sum(),
            subtotal_excl: Money::from_decimal(sums.subtotal_excl),
            line_discounts_excl: Money::from_decimal(sums.discount_excl),
            net_excl: Money::from_decimal(sums.net_excl),
            tax: Money::from_decimal(sums.tax),
            gross_incl: Money::from_decimal(sums.net_excl + sums.tax),
            global_discount_incl: cart.global_discount_incl,
            total: cart.payable_total(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn gst(pct: u32) -> TaxRate {
        TaxRate::from_bps(pct * 100)
    }

    fn line(price: i64, qty: i64, discount: i64, rate_pct: u32) -> CartLine {
        CartLine::new(
            Money::from_major(price),
            qty,
            Money::from_major(discount),
            gst(rate_pct),
        )
        .unwrap()
    }

    #[test]
    fn test_inclusive_line_discounts_are_converted_before_tax() {
        let lines = vec![line(2500, 1, 590, 18), line(1000, 1, 236, 18)];
        assert_eq!(compute_total(&lines, Money::zero()), Money::from_major(3304));
    }

    #[test]
    fn test_global_discount_is_subtracted_inclusive() {
        let lines = vec![line(2500, 1, 0, 18), line(1000, 1, 0, 18)];
        assert_eq!(compute_total(&lines, Money::from_major(826)), Money::from_major(3304));
    }

    #[test]
    fn test_discount_larger_than_line_clamps_to_zero() {
        // 100 + 18% = 118 inclusive; a 500 discount wipes the line, not the cart
        let lines = vec![line(100, 1, 500, 18), line(200, 1, 0, 0)];
        assert_eq!(compute_total(&lines, Money::zero()), Money::from_major(200));
    }

    #[test]
    fn test_global_discount_never_makes_total_negative() {
        let lines = vec![line(100, 1, 0, 0)];
        assert_eq!(compute_total(&lines, Money::from_major(150)), Money::zero());
        assert_eq!(compute_total(&lines, Money::from_cents(-500)), Money::from_major(100));
    }

    #[test]
    fn test_all_zero_cart_is_zero() {
        assert_eq!(compute_total(&[], Money::zero()), Money::zero());
        let lines = vec![line(0, 3, 0, 18)];
        assert_eq!(compute_total(&lines, Money::zero()), Money::zero());
    }

    #[test]
    fn test_quantity_multiplies_before_discount() {
        // 3 × 99.99 = 299.97, 5% tax = 14.9985 → 314.9685 → 314.97
        let lines = vec![CartLine::new(Money::from_cents(9999), 3, Money::zero(), gst(5)).unwrap()];
        assert_eq!(compute_total(&lines, Money::zero()).cents(), 31497);
    }

    #[test]
    fn test_rounding_happens_once_half_away_from_zero() {
        // 0.05 at 10% = 0.055 → 0.06, but two lines are 0.11 (per-line rounding would give 0.12)
        let one = CartLine::new(Money::from_cents(5), 1, Money::zero(), gst(10)).unwrap();
        assert_eq!(compute_total(&[one.clone()], Money::zero()).cents(), 6);
        assert_eq!(compute_total(&[one.clone(), one], Money::zero()).cents(), 11);
    }

    #[test]
    fn test_is_deterministic() {
        let lines = vec![line(2500, 2, 590, 18), line(1000, 1, 236, 12)];
        let first = compute_total(&lines, Money::from_major(10));
        for _ in 0..10 {
            assert_eq!(compute_total(&lines, Money::from_major(10)), first);
        }
    }

    #[test]
    fn test_invalid_lines_are_rejected() {
        assert!(CartLine::new(Money::from_cents(-1), 1, Money::zero(), gst(18)).is_err());
        assert!(CartLine::new(Money::from_major(1), 0, Money::zero(), gst(18)).is_err());
        assert!(CartLine::new(Money::from_major(1), 1, Money::from_cents(-1), gst(18)).is_err());
        assert!(CartLine::new(Money::from_major(1), 1, Money::zero(), TaxRate::from_bps(10_001)).is_err());
    }

    #[test]
    fn test_deserialize_runs_line_validation() {
        let ok: CartLine =
            serde_json::from_str(r#"{"priceExcl":250000,"quantity":1,"discountIncl":59000,"taxRate":1800}"#)
                .unwrap();
        assert_eq!(ok.discount_incl(), Money::from_major(590));

        let bad = serde_json::from_str::<CartLine>(r#"{"priceExcl":100,"quantity":0}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn test_deserialize_cart_rejects_negative_global_discount() {
        let ok: Cart = serde_json::from_str(
            r#"{"lines":[{"priceExcl":1000,"quantity":2,"taxRate":0}]}"#,
        )
        .unwrap();
        assert_eq!(ok.lines().len(), 1);
        assert!(ok.global_discount_incl().is_zero());

        let bad = serde_json::from_str::<Cart>(r#"{"lines":[],"globalDiscountIncl":-100}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn test_cart_totals_breakdown() {
        let cart = Cart::from_lines(
            vec![line(2500, 1, 590, 18), line(1000, 1, 236, 18)],
            Money::zero(),
        )
        .unwrap();

        let totals = cart.totals();
        assert_eq!(totals.line_count, 2);
        assert_eq!(totals.subtotal_excl, Money::from_major(3500));
        assert_eq!(totals.line_discounts_excl, Money::from_major(700));
        assert_eq!(totals.net_excl, Money::from_major(2800));
        assert_eq!(totals.tax, Money::from_major(504));
        assert_eq!(totals.gross_incl, Money::from_major(3304));
        assert_eq!(totals.total, Money::from_major(3304));
    }

    #[test]
    fn test_cart_rejects_negative_global_discount() {
        let mut cart = Cart::new();
        cart.add_line(line(10, 1, 0, 0)).unwrap();
        assert!(cart.set_global_discount(Money::from_cents(-1)).is_err());
        assert!(cart.set_global_discount(Money::from_major(5)).is_ok());
        assert_eq!(cart.payable_total(), Money::from_major(5));
    }

    fn arb_line() -> impl Strategy<Value = CartLine> {
        (0i64..10_000_000, 1i64..=999, 0i64..50_000_000, 0u32..=2_800).prop_map(
            |(price, qty, discount, bps)| {
                CartLine::new(
                    Money::from_cents(price),
                    qty,
                    Money::from_cents(discount),
                    TaxRate::from_bps(bps),
                )
                .unwrap()
            },
        )
    }

    proptest! {
        #[test]
        fn prop_total_is_non_negative_and_stable(
            lines in proptest::collection::vec(arb_line(), 0..20),
            global in 0i64..100_000_000,
        ) {
            let global = Money::from_cents(global);
            let first = compute_total(&lines, global);
            prop_assert!(!first.is_negative());
            prop_assert_eq!(compute_total(&lines, global), first);
            prop_assert!(compute_total(&lines, Money::zero()) >= first);

            let cart = Cart::from_lines(lines, global).unwrap();
            prop_assert_eq!(cart.payable_total(), first);
        }
    }
}
