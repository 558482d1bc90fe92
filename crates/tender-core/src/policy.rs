//! # Payment Method Policy
//!
//! Per-method limits and fees. Loaded once at process start and handed to
//! every component as a read-only value.
//!
//! ## Default Table
//! ```text
//! ┌──────────────┬──────────┬───────────┬───────────┬──────────────────────┐
//! │ Method       │ Fee %    │ Min       │ Max       │ Verify above         │
//! ├──────────────┼──────────┼───────────┼───────────┼──────────────────────┤
//! │ cash         │ -        │ -         │ -         │ -                    │
//! │ credit_card  │ 2.5      │ -         │ -         │ 5,000                │
//! │ debit_card   │ 1.5      │ -         │ -         │ 5,000                │
//! │ upi          │ -        │ -         │ 1,00,000  │ 10,000               │
//! │ bnpl         │ -        │ 500       │ 50,000    │ 0 (always)           │
//! │ membership   │ -        │ -         │ -         │ -                    │
//! └──────────────┴──────────┴───────────┴───────────┴──────────────────────┘
//! ```
//!
//! Fees are informational: they go on the receipt and are never added to
//! what the client owes.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::allocation::PaymentAllocation;
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::PaymentMethod;

// =============================================================================
// Single Method Policy
// =============================================================================

/// Limits and fees for one payment method. `None` means unrestricted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethodPolicy {
    /// Processing fee charged by the acquirer, in percent (2.5 = 2.5%).
    #[serde(default)]
    #[ts(type = "number | null")]
    pub processing_fee_percent: Option<Decimal>,

    /// Smallest non-zero amount the method accepts.
    #[serde(default)]
    pub min_amount: Option<Money>,

    /// Largest amount the method accepts for one checkout.
    #[serde(default)]
    pub max_amount: Option<Money>,

    /// Amounts strictly above this need extra verification at the till.
    #[serde(default)]
    pub verification_threshold: Option<Money>,
}

impl PaymentMethodPolicy {
    /// A method with no limits and no fee.
    pub const fn unrestricted() -> Self {
        PaymentMethodPolicy {
            processing_fee_percent: None,
            min_amount: None,
            max_amount: None,
            verification_threshold: None,
        }
    }

    /// Clamps an amount into `[0, max_amount]`.
    ///
    /// ## Example
    /// ```rust
    /// use tender_core::policy::PolicyTable;
    /// use tender_core::{Money, PaymentMethod};
    ///
    /// let table = PolicyTable::default();
    /// let upi = table.get(PaymentMethod::Upi);
    /// assert_eq!(upi.cap(Money::from_major(150_000)), Money::from_major(100_000));
    /// assert_eq!(upi.cap(Money::from_cents(-5)), Money::zero());
    /// ```
    pub fn cap(&self, amount: Money) -> Money {
        let amount = amount.non_negative();
        match self.max_amount {
            Some(max) => amount.min(max.non_negative()),
            None => amount,
        }
    }

    /// Room left under the cap given what the method already holds.
    /// `None` when the method is uncapped.
    pub fn headroom(&self, current: Money) -> Option<Money> {
        self.max_amount
            .map(|max| max.saturating_sub_zero(current))
    }

    /// Fee for an amount, exact (unrounded) in major units.
    pub fn processing_fee(&self, amount: Money) -> Decimal {
        match self.processing_fee_percent {
            Some(pct) if amount.is_positive() => amount.to_decimal() * pct / Decimal::ONE_HUNDRED,
            _ => Decimal::ZERO,
        }
    }

    /// True when this amount needs extra verification.
    pub fn requires_verification(&self, amount: Money) -> bool {
        match self.verification_threshold {
            Some(threshold) => amount.is_positive() && amount > threshold,
            None => false,
        }
    }
}

// =============================================================================
// Policy Table
// =============================================================================

/// The full method → policy table.
///
/// Passed by value or `Arc` into each component at construction; nothing in
/// this crate reads it from a global.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub struct PolicyTable {
    #[serde(default)]
    pub cash: PaymentMethodPolicy,
    #[serde(default)]
    pub credit_card: PaymentMethodPolicy,
    #[serde(default)]
    pub debit_card: PaymentMethodPolicy,
    #[serde(default)]
    pub upi: PaymentMethodPolicy,
    #[serde(default)]
    pub bnpl: PaymentMethodPolicy,
    #[serde(default)]
    pub membership: PaymentMethodPolicy,
}

impl Default for PolicyTable {
    /// The standard store policy.
    fn default() -> Self {
        PolicyTable {
            cash: PaymentMethodPolicy::unrestricted(),
            credit_card: PaymentMethodPolicy {
                processing_fee_percent: Some(Decimal::new(25, 1)),
                verification_threshold: Some(Money::from_major(5_000)),
                ..PaymentMethodPolicy::unrestricted()
            },
            debit_card: PaymentMethodPolicy {
                processing_fee_percent: Some(Decimal::new(15, 1)),
                verification_threshold: Some(Money::from_major(5_000)),
                ..PaymentMethodPolicy::unrestricted()
            },
            upi: PaymentMethodPolicy {
                max_amount: Some(Money::from_major(100_000)),
                verification_threshold: Some(Money::from_major(10_000)),
                ..PaymentMethodPolicy::unrestricted()
            },
            bnpl: PaymentMethodPolicy {
                min_amount: Some(Money::from_major(500)),
                max_amount: Some(Money::from_major(50_000)),
                verification_threshold: Some(Money::zero()),
                ..PaymentMethodPolicy::unrestricted()
            },
            membership: PaymentMethodPolicy::unrestricted(),
        }
    }
}

impl PolicyTable {
    /// A table with no limits and no fees anywhere.
    pub fn unrestricted() -> Self {
        PolicyTable {
            cash: PaymentMethodPolicy::unrestricted(),
            credit_card: PaymentMethodPolicy::unrestricted(),
            debit_card: PaymentMethodPolicy::unrestricted(),
            upi: PaymentMethodPolicy::unrestricted(),
            bnpl: PaymentMethodPolicy::unrestricted(),
            membership: PaymentMethodPolicy::unrestricted(),
        }
    }

    /// Policy for one method.
    pub fn get(&self, method: PaymentMethod) -> &PaymentMethodPolicy {
        match method {
            PaymentMethod::Cash => &self.cash,
            PaymentMethod::CreditCard => &self.credit_card,
            PaymentMethod::DebitCard => &self.debit_card,
            PaymentMethod::Upi => &self.upi,
            PaymentMethod::Bnpl => &self.bnpl,
            PaymentMethod::Membership => &self.membership,
        }
    }

    /// Mutable policy for one method; only used while building the table.
    pub fn get_mut(&mut self, method: PaymentMethod) -> &mut PaymentMethodPolicy {
        match method {
            PaymentMethod::Cash => &mut self.cash,
            PaymentMethod::CreditCard => &mut self.credit_card,
            PaymentMethod::DebitCard => &mut self.debit_card,
            PaymentMethod::Upi => &mut self.upi,
            PaymentMethod::Bnpl => &mut self.bnpl,
            PaymentMethod::Membership => &mut self.membership,
        }
    }

    #[inline]
    pub fn max_amount(&self, method: PaymentMethod) -> Option<Money> {
        self.get(method).max_amount
    }

    #[inline]
    pub fn min_amount(&self, method: PaymentMethod) -> Option<Money> {
        self.get(method).min_amount
    }

    /// Processing fee for one payment, exact in major units.
    ///
    /// Only cards are charged; a fee percent configured on any other method
    /// is ignored. Additive: `fee(x) + fee(y) == fee(x + y)`.
    ///
    /// ## Example
    /// ```rust
    /// use rust_decimal::Decimal;
    /// use tender_core::policy::PolicyTable;
    /// use tender_core::{Money, PaymentMethod};
    ///
    /// let policies = PolicyTable::default();
    /// let fee = policies.processing_fee(PaymentMethod::CreditCard, Money::from_major(3000));
    /// assert_eq!(fee, Decimal::new(75, 0));
    /// assert_eq!(policies.processing_fee(PaymentMethod::Cash, Money::from_major(3000)), Decimal::ZERO);
    /// ```
    pub fn processing_fee(&self, method: PaymentMethod, amount: Money) -> Decimal {
        if !method.is_card() {
            return Decimal::ZERO;
        }
        self.get(method).processing_fee(amount)
    }

    /// Sum of processing fees over every method in an allocation.
    pub fn total_processing_fees(&self, allocation: &PaymentAllocation) -> Decimal {
        allocation
            .iter()
            .map(|(method, amount)| self.processing_fee(method, amount))
            .sum()
    }

    /// Advisory check: does this payment need extra verification?
    ///
    /// With the default table: UPI above 10,000, cards above 5,000, any
    /// non-zero BNPL amount. The caller decides what to do with it.
    pub fn requires_verification(&self, method: PaymentMethod, amount: Money) -> bool {
        self.get(method).requires_verification(amount)
    }

    /// Checks the table is internally consistent.
    ///
    /// ## Rules
    /// - No negative limits or thresholds
    /// - `min_amount <= max_amount` when both are set
    /// - Fee percent within 0..=100
    pub fn validate(&self) -> CoreResult<()> {
        for method in PaymentMethod::ALL {
            let policy = self.get(method);
            let invalid = |reason: &str| CoreError::InvalidPolicy {
                method,
                reason: reason.to_string(),
            };

            let limits = [policy.min_amount, policy.max_amount, policy.verification_threshold];
            if limits.iter().flatten().any(Money::is_negative) {
                return Err(invalid("limits must not be negative"));
            }

            if let (Some(min), Some(max)) = (policy.min_amount, policy.max_amount) {
                if min > max {
                    return Err(invalid("min_amount is above max_amount"));
                }
            }

            if let Some(pct) = policy.processing_fee_percent {
                if pct < Decimal::ZERO || pct > Decimal::ONE_HUNDRED {
                    return Err(invalid("processing fee must be between 0 and 100 percent"));
                }
            }
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_default_table_matches_store_policy() {
        let table = PolicyTable::default();
        assert_eq!(table.max_amount(PaymentMethod::Upi), Some(Money::from_major(100_000)));
        assert_eq!(table.min_amount(PaymentMethod::Bnpl), Some(Money::from_major(500)));
        assert_eq!(table.max_amount(PaymentMethod::Bnpl), Some(Money::from_major(50_000)));
        assert_eq!(table.max_amount(PaymentMethod::Cash), None);
        assert!(table.validate().is_ok());
    }

    #[test]
    fn test_card_fees() {
        let table = PolicyTable::default();
        assert_eq!(
            table.processing_fee(PaymentMethod::CreditCard, Money::from_major(3000)),
            Decimal::new(75, 0)
        );
        assert_eq!(
            table.processing_fee(PaymentMethod::DebitCard, Money::from_major(1000)),
            Decimal::new(15, 0)
        );
        assert_eq!(table.processing_fee(PaymentMethod::Upi, Money::from_major(1000)), Decimal::ZERO);
        assert_eq!(
            table.processing_fee(PaymentMethod::CreditCard, Money::from_cents(-100)),
            Decimal::ZERO
        );
    }

    #[test]
    fn test_fee_percent_on_non_card_is_ignored() {
        let mut table = PolicyTable::default();
        table.upi.processing_fee_percent = Some(Decimal::new(2, 0));
        table.cash.processing_fee_percent = Some(Decimal::new(1, 0));
        assert_eq!(table.processing_fee(PaymentMethod::Upi, Money::from_major(1000)), Decimal::ZERO);

        let alloc = PaymentAllocation::new()
            .with(PaymentMethod::Cash, Money::from_major(1000))
            .with(PaymentMethod::Upi, Money::from_major(1000))
            .with(PaymentMethod::CreditCard, Money::from_major(1000));
        assert_eq!(table.total_processing_fees(&alloc), Decimal::new(25, 0));
    }

    #[test]
    fn test_fee_is_exact_for_odd_amounts() {
        // 0.01 at 2.5% = 0.00025, kept exact rather than rounded to zero
        let fee = PolicyTable::default().processing_fee(PaymentMethod::CreditCard, Money::from_cents(1));
        assert_eq!(fee, Decimal::new(25, 5));
    }

    #[test]
    fn test_requires_verification() {
        let table = PolicyTable::default();
        assert!(!table.requires_verification(PaymentMethod::Upi, Money::from_major(10_000)));
        assert!(table.requires_verification(PaymentMethod::Upi, Money::from_major(10_001)));
        assert!(table.requires_verification(PaymentMethod::CreditCard, Money::from_major(5_001)));
        assert!(!table.requires_verification(PaymentMethod::DebitCard, Money::from_major(5_000)));
        assert!(table.requires_verification(PaymentMethod::Bnpl, Money::from_cents(1)));
        assert!(!table.requires_verification(PaymentMethod::Bnpl, Money::zero()));
        assert!(!table.requires_verification(PaymentMethod::Cash, Money::from_major(1_000_000)));
    }

    #[test]
    fn test_cap_and_headroom() {
        let bnpl = *PolicyTable::default().get(PaymentMethod::Bnpl);
        assert_eq!(bnpl.cap(Money::from_major(60_000)), Money::from_major(50_000));
        assert_eq!(bnpl.headroom(Money::from_major(45_000)), Some(Money::from_major(5_000)));
        assert_eq!(bnpl.headroom(Money::from_major(70_000)), Some(Money::zero()));
        assert_eq!(PaymentMethodPolicy::unrestricted().headroom(Money::from_major(1)), None);
    }

    #[test]
    fn test_validate_rejects_inverted_bounds() {
        let mut table = PolicyTable::default();
        table.bnpl.min_amount = Some(Money::from_major(60_000));
        assert!(matches!(
            table.validate(),
            Err(CoreError::InvalidPolicy { method: PaymentMethod::Bnpl, .. })
        ));
    }

    #[test]
    fn test_validate_rejects_bad_fee() {
        let mut table = PolicyTable::default();
        table.get_mut(PaymentMethod::DebitCard).processing_fee_percent = Some(Decimal::new(101, 0));
        assert!(table.validate().is_err());

        let mut table = PolicyTable::default();
        table.upi.max_amount = Some(Money::from_cents(-1));
        assert!(table.validate().is_err());
    }

    #[test]
    fn test_table_round_trips_through_json() {
        let table = PolicyTable::default();
        let json = serde_json::to_string(&table).unwrap();
        let back: PolicyTable = serde_json::from_str(&json).unwrap();
        assert_eq!(back, table);
    }

    proptest! {
        #[test]
        fn prop_card_fees_are_additive(
            x in 0i64..1_000_000_000_000,
            y in 0i64..1_000_000_000_000,
        ) {
            let table = PolicyTable::default();
            for method in [PaymentMethod::CreditCard, PaymentMethod::DebitCard] {
                let a = Money::from_cents(x);
                let b = Money::from_cents(y);
                prop_assert_eq!(
                    table.processing_fee(method, a) + table.processing_fee(method, b),
                    table.processing_fee(method, a + b)
                );
            }
        }
    }
}
