//! # Payment Validator
//!
//! Judges whether an allocation can be finalized. Pure: same input, same
//! result, no state.
//!
//! ## Rule Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     First Failing Rule Wins                             │
//! │                                                                         │
//! │  1. membership > current balance (if given) ─────► Blocked              │
//! │  2. upi > upi max ───────────────────────────────► Blocked              │
//! │  3. bnpl > 0 and outside [min, max] ─────────────► Blocked              │
//! │  4. any other method over its max ───────────────► Blocked              │
//! │  5. client_to_pay == 0                                                  │
//! │        membership > 0 ───────────────────────────► FullyCoveredByWallet │
//! │        otherwise ────────────────────────────────► Balanced             │
//! │  6. |paid - client_to_pay| <= 0.01 ──────────────► Balanced             │
//! │  7. paid > client_to_pay ────────────────────────► Overpaid             │
//! │  8. paid < client_to_pay ────────────────────────► Underpaid            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Policy violations are results, not errors. Only building a receipt from
//! a blocked allocation is an error (see `receipt.rs`).

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::allocation::PaymentAllocation;
use crate::money::Money;
use crate::policy::PolicyTable;
use crate::types::{MembershipBalance, PaymentMethod};

/// Difference under which paid and owed count as equal.
const BALANCE_TOLERANCE: Money = Money::from_cents(1);

// =============================================================================
// Validation Result
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ValidationCategory {
    Balanced,
    Underpaid,
    Overpaid,
    FullyCoveredByWallet,
    Blocked,
}

impl ValidationCategory {
    /// Categories that allow finalizing the checkout.
    #[inline]
    pub const fn is_valid(&self) -> bool {
        matches!(self, ValidationCategory::Balanced | ValidationCategory::FullyCoveredByWallet)
    }
}

/// Outcome of `PaymentValidator::validate`. Derived, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    /// Text for the tender screen.
    pub message: String,
    pub category: ValidationCategory,
    /// `paid - client_to_pay`: positive is overpaid, negative is still owed.
    pub difference: Money,
    /// Informational fee total for the allocation, exact.
    #[ts(type = "number")]
    pub processing_fees: Decimal,
}

impl ValidationResult {
    fn new(category: ValidationCategory, message: impl Into<String>) -> Self {
        ValidationResult {
            is_valid: category.is_valid(),
            message: message.into(),
            category,
            difference: Money::zero(),
            processing_fees: Decimal::ZERO,
        }
    }

    fn blocked(message: impl Into<String>) -> Self {
        Self::new(ValidationCategory::Blocked, message)
    }

    /// Amount still owed, zero unless underpaid.
    pub fn shortfall(&self) -> Money {
        if self.category == ValidationCategory::Underpaid {
            self.difference.abs()
        } else {
            Money::zero()
        }
    }

    /// Amount paid in excess, zero unless overpaid.
    pub fn excess(&self) -> Money {
        if self.category == ValidationCategory::Overpaid {
            self.difference
        } else {
            Money::zero()
        }
    }
}

// =============================================================================
// Split Payment Review
// =============================================================================

/// List-style review of an allocation against the full order amount.
///
/// Unlike `ValidationResult` this collects every problem rather than the
/// first, and counts the wallet as part of what was paid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SplitPaymentReview {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub total_paid: Money,
    /// `order_total - total_paid`, may be negative.
    pub remaining: Money,
    #[ts(type = "number")]
    pub processing_fees: Decimal,
}

impl SplitPaymentReview {
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

// =============================================================================
// Validator
// =============================================================================

/// Stateless checker bound to a policy table.
#[derive(Debug, Clone)]
pub struct PaymentValidator {
    policies: Arc<PolicyTable>,
}

impl PaymentValidator {
    pub fn new(policies: Arc<PolicyTable>) -> Self {
        PaymentValidator { policies }
    }

    /// Validates an allocation against the payable total.
    ///
    /// A missing membership balance counts as zero, so any wallet amount is
    /// then blocked.
    ///
    /// ## Example
    /// ```rust
    /// use std::sync::Arc;
    /// use tender_core::allocation::PaymentAllocation;
    /// use tender_core::policy::PolicyTable;
    /// use tender_core::validator::{PaymentValidator, ValidationCategory};
    /// use tender_core::{Money, PaymentMethod};
    ///
    /// let validator = PaymentValidator::new(Arc::new(PolicyTable::default()));
    /// let alloc = PaymentAllocation::new()
    ///     .with(PaymentMethod::Cash, Money::from_major(4_000))
    ///     .with(PaymentMethod::CreditCard, Money::from_major(3_000));
    ///
    /// let result = validator.validate(&alloc, Money::from_major(10_000), None);
    /// assert_eq!(result.category, ValidationCategory::Underpaid);
    /// assert_eq!(result.shortfall(), Money::from_major(3_000));
    /// ```
    pub fn validate(
        &self,
        allocation: &PaymentAllocation,
        payable_total: Money,
        membership: Option<&MembershipBalance>,
    ) -> ValidationResult {
        let mut result = self.judge(allocation, payable_total, membership);
        result.processing_fees = self.policies.total_processing_fees(allocation);
        result
    }

    fn judge(
        &self,
        allocation: &PaymentAllocation,
        payable_total: Money,
        membership: Option<&MembershipBalance>,
    ) -> ValidationResult {
        let wallet = allocation.membership();

        // Without a balance record there is nothing to check the wallet against.
        if let Some(balance) = membership {
            if wallet > balance.current_balance {
                return ValidationResult::blocked("Insufficient membership balance");
            }
        }

        if let Some(reason) = self.policy_violation(allocation) {
            return ValidationResult::blocked(reason);
        }

        let client_to_pay = payable_total.saturating_sub_zero(wallet);
        let paid = allocation.non_membership_total();
        let difference = paid - client_to_pay;

        let mut result = if client_to_pay.is_zero() {
            if wallet.is_positive() {
                ValidationResult::new(
                    ValidationCategory::FullyCoveredByWallet,
                    "Fully paid by membership",
                )
            } else {
                ValidationResult::new(ValidationCategory::Balanced, "No payment required")
            }
        } else if difference.abs() <= BALANCE_TOLERANCE {
            ValidationResult::new(ValidationCategory::Balanced, "Payment balanced")
        } else if difference.is_positive() {
            ValidationResult::new(
                ValidationCategory::Overpaid,
                format!("Overpaid by {}", difference),
            )
        } else {
            ValidationResult::new(
                ValidationCategory::Underpaid,
                format!("Client to pay: {}", difference.abs()),
            )
        };

        result.difference = difference;
        result
    }

    /// First per-method limit the allocation breaks, as display text.
    ///
    /// Shared with the receipt builder so both agree on what is blocked.
    pub fn policy_violation(&self, allocation: &PaymentAllocation) -> Option<String> {
        let upi = allocation.get(PaymentMethod::Upi);
        if let Some(max) = self.policies.max_amount(PaymentMethod::Upi) {
            if upi > max {
                return Some("UPI amount exceeds daily limit".to_string());
            }
        }

        let bnpl = allocation.get(PaymentMethod::Bnpl);
        if bnpl.is_positive() {
            if let Some(min) = self.policies.min_amount(PaymentMethod::Bnpl) {
                if bnpl < min {
                    return Some(format!("Pay Later minimum amount is {}", min));
                }
            }
            if let Some(max) = self.policies.max_amount(PaymentMethod::Bnpl) {
                if bnpl > max {
                    return Some(format!(
                        "Pay Later amount ({}) exceeds maximum limit ({})",
                        bnpl, max
                    ));
                }
            }
        }

        allocation
            .positive()
            .filter(|(m, _)| !matches!(m, PaymentMethod::Upi | PaymentMethod::Bnpl))
            .find_map(|(method, amount)| {
                let policy = self.policies.get(method);
                let over = policy.max_amount.is_some_and(|max| amount > max);
                let under = policy.min_amount.is_some_and(|min| amount < min);
                (over || under).then(|| format!("{} amount is outside its limits", method.display_name()))
            })
    }

    /// Advisory: does this payment need extra verification at the till?
    #[inline]
    pub fn requires_verification(&self, method: PaymentMethod, amount: Money) -> bool {
        self.policies.requires_verification(method, amount)
    }

    /// Reviews an allocation against the full order amount, wallet included.
    ///
    /// ## Errors (collected)
    /// - nothing paid
    /// - total paid above the order amount
    /// - UPI over its limit, BNPL under its minimum or over its maximum
    /// - wallet amount above the given balance
    ///
    /// ## Warnings
    /// - payment incomplete
    /// - processing fees apply
    pub fn review(
        &self,
        allocation: &PaymentAllocation,
        order_total: Money,
        membership_balance: Option<Money>,
    ) -> SplitPaymentReview {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        let total_paid = allocation.total();
        let remaining = order_total - total_paid;

        if !total_paid.is_positive() {
            errors.push("At least one payment method must be selected with an amount".to_string());
        }
        if total_paid > order_total {
            errors.push(format!(
                "Total payment ({}) exceeds order amount ({})",
                total_paid, order_total
            ));
        }
        if remaining.is_positive() {
            warnings.push(format!("Payment incomplete. Remaining: {}", remaining));
        }

        for (method, amount) in allocation.positive() {
            let policy = self.policies.get(method);
            match method {
                PaymentMethod::Upi => {
                    if let Some(max) = policy.max_amount.filter(|max| amount > *max) {
                        errors.push(format!(
                            "UPI amount ({}) exceeds transaction limit ({})",
                            amount, max
                        ));
                    }
                }
                PaymentMethod::Bnpl => {
                    if let Some(min) = policy.min_amount.filter(|min| amount < *min) {
                        errors.push(format!("Pay Later minimum amount is {}", min));
                    }
                    if let Some(max) = policy.max_amount.filter(|max| amount > *max) {
                        errors.push(format!(
                            "Pay Later amount ({}) exceeds maximum limit ({})",
                            amount, max
                        ));
                    }
                }
                PaymentMethod::Membership => {
                    if let Some(balance) = membership_balance.filter(|b| amount > *b) {
                        errors.push(format!(
                            "Membership payment ({}) exceeds available balance ({})",
                            amount, balance
                        ));
                    }
                }
                _ => {}
            }
        }

        let processing_fees = self.policies.total_processing_fees(allocation);
        if processing_fees > Decimal::ZERO {
            warnings.push(format!(
                "Processing fees: {}",
                Money::from_decimal(processing_fees)
            ));
        }

        SplitPaymentReview {
            errors,
            warnings,
            total_paid,
            remaining,
            processing_fees,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> PaymentValidator {
        PaymentValidator::new(Arc::new(PolicyTable::default()))
    }

    fn alloc(entries: &[(PaymentMethod, i64)]) -> PaymentAllocation {
        entries
            .iter()
            .fold(PaymentAllocation::new(), |a, (m, v)| a.with(*m, Money::from_major(*v)))
    }

    #[test]
    fn test_underpaid_reports_shortfall_and_fees() {
        let a = alloc(&[(PaymentMethod::Cash, 4_000), (PaymentMethod::CreditCard, 3_000)]);
        let inactive = MembershipBalance::inactive(Money::from_major(500));
        let result = validator().validate(&a, Money::from_major(10_000), Some(&inactive));

        assert_eq!(result.category, ValidationCategory::Underpaid);
        assert!(!result.is_valid);
        assert_eq!(result.shortfall(), Money::from_major(3_000));
        assert_eq!(result.difference, Money::from_major(-3_000));
        assert!(result.message.contains("3000.00"));
        assert_eq!(result.processing_fees, Decimal::new(75, 0));
    }

    #[test]
    fn test_fully_covered_by_wallet() {
        let a = alloc(&[(PaymentMethod::Membership, 4_130)]);
        let balance = MembershipBalance::active(Money::from_major(28_500));
        let result = validator().validate(&a, Money::from_major(4_130), Some(&balance));

        assert_eq!(result.category, ValidationCategory::FullyCoveredByWallet);
        assert!(result.is_valid);
        assert_eq!(result.message, "Fully paid by membership");
    }

    #[test]
    fn test_zero_total_is_balanced() {
        let result = validator().validate(&PaymentAllocation::new(), Money::zero(), None);
        assert_eq!(result.category, ValidationCategory::Balanced);
        assert_eq!(result.message, "No payment required");
    }

    #[test]
    fn test_balanced_within_one_cent() {
        let a = PaymentAllocation::new().with(PaymentMethod::Cash, Money::from_cents(99_999));
        let result = validator().validate(&a, Money::from_major(1_000), None);
        assert_eq!(result.category, ValidationCategory::Balanced);
        assert_eq!(result.message, "Payment balanced");

        let a = PaymentAllocation::new().with(PaymentMethod::Cash, Money::from_cents(99_998));
        let result = validator().validate(&a, Money::from_major(1_000), None);
        assert_eq!(result.category, ValidationCategory::Underpaid);
    }

    #[test]
    fn test_overpaid_states_excess() {
        let a = alloc(&[(PaymentMethod::Cash, 1_200)]);
        let result = validator().validate(&a, Money::from_major(1_000), None);
        assert_eq!(result.category, ValidationCategory::Overpaid);
        assert_eq!(result.excess(), Money::from_major(200));
        assert_eq!(result.message, "Overpaid by ₹200.00");
    }

    #[test]
    fn test_membership_over_balance_is_blocked() {
        let a = alloc(&[(PaymentMethod::Membership, 600)]);
        let balance = MembershipBalance::active(Money::from_major(500));
        let result = validator().validate(&a, Money::from_major(600), Some(&balance));
        assert_eq!(result.category, ValidationCategory::Blocked);
        assert_eq!(result.message, "Insufficient membership balance");

        let result = validator().validate(&a, Money::from_major(600), None);
        assert_eq!(result.category, ValidationCategory::FullyCoveredByWallet);
    }

    #[test]
    fn test_membership_checked_against_current_balance() {
        let a = alloc(&[(PaymentMethod::Membership, 100), (PaymentMethod::Cash, 900)]);

        let inactive = MembershipBalance::inactive(Money::from_major(500));
        let result = validator().validate(&a, Money::from_major(1_000), Some(&inactive));
        assert_eq!(result.category, ValidationCategory::Balanced);

        let result = validator().validate(&a, Money::from_major(1_000), None);
        assert_eq!(result.category, ValidationCategory::Balanced);

        let short = MembershipBalance::active(Money::from_major(99));
        let result = validator().validate(&a, Money::from_major(1_000), Some(&short));
        assert_eq!(result.message, "Insufficient membership balance");
    }

    #[test]
    fn test_deserialized_negative_amount_cannot_balance() {
        let a: PaymentAllocation =
            serde_json::from_str(r#"{"cash":-50000,"upi":150000}"#).unwrap();
        let result = validator().validate(&a, Money::from_major(1_000), None);
        assert_eq!(result.category, ValidationCategory::Overpaid);
        assert_eq!(result.excess(), Money::from_major(500));
    }

    #[test]
    fn test_upi_over_limit_is_blocked() {
        let a = alloc(&[(PaymentMethod::Upi, 150_000)]);
        let result = validator().validate(&a, Money::from_major(150_000), None);
        assert_eq!(result.category, ValidationCategory::Blocked);
        assert_eq!(result.message, "UPI amount exceeds daily limit");
    }

    #[test]
    fn test_upi_capped_is_underpaid() {
        let a = alloc(&[(PaymentMethod::Upi, 100_000)]);
        let result = validator().validate(&a, Money::from_major(150_000), None);
        assert_eq!(result.category, ValidationCategory::Underpaid);
        assert_eq!(result.shortfall(), Money::from_major(50_000));
    }

    #[test]
    fn test_bnpl_bounds() {
        let v = validator();

        let low = alloc(&[(PaymentMethod::Bnpl, 200)]);
        let result = v.validate(&low, Money::from_major(200), None);
        assert_eq!(result.category, ValidationCategory::Blocked);
        assert_eq!(result.message, "Pay Later minimum amount is ₹500.00");

        let high = alloc(&[(PaymentMethod::Bnpl, 60_000)]);
        let result = v.validate(&high, Money::from_major(60_000), None);
        assert_eq!(result.category, ValidationCategory::Blocked);
        assert!(result.message.contains("exceeds maximum limit"));

        let ok = alloc(&[(PaymentMethod::Bnpl, 500)]);
        assert!(v.validate(&ok, Money::from_major(500), None).is_valid);
    }

    #[test]
    fn test_first_failing_rule_wins() {
        let a = alloc(&[
            (PaymentMethod::Membership, 900),
            (PaymentMethod::Upi, 200_000),
        ]);
        let balance = MembershipBalance::active(Money::from_major(100));
        let result = validator().validate(&a, Money::from_major(1_000), Some(&balance));
        assert_eq!(result.message, "Insufficient membership balance");
    }

    #[test]
    fn test_validate_is_pure() {
        let a = alloc(&[(PaymentMethod::Cash, 10)]);
        let v = validator();
        assert_eq!(
            v.validate(&a, Money::from_major(20), None),
            v.validate(&a, Money::from_major(20), None)
        );
    }

    #[test]
    fn test_requires_verification() {
        let v = validator();
        assert!(v.requires_verification(PaymentMethod::Upi, Money::from_major(10_001)));
        assert!(!v.requires_verification(PaymentMethod::Cash, Money::from_major(10_001)));
    }

    #[test]
    fn test_review_collects_every_problem() {
        let a = alloc(&[
            (PaymentMethod::Upi, 120_000),
            (PaymentMethod::Bnpl, 100),
            (PaymentMethod::Membership, 800),
        ]);
        let review = validator().review(&a, Money::from_major(100_000), Some(Money::from_major(500)));

        assert!(!review.is_valid());
        assert_eq!(review.total_paid, Money::from_major(120_900));
        assert_eq!(review.remaining, Money::from_major(-20_900));
        assert!(review.errors.iter().any(|e| e.starts_with("Total payment (₹120900.00)")));
        assert!(review.errors.iter().any(|e| e.contains("exceeds transaction limit")));
        assert!(review.errors.iter().any(|e| e == "Pay Later minimum amount is ₹500.00"));
        assert!(review.errors.iter().any(|e| e.starts_with("Membership payment (₹800.00)")));
        assert!(review.warnings.is_empty());
    }

    #[test]
    fn test_review_warnings() {
        let a = alloc(&[(PaymentMethod::CreditCard, 1_000)]);
        let review = validator().review(&a, Money::from_major(3_000), None);

        assert!(review.is_valid());
        assert_eq!(review.remaining, Money::from_major(2_000));
        assert_eq!(
            review.warnings,
            vec![
                "Payment incomplete. Remaining: ₹2000.00".to_string(),
                "Processing fees: ₹25.00".to_string(),
            ]
        );
    }

    #[test]
    fn test_review_empty_allocation() {
        let review = validator().review(&PaymentAllocation::new(), Money::from_major(10), None);
        assert_eq!(
            review.errors,
            vec!["At least one payment method must be selected with an amount".to_string()]
        );
    }
}
