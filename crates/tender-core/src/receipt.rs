//! # Payment Receipt
//!
//! Freezes an allocation into an immutable receipt.
//!
//! ## Build Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       ReceiptBuilder::build()                           │
//! │                                                                         │
//! │  order_id ──► validate_order_id() ──► Err(Validation) if malformed      │
//! │                                                                         │
//! │  allocation ──► policy_violation() ──► Err(AllocationBlocked)           │
//! │             ──► no positive amount ──► Err(EmptyAllocation)             │
//! │                                                                         │
//! │  for each method with amount > 0 (canonical order):                     │
//! │      PaymentDetail {                                                    │
//! │          id:             "{order}_{method}_{millis}"                    │
//! │          transaction_id: "{PREFIX}{millis}{6 random}"                   │
//! │          processing_fee: amount × fee% / 100 (exact)                    │
//! │          status:         completed                                      │
//! │      }                                                                  │
//! │                                                                         │
//! │  total_amount    = Σ amounts                                            │
//! │  processing_fees = Σ fees   (informational, not owed by the client)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Persisting the receipt is the caller's job; `to_json()` and
//! `to_split_record()` give it the shapes it stores.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use ts_rs::TS;
use uuid::Uuid;

use crate::allocation::PaymentAllocation;
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::policy::PolicyTable;
use crate::types::{PaymentMethod, PaymentStatus};
use crate::validation::validate_order_id;
use crate::validator::PaymentValidator;

/// Length of the random suffix on transaction ids.
const TRANSACTION_SUFFIX_LEN: usize = 6;

// =============================================================================
// Payment Detail
// =============================================================================

/// One settled payment line. Only the receipt builder creates these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PaymentDetail {
    pub id: String,
    pub amount: Money,
    #[serde(rename = "payment_method")]
    pub method: PaymentMethod,
    pub transaction_id: String,
    #[ts(type = "number")]
    pub processing_fee: Decimal,
    pub status: PaymentStatus,
    #[ts(as = "String")]
    pub payment_date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_note: Option<String>,
}

// =============================================================================
// Payment Receipt
// =============================================================================

/// Immutable record of how an order was paid.
///
/// Fields are private; there is no way to change a receipt once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PaymentReceipt {
    order_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    customer_name: Option<String>,
    total_amount: Money,
    payments: Vec<PaymentDetail>,
    #[ts(type = "number")]
    processing_fees: Decimal,
    #[ts(as = "String")]
    timestamp: DateTime<Utc>,
}

impl PaymentReceipt {
    pub fn order_id(&self) -> &str {
        &self.order_id
    }

    pub fn customer_name(&self) -> Option<&str> {
        self.customer_name.as_deref()
    }

    /// Sum of every payment line, wallet included.
    pub fn total_amount(&self) -> Money {
        self.total_amount
    }

    /// Payment lines in canonical method order.
    pub fn payments(&self) -> &[PaymentDetail] {
        &self.payments
    }

    /// Exact fee total. Round with `Money::from_decimal` for display.
    pub fn processing_fees(&self) -> Decimal {
        self.processing_fees
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// True when more than one method was used.
    pub fn is_split(&self) -> bool {
        self.payments.len() > 1
    }

    /// Serializes the receipt for the persistence collaborator.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// The storage shape for a split payment.
    pub fn to_split_record(&self) -> SplitPaymentRecord {
        SplitPaymentRecord {
            payment_method: "split".to_string(),
            split_payments: self.payments.clone(),
            is_split_payment: true,
        }
    }
}

/// How an order paid across several methods is written to storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SplitPaymentRecord {
    /// Always `"split"`.
    pub payment_method: String,
    pub split_payments: Vec<PaymentDetail>,
    pub is_split_payment: bool,
}

// =============================================================================
// Receipt Builder
// =============================================================================

/// Builds receipts from allocations, bound to a policy table.
#[derive(Debug, Clone)]
pub struct ReceiptBuilder {
    policies: Arc<PolicyTable>,
    validator: PaymentValidator,
}

impl ReceiptBuilder {
    pub fn new(policies: Arc<PolicyTable>) -> Self {
        let validator = PaymentValidator::new(policies.clone());
        ReceiptBuilder {
            policies,
            validator,
        }
    }

    /// Builds a receipt stamped with the current time.
    ///
    /// ## Errors
    /// - `Validation` if the order id is malformed
    /// - `AllocationBlocked` if the allocation breaks a method limit
    /// - `EmptyAllocation` if no method holds a positive amount
    pub fn build(
        &self,
        order_id: &str,
        allocation: &PaymentAllocation,
        customer_name: Option<&str>,
    ) -> CoreResult<PaymentReceipt> {
        self.build_at(order_id, allocation, customer_name, Utc::now())
    }

    /// Builds a receipt stamped with `now`.
    ///
    /// ## Example
    /// ```rust
    /// use std::sync::Arc;
    /// use chrono::Utc;
    /// use tender_core::allocation::PaymentAllocation;
    /// use tender_core::policy::PolicyTable;
    /// use tender_core::receipt::ReceiptBuilder;
    /// use tender_core::{Money, PaymentMethod};
    ///
    /// let builder = ReceiptBuilder::new(Arc::new(PolicyTable::default()));
    /// let alloc = PaymentAllocation::new()
    ///     .with(PaymentMethod::Cash, Money::from_major(700))
    ///     .with(PaymentMethod::CreditCard, Money::from_major(300));
    ///
    /// let receipt = builder.build_at("ORD-1", &alloc, Some("Asha"), Utc::now()).unwrap();
    /// assert_eq!(receipt.total_amount(), Money::from_major(1_000));
    /// assert_eq!(receipt.payments().len(), 2);
    /// assert!(receipt.payments()[1].transaction_id.starts_with("CC"));
    /// ```
    pub fn build_at(
        &self,
        order_id: &str,
        allocation: &PaymentAllocation,
        customer_name: Option<&str>,
        now: DateTime<Utc>,
    ) -> CoreResult<PaymentReceipt> {
        let order_id = order_id.trim();
        validate_order_id(order_id)?;

        if let Some(reason) = self.validator.policy_violation(allocation) {
            return Err(CoreError::AllocationBlocked { reason });
        }

        if allocation.is_empty() {
            return Err(CoreError::EmptyAllocation {
                order_id: order_id.to_string(),
            });
        }

        let customer_name = customer_name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string);
        let payment_note = customer_name
            .as_ref()
            .map(|name| format!("Payment by {}", name));
        let millis = now.timestamp_millis();

        let payments: Vec<PaymentDetail> = allocation
            .positive()
            .map(|(method, amount)| PaymentDetail {
                id: format!("{}_{}_{}", order_id, method.key(), millis),
                amount,
                method,
                transaction_id: transaction_id(method, millis),
                processing_fee: self.policies.processing_fee(method, amount),
                status: PaymentStatus::Completed,
                payment_date: now,
                payment_note: payment_note.clone(),
            })
            .collect();

        let total_amount: Money = payments.iter().map(|p| p.amount).sum();
        let processing_fees: Decimal = payments.iter().map(|p| p.processing_fee).sum();

        for payment in &payments {
            debug!(
                method = %payment.method,
                amount = %payment.amount,
                transaction_id = %payment.transaction_id,
                "Payment line recorded"
            );
        }
        info!(
            order_id = %order_id,
            total = %total_amount,
            lines = payments.len(),
            "Receipt built"
        );

        Ok(PaymentReceipt {
            order_id: order_id.to_string(),
            customer_name,
            total_amount,
            payments,
            processing_fees,
            timestamp: now,
        })
    }
}

/// `{PREFIX}{millis}{6 uppercase alphanumerics}`, e.g. `UPI1718000000000A1B2C3`.
fn transaction_id(method: PaymentMethod, millis: i64) -> String {
    let random = Uuid::new_v4().simple().to_string();
    let suffix: String = random
        .chars()
        .take(TRANSACTION_SUFFIX_LEN)
        .collect::<String>()
        .to_uppercase();
    format!("{}{}{}", method.transaction_prefix(), millis, suffix)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn builder() -> ReceiptBuilder {
        ReceiptBuilder::new(Arc::new(PolicyTable::default()))
    }

    #[test]
    fn test_stored_failed_detail_deserializes() {
        let json = r#"{
            "id": "pay-1",
            "amount": 150000,
            "payment_method": "credit_card",
            "transaction_id": "CC1700000000000ABC123",
            "processing_fee": 37.5,
            "status": "failed",
            "payment_date": "2024-01-15T10:30:00Z"
        }"#;
        let detail: PaymentDetail = serde_json::from_str(json).unwrap();
        assert_eq!(detail.status, PaymentStatus::Failed);
        assert_eq!(detail.method, PaymentMethod::CreditCard);
        assert!(detail.payment_note.is_none());
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 10, 30, 0).unwrap()
    }

    #[test]
    fn test_build_lines_in_canonical_order() {
        let alloc = PaymentAllocation::new()
            .with(PaymentMethod::Upi, Money::from_major(2_000))
            .with(PaymentMethod::Cash, Money::from_major(1_000))
            .with(PaymentMethod::Membership, Money::from_major(500));

        let receipt = builder().build_at("ORD-7", &alloc, None, fixed_now()).unwrap();
        let methods: Vec<PaymentMethod> = receipt.payments().iter().map(|p| p.method).collect();

        assert_eq!(
            methods,
            vec![PaymentMethod::Cash, PaymentMethod::Upi, PaymentMethod::Membership]
        );
        assert_eq!(receipt.total_amount(), Money::from_major(3_500));
        assert!(receipt.is_split());
        assert!(receipt
            .payments()
            .iter()
            .all(|p| p.status == PaymentStatus::Completed));
    }

    #[test]
    fn test_fees_only_on_cards() {
        let alloc = PaymentAllocation::new()
            .with(PaymentMethod::CreditCard, Money::from_major(3_000))
            .with(PaymentMethod::DebitCard, Money::from_major(1_000))
            .with(PaymentMethod::Cash, Money::from_major(6_000));

        let receipt = builder().build_at("ORD-8", &alloc, None, fixed_now()).unwrap();
        assert_eq!(receipt.processing_fees(), Decimal::new(90, 0));
        assert_eq!(receipt.total_amount(), Money::from_major(10_000));

        let cash = &receipt.payments()[0];
        assert_eq!(cash.method, PaymentMethod::Cash);
        assert_eq!(cash.processing_fee, Decimal::ZERO);
    }

    #[test]
    fn test_ids_and_transaction_ids() {
        let alloc = PaymentAllocation::new().with(PaymentMethod::Bnpl, Money::from_major(600));
        let now = fixed_now();
        let receipt = builder().build_at("ORD-9", &alloc, None, now).unwrap();
        let line = &receipt.payments()[0];

        let millis = now.timestamp_millis().to_string();
        assert_eq!(line.id, format!("ORD-9_bnpl_{}", millis));
        assert!(line.transaction_id.starts_with(&format!("BNPL{}", millis)));

        let suffix = &line.transaction_id[4 + millis.len()..];
        assert_eq!(suffix.len(), 6);
        assert!(suffix
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    }

    #[test]
    fn test_customer_name_sets_note() {
        let alloc = PaymentAllocation::new().with(PaymentMethod::Cash, Money::from_major(10));
        let receipt = builder()
            .build_at("ORD-1", &alloc, Some("  Asha Rao "), fixed_now())
            .unwrap();
        assert_eq!(receipt.customer_name(), Some("Asha Rao"));
        assert_eq!(
            receipt.payments()[0].payment_note.as_deref(),
            Some("Payment by Asha Rao")
        );

        let receipt = builder().build_at("ORD-1", &alloc, Some(""), fixed_now()).unwrap();
        assert_eq!(receipt.customer_name(), None);
        assert_eq!(receipt.payments()[0].payment_note, None);
    }

    #[test]
    fn test_blocked_allocation_is_an_error() {
        let alloc = PaymentAllocation::new().with(PaymentMethod::Upi, Money::from_major(150_000));
        let err = builder().build("ORD-1", &alloc, None).unwrap_err();
        assert!(matches!(err, CoreError::AllocationBlocked { .. }));

        let alloc = PaymentAllocation::new().with(PaymentMethod::Bnpl, Money::from_major(100));
        assert!(builder().build("ORD-1", &alloc, None).is_err());
    }

    #[test]
    fn test_empty_allocation_is_an_error() {
        let err = builder()
            .build("ORD-1", &PaymentAllocation::new(), None)
            .unwrap_err();
        assert!(matches!(err, CoreError::EmptyAllocation { .. }));
    }

    #[test]
    fn test_bad_order_id_is_an_error() {
        let alloc = PaymentAllocation::new().with(PaymentMethod::Cash, Money::from_major(10));
        let err = builder().build("bad id", &alloc, None).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn test_split_record_and_json() {
        let alloc = PaymentAllocation::new()
            .with(PaymentMethod::Cash, Money::from_major(10))
            .with(PaymentMethod::Upi, Money::from_major(20));
        let receipt = builder().build_at("ORD-2", &alloc, None, fixed_now()).unwrap();

        let record = receipt.to_split_record();
        assert_eq!(record.payment_method, "split");
        assert!(record.is_split_payment);
        assert_eq!(record.split_payments.len(), 2);

        let json = receipt.to_json().unwrap();
        assert!(json.contains("\"orderId\":\"ORD-2\""));
        assert!(json.contains("\"payment_method\":\"upi\""));

        let back: PaymentReceipt = serde_json::from_str(&json).unwrap();
        assert_eq!(back, receipt);
    }

    #[test]
    fn test_building_twice_does_not_touch_allocation() {
        let alloc = PaymentAllocation::new().with(PaymentMethod::Cash, Money::from_major(10));
        let before = alloc;
        let _ = builder().build("ORD-3", &alloc, None).unwrap();
        assert_eq!(alloc, before);
    }
}
