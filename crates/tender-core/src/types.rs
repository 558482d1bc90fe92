//! # Domain Types
//!
//! Core domain types shared by the checkout components.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    TaxRate      │   │ PaymentMethod   │   │MembershipBalance│       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  bps (u32)      │   │  Cash           │   │  current_balance│       │
//! │  │  1800 = 18%     │   │  CreditCard     │   │  is_active      │       │
//! │  └─────────────────┘   │  DebitCard      │   └─────────────────┘       │
//! │                        │  Upi            │                              │
//! │  ┌─────────────────┐   │  Bnpl           │   ┌─────────────────┐       │
//! │  │  PaymentMode    │   │  Membership     │   │ PaymentStatus   │       │
//! │  │  Single / Split │   └─────────────────┘   │  Completed ...  │       │
//! │  └─────────────────┘                         └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 1800 bps = 18% (standard GST slab)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Creates a tax rate from a percentage (for convenience).
    pub fn from_percentage(pct: f64) -> Self {
        if !pct.is_finite() || pct <= 0.0 {
            return TaxRate::zero();
        }
        TaxRate((pct * 100.0).round() as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Returns the rate as an exact fraction (1800 bps → 0.18).
    #[inline]
    pub fn fraction(&self) -> Decimal {
        Decimal::new(self.0 as i64, 4)
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }

    /// Checks if tax rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::zero()
    }
}

// =============================================================================
// Payment Method
// =============================================================================

/// The closed set of payment instruments a checkout can be split across.
///
/// Declaration order is the canonical order: receipts list payments in it
/// and planner preferences are applied in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Physical cash.
    Cash,
    /// Credit card on an external terminal (carries a processing fee).
    CreditCard,
    /// Debit card on an external terminal (carries a processing fee).
    DebitCard,
    /// UPI instant transfer (daily limit).
    Upi,
    /// Buy now, pay later (minimum and maximum amount).
    Bnpl,
    /// Prepaid membership wallet. Engine-managed, never set by the cashier.
    Membership,
}

impl PaymentMethod {
    /// Every method in canonical order.
    pub const ALL: [PaymentMethod; 6] = [
        PaymentMethod::Cash,
        PaymentMethod::CreditCard,
        PaymentMethod::DebitCard,
        PaymentMethod::Upi,
        PaymentMethod::Bnpl,
        PaymentMethod::Membership,
    ];

    /// Methods that are offered at every till, used by equal distribution.
    pub const ALWAYS_AVAILABLE: [PaymentMethod; 4] = [
        PaymentMethod::Cash,
        PaymentMethod::CreditCard,
        PaymentMethod::DebitCard,
        PaymentMethod::Upi,
    ];

    /// The snake_case key used in JSON, config files and ids.
    pub const fn key(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::CreditCard => "credit_card",
            PaymentMethod::DebitCard => "debit_card",
            PaymentMethod::Upi => "upi",
            PaymentMethod::Bnpl => "bnpl",
            PaymentMethod::Membership => "membership",
        }
    }

    /// Human-readable name for receipts and the tender screen.
    pub const fn display_name(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "Cash Payment",
            PaymentMethod::CreditCard => "Credit Card",
            PaymentMethod::DebitCard => "Debit Card",
            PaymentMethod::Upi => "UPI Payment",
            PaymentMethod::Bnpl => "Buy Now Pay Later",
            PaymentMethod::Membership => "Membership Balance",
        }
    }

    /// Prefix of synthetic transaction ids for this method.
    pub const fn transaction_prefix(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "CASH",
            PaymentMethod::CreditCard => "CC",
            PaymentMethod::DebitCard => "DC",
            PaymentMethod::Upi => "UPI",
            PaymentMethod::Bnpl => "BNPL",
            PaymentMethod::Membership => "MEM",
        }
    }

    /// True for the wallet entry, which only the engine may write.
    #[inline]
    pub const fn is_membership(&self) -> bool {
        matches!(self, PaymentMethod::Membership)
    }

    /// True for credit and debit cards.
    #[inline]
    pub const fn is_card(&self) -> bool {
        matches!(self, PaymentMethod::CreditCard | PaymentMethod::DebitCard)
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for PaymentMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cash" => Ok(PaymentMethod::Cash),
            "credit_card" | "credit" => Ok(PaymentMethod::CreditCard),
            "debit_card" | "debit" => Ok(PaymentMethod::DebitCard),
            "upi" => Ok(PaymentMethod::Upi),
            "bnpl" | "pay_later" => Ok(PaymentMethod::Bnpl),
            "membership" | "wallet" => Ok(PaymentMethod::Membership),
            _ => Err(ValidationError::NotAllowed {
                field: "payment_method".to_string(),
                allowed: PaymentMethod::ALL.iter().map(|m| m.key().to_string()).collect(),
            }),
        }
    }
}

// =============================================================================
// Payment Mode
// =============================================================================

/// Whether the cashier is taking one instrument or splitting the bill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMode {
    /// One non-membership method carries the whole amount due.
    #[default]
    Single,
    /// Several methods share the amount due.
    Split,
}

// =============================================================================
// Payment Status
// =============================================================================

/// Status of a single payment line on a receipt.
///
/// `ReceiptBuilder` only ever produces `Completed`. `Pending` and `Failed`
/// exist so stored split-payment records, which carry the same status
/// field, deserialize with their full set of values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
}

// =============================================================================
// Membership Balance
// =============================================================================

/// A client's prepaid wallet as read from the customer-account service.
///
/// Read-only for this crate: the engine consumes it, never changes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct MembershipBalance {
    /// Remaining prepaid credit.
    pub current_balance: Money,
    /// Inactive or expired memberships contribute nothing.
    pub is_active: bool,
}

impl MembershipBalance {
    /// An active membership with the given balance (negative clamps to zero).
    pub fn active(current_balance: Money) -> Self {
        MembershipBalance {
            current_balance: current_balance.non_negative(),
            is_active: true,
        }
    }

    /// An inactive membership; its balance is ignored when reserving.
    pub fn inactive(current_balance: Money) -> Self {
        MembershipBalance {
            current_balance: current_balance.non_negative(),
            is_active: false,
        }
    }

    /// What the wallet can contribute right now.
    #[inline]
    pub fn spendable(&self) -> Money {
        if self.is_active {
            self.current_balance.non_negative()
        } else {
            Money::zero()
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
