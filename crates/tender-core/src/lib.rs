//! # tender-core: Pure Checkout Logic
//!
//! Prices a cart, splits the payable total across payment instruments,
//! judges the split and freezes it into a receipt. No I/O anywhere.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Checkout Data Flow                               │
//! │                                                                         │
//! │  ┌───────────┐   payable    ┌──────────────────┐                        │
//! │  │   cart    │────total────►│   allocation     │◄──── adopt() ───┐      │
//! │  │ CartLine  │              │ AllocationEngine │                 │      │
//! │  └───────────┘              └────────┬─────────┘        ┌────────┴───┐  │
//! │                                      │                  │  planner   │  │
//! │        ┌─────────────┐               ▼                  │ (suggest)  │  │
//! │        │   policy    │      ┌──────────────────┐        └────────────┘  │
//! │        │ PolicyTable │─────►│    validator     │                        │
//! │        │ (read-only) │      │ ValidationResult │                        │
//! │        └─────────────┘      └────────┬─────────┘                        │
//! │                                      ▼                                  │
//! │                             ┌──────────────────┐                        │
//! │                             │     receipt      │──► persistence         │
//! │                             │  PaymentReceipt  │    (external)          │
//! │                             └──────────────────┘                        │
//! │                                                                         │
//! │   NO I/O • NO DATABASE • NO NETWORK • SYNCHRONOUS                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`cart`] - Cart lines and the payable total
//! - [`policy`] - Per-method limits and fees
//! - [`allocation`] - The live split for one checkout
//! - [`validator`] - Balanced / underpaid / overpaid / blocked
//! - [`planner`] - Suggested split across available methods
//! - [`receipt`] - Immutable receipt records
//! - [`money`] - Money type with integer arithmetic
//! - [`types`] - Payment methods, modes, membership balance
//! - [`error`] - Domain error types
//! - [`validation`] - Field-level input checks
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: same input, same output; recompute is idempotent
//! 2. **Integer Money**: amounts are minor units (i64), fractions go through `Decimal`
//! 3. **Clamp, Don't Fail**: bad amounts from the till become zero or the cap
//! 4. **Results, Not Errors**: policy breaches are validation results
//!
//! ## Example Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use tender_core::allocation::AllocationEngine;
//! use tender_core::cart::{compute_total, CartLine};
//! use tender_core::policy::PolicyTable;
//! use tender_core::validator::{PaymentValidator, ValidationCategory};
//! use tender_core::{MembershipBalance, Money, PaymentMethod, TaxRate};
//!
//! let lines = vec![
//!     CartLine::new(Money::from_major(2500), 1, Money::from_major(590), TaxRate::from_bps(1800)).unwrap(),
//!     CartLine::new(Money::from_major(1000), 1, Money::from_major(236), TaxRate::from_bps(1800)).unwrap(),
//! ];
//! let total = compute_total(&lines, Money::zero());
//! assert_eq!(total, Money::from_major(3304));
//!
//! let policies = Arc::new(PolicyTable::default());
//! let wallet = MembershipBalance::active(Money::from_major(304));
//! let mut engine = AllocationEngine::new(policies.clone(), total, wallet);
//! engine.set_single_method(PaymentMethod::Upi);
//!
//! let result = PaymentValidator::new(policies).validate(engine.allocation(), total, Some(&wallet));
//! assert_eq!(result.category, ValidationCategory::Balanced);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod allocation;
pub mod cart;
pub mod error;
pub mod money;
pub mod planner;
pub mod policy;
pub mod receipt;
pub mod types;
pub mod validation;
pub mod validator;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use tender_core::Money` instead of
// `use tender_core::money::Money`

pub use allocation::{AllocationEngine, PaymentAllocation};
pub use cart::{compute_total, Cart, CartLine, CartTotals};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use planner::DistributionPlanner;
pub use policy::{PaymentMethodPolicy, PolicyTable};
pub use receipt::{PaymentDetail, PaymentReceipt, ReceiptBuilder, SplitPaymentRecord};
pub use types::*;
pub use validator::{PaymentValidator, SplitPaymentReview, ValidationCategory, ValidationResult};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum lines allowed in a single cart
///
/// ## Business Reason
/// Prevents runaway carts and keeps checkouts a reasonable size.
pub const MAX_CART_LINES: usize = 100;

/// Maximum quantity on a single cart line
///
/// ## Business Reason
/// Catches typos at the till (1000 instead of 10).
pub const MAX_LINE_QUANTITY: i64 = 999;

/// Maximum order id length; the id is embedded in every payment line id.
pub const MAX_ORDER_ID_LEN: usize = 64;
