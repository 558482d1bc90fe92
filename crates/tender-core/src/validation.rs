//! # Input Validation
//!
//! Field-level checks for structured checkout input.
//!
//! ## Where This Fits
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Two Kinds of Checking                              │
//! │                                                                         │
//! │  THIS MODULE (reject)                 validator.rs (report)             │
//! │  ─────────────────────                ─────────────────────             │
//! │  Cart line shape                      Allocation vs. payable total      │
//! │  Order id format                      Method limits (UPI, BNPL)         │
//! │  Cart size                            Membership over balance           │
//! │        │                                     │                          │
//! │        ▼                                     ▼                          │
//! │  Err(ValidationError)                 ValidationResult { category }     │
//! │                                                                         │
//! │  Payment amounts typed by the cashier are neither: they are clamped     │
//! │  by the allocation engine.                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use tender_core::validation::{validate_order_id, validate_quantity};
//!
//! validate_order_id("ORD-2024-0001").unwrap();
//! validate_quantity(5).unwrap();
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::{MAX_CART_LINES, MAX_LINE_QUANTITY, MAX_ORDER_ID_LEN};

/// Result type for validation operations.
pub type ValidationOutcome<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates an order id before it is stamped onto a receipt.
///
/// ## Rules
/// - Must not be empty
/// - At most 64 characters
/// - Letters, digits, hyphens and underscores only (it becomes part of
///   every payment line id)
///
/// ## Example
/// ```rust
/// use tender_core::validation::validate_order_id;
///
/// assert!(validate_order_id("ORD-1").is_ok());
/// assert!(validate_order_id("").is_err());
/// assert!(validate_order_id("has space").is_err());
/// ```
pub fn validate_order_id(order_id: &str) -> ValidationOutcome<()> {
    let order_id = order_id.trim();

    if order_id.is_empty() {
        return Err(ValidationError::Required {
            field: "order_id".to_string(),
        });
    }

    if order_id.len() > MAX_ORDER_ID_LEN {
        return Err(ValidationError::TooLong {
            field: "order_id".to_string(),
            max: MAX_ORDER_ID_LEN,
        });
    }

    if !order_id
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "order_id".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_LINE_QUANTITY (999)
pub fn validate_quantity(qty: i64) -> ValidationOutcome<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_LINE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_LINE_QUANTITY,
        });
    }

    Ok(())
}

/// Validates that a price or discount is not negative.
///
/// Zero is allowed (free items, no discount).
///
/// ## Example
/// ```rust
/// use tender_core::money::Money;
/// use tender_core::validation::validate_non_negative;
///
/// assert!(validate_non_negative("price", Money::from_major(2500)).is_ok());
/// assert!(validate_non_negative("price", Money::zero()).is_ok());
/// assert!(validate_non_negative("price", Money::from_cents(-1)).is_err());
/// ```
pub fn validate_non_negative(field: &str, amount: Money) -> ValidationOutcome<()> {
    if amount.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Validates a tax rate in basis points.
///
/// ## Rules
/// - Must be between 0 and 10000 (0% to 100%)
/// - GST slabs are 0, 5, 12, 18 and 28%
pub fn validate_tax_rate_bps(bps: u32) -> ValidationOutcome<()> {
    if bps > 10000 {
        return Err(ValidationError::OutOfRange {
            field: "tax_rate".to_string(),
            min: 0,
            max: 10000,
        });
    }

    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates cart size (number of lines).
///
/// ## Rules
/// - Must not exceed MAX_CART_LINES (100)
pub fn validate_cart_size(lines: usize) -> ValidationOutcome<()> {
    if lines > MAX_CART_LINES {
        return Err(ValidationError::OutOfRange {
            field: "cart lines".to_string(),
            min: 0,
            max: MAX_CART_LINES as i64,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
