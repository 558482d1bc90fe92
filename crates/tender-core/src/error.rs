//! # Error Types
//!
//! Domain-specific error types for tender-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  tender-core errors (this file)                                        │
//! │  ├── CoreError        - Programmer misuse of the checkout API          │
//! │  └── ValidationError  - Cart line / identifier input failures          │
//! │                                                                         │
//! │  tender-config errors (separate crate)                                 │
//! │  └── ConfigError      - Policy file / environment failures             │
//! │                                                                         │
//! │  NOT errors: underpaid, overpaid, UPI over limit, etc.                 │
//! │  Those are `ValidationResult` values from the payment validator.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (order id, method, amount)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message

use thiserror::Error;

use crate::types::PaymentMethod;

// =============================================================================
// Core Error
// =============================================================================

/// Errors raised when the checkout API is used incorrectly.
///
/// Normal checkout outcomes never come through here: a shortfall or a
/// limit breach is reported by [`crate::validator::PaymentValidator`].
#[derive(Debug, Error)]
pub enum CoreError {
    /// A receipt was requested for an allocation that breaks a method policy.
    ///
    /// ## When This Occurs
    /// - The caller skipped `validate()` before `build()`
    /// - The caller ignored a `Blocked` validation category
    #[error("Allocation is blocked: {reason}")]
    AllocationBlocked { reason: String },

    /// A receipt was requested for an allocation with no positive amount.
    #[error("Allocation for order {order_id} has no payments")]
    EmptyAllocation { order_id: String },

    /// A policy table entry is inconsistent.
    #[error("Invalid policy for {method}: {reason}")]
    InvalidPolicy { method: PaymentMethod, reason: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when structured input (cart lines, order ids)
/// doesn't meet requirements. Free-typed payment amounts are clamped
/// instead, see [`crate::money::Money::from_user_input`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format.
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
