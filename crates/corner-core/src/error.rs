//! # Error Types
//!
//! Domain-specific error types for corner-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  corner-core errors (this file)                                         │
//! │  ├── CoreError        - Business rule violations                        │
//! │  └── ValidationError  - Input validation failures                       │
//! │                                                                         │
//! │  corner-db errors (separate crate)                                      │
//! │  └── DbError          - NotFound, conflicts, persistence failures       │
//! │      └── Domain(CoreError) - domain failures crossing the DB boundary   │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → caller                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (product name, limits, etc.)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message

use thiserror::Error;

use crate::money::Money;
use crate::types::Role;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations or domain logic failures.
/// They should be caught and translated to user-friendly messages.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Checkout attempted with no lines in the cart.
    ///
    /// ## When This Occurs
    /// - Cashier presses "Pay" on an empty register screen
    /// - A caller re-submits a cart that was already checked out and cleared
    #[error("Cart is empty")]
    EmptyCart,

    /// Insufficient stock to complete the operation.
    ///
    /// ## When This Occurs
    /// - Adding more of a product than the shelf count allows (advisory)
    /// - Commit-time re-check inside the invoice transaction (authoritative)
    ///
    /// ## User Workflow
    /// ```text
    /// Add to Cart (qty: 5)
    ///      │
    ///      ▼
    /// Check stock: available=3
    ///      │
    ///      ▼
    /// OutOfStock { name: "Milk (1L)", requested: 5, available: 3 }
    ///      │
    ///      ▼
    /// UI shows: "Only 3 Milk (1L) in stock"
    /// ```
    #[error("Insufficient stock for {name}: available {available}, requested {requested}")]
    OutOfStock {
        name: String,
        requested: i64,
        available: i64,
    },

    /// Cart has exceeded maximum allowed distinct lines.
    #[error("Cart cannot have more than {max} items")]
    CartTooLarge { max: usize },

    /// Item quantity exceeds maximum allowed.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// Discount is negative or larger than the cart subtotal.
    ///
    /// ## When This Occurs
    /// - Cashier types a discount bigger than the sale itself
    /// - A caller passes a negative discount amount
    #[error("Invalid discount {discount}: must be between $0.00 and subtotal {subtotal}")]
    InvalidDiscount { discount: Money, subtotal: Money },

    /// Credentials rejected or no active session.
    ///
    /// Deliberately carries no detail: unknown username and wrong password
    /// must be indistinguishable to the caller.
    #[error("Unauthorized")]
    Unauthorized,

    /// The acting user's role is below what the operation requires.
    #[error("This operation requires the {required} role")]
    PermissionDenied { required: Role },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID, bad phone number).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::OutOfStock {
            name: "Milk (1L)".to_string(),
            requested: 5,
            available: 3,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for Milk (1L): available 3, requested 5"
        );
    }

    #[test]
    fn test_discount_error_formats_money() {
        let err = CoreError::InvalidDiscount {
            discount: Money::from_cents(100_000),
            subtotal: Money::from_cents(897),
        };
        assert_eq!(
            err.to_string(),
            "Invalid discount $1000.00: must be between $0.00 and subtotal $8.97"
        );
    }

    #[test]
    fn test_unauthorized_is_opaque() {
        // Must not hint whether the username or the password was wrong
        assert_eq!(CoreError::Unauthorized.to_string(), "Unauthorized");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "name".to_string(),
        };
        assert_eq!(err.to_string(), "name is required");

        let err = ValidationError::TooShort {
            field: "password".to_string(),
            min: 6,
        };
        assert_eq!(err.to_string(), "password must be at least 6 characters");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::MustBePositive {
            field: "quantity".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
