//! # Error Types
//!
//! Domain-specific error types for cafe-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  cafe-core errors (this file)                                          │
//! │  ├── CoreError        - Cart, access and domain rule failures          │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  cafe-db errors       └── DbError      - Database failures             │
//! │  cafe-reports errors  └── ExportError  - File export failures          │
//! │                                                                         │
//! │  Console              └── ApiError     - What the operator sees        │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError ─┐                                  │
//! │        DbError ─────────────────────┼──► ApiError → stderr             │
//! │        ExportError ─────────────────┘                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Cart errors (`InvalidQuantity`, `InsufficientStock`, `EmptySale`) are
//! raised before any persistence call is attempted.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Quantity text did not parse, or the value was zero or negative.
    #[error("Invalid quantity: '{input}'")]
    InvalidQuantity { input: String },

    /// Adding to the cart would push the line above the product's stock.
    ///
    /// ## User Workflow
    /// ```text
    /// Cart holds Latte × 8, stock = 10
    ///      │
    ///      ▼
    /// add(Latte, 5) → 8 + 5 = 13 > 10
    ///      │
    ///      ▼
    /// InsufficientStock { product: "Latte", available: 10, requested: 13 }
    ///      │
    ///      ▼
    /// Operator sees: "Stock available: 10"
    /// ```
    #[error("Insufficient stock for {product}: available {available}, requested {requested}")]
    InsufficientStock {
        product: String,
        available: i64,
        requested: i64,
    },

    /// A line subtotal or the sale total would not fit in i64 cents.
    #[error("Amount too large for {product}")]
    AmountTooLarge { product: String },

    /// Commit was attempted with no cart lines.
    #[error("Cannot commit a sale with no items")]
    EmptySale,

    /// Product has no line in the cart.
    #[error("Product {0} is not in the cart")]
    NotInCart(i64),

    /// The session's role may not perform the action.
    #[error("Permission denied: {action}")]
    PermissionDenied { action: String },

    /// The session's role may not open the screen.
    #[error("Screen not available: {screen}")]
    ScreenDenied { screen: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised by the validators in [`crate::validation`] before anything is
/// written to the database.
#[derive(Debug, Error)]
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

    /// Invalid format (e.g., malformed email, bad amount).
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            product: "Latte".to_string(),
            available: 10,
            requested: 13,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for Latte: available 10, requested 13"
        );

        let err = CoreError::InvalidQuantity {
            input: "abc".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid quantity: 'abc'");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "name".to_string(),
        };
        assert_eq!(err.to_string(), "name is required");

        let err = ValidationError::TooLong {
            field: "name".to_string(),
            max: 100,
        };
        assert_eq!(err.to_string(), "name must be at most 100 characters");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "name".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
