//! # Error Types
//!
//! Domain-specific error types for stockroom-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  stockroom-core errors (this file)                                     │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  stockroom-db errors (separate crate)                                  │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  HTTP errors (apps/api)                                                │
//! │  └── ApiError         - What the client sees (JSON envelope)           │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → Client       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Business rule violations raised while composing an invoice or applying
/// a change to an entity.
#[derive(Debug, Error)]
pub enum CoreError {
    /// An invoice line references a product that does not exist.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// An invoice was submitted with no line items.
    ///
    /// ## User Workflow
    /// ```text
    /// Invoice form ── submit with 0 rows ──► create_invoice()
    ///                                             │
    ///                                             ▼
    ///                                     EmptyInvoice → 400
    /// ```
    #[error("Invoice must contain at least one line item")]
    EmptyInvoice,

    /// Invoice has more lines than allowed.
    #[error("Invoice cannot have more than {max} line items")]
    TooManyLines { max: usize },

    /// Discount exceeds what the invoice is worth.
    #[error("Invoice total cannot be negative: subtotal {subtotal}, discount {discount}, tax {tax}")]
    NegativeTotal {
        subtotal: String,
        discount: String,
        tax: String,
    },

    /// A line total or invoice total does not fit in the money range.
    #[error("Invoice amount overflow")]
    AmountOverflow,

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when request data doesn't meet requirements.
/// Used for early validation before anything reaches the database.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
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

    /// Value must be zero or greater.
    #[error("{field} cannot be negative")]
    Negative { field: String },

    /// Invalid format (e.g., invalid UUID, invalid email).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Shorthand for [`ValidationError::Required`].
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }

    /// Shorthand for [`ValidationError::InvalidFormat`].
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }
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
        let err = CoreError::NegativeTotal {
            subtotal: "10.00".to_string(),
            discount: "15.00".to_string(),
            tax: "1.00".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invoice total cannot be negative: subtotal 10.00, discount 15.00, tax 1.00"
        );
        assert_eq!(
            CoreError::EmptyInvoice.to_string(),
            "Invoice must contain at least one line item"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        assert_eq!(ValidationError::required("sku").to_string(), "sku is required");

        let err = ValidationError::TooLong {
            field: "name".to_string(),
            max: 200,
        };
        assert_eq!(err.to_string(), "name must be at most 200 characters");

        let err = ValidationError::invalid("email", "missing '@'");
        assert_eq!(err.to_string(), "email has invalid format: missing '@'");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let core_err: CoreError = ValidationError::required("customerName").into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
