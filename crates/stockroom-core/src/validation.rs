//! # Validation Module
//!
//! Input validation utilities for Stockroom.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Web client forms                                             │
//! │  └── Immediate user feedback (not trusted)                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: REST handler (Rust)                                          │
//! │  ├── Type validation (serde deserialization)                           │
//! │  └── THIS MODULE: Business rule validation                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  ├── UNIQUE constraints (sku, barcode, invoice number)                 │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use stockroom_core::validation::{validate_sku, validate_quantity};
//!
//! assert!(validate_sku("OIL-1L").is_ok());
//! assert!(validate_quantity(5).is_ok());
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::{MAX_ITEM_QUANTITY, MAX_PAGE_SIZE};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest accepted value for names and other short text fields.
pub const MAX_NAME_LEN: usize = 200;

/// Longest accepted free-form text (descriptions, addresses).
pub const MAX_TEXT_LEN: usize = 2000;

// =============================================================================
// String Validators
// =============================================================================

/// Trims a required text field and checks its length.
///
/// ## Returns
/// The trimmed value, ready to store.
pub fn validate_required_text(field: &str, value: &str, max: usize) -> ValidationResult<String> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::required(field));
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(value.to_string())
}

/// Normalizes an optional text field.
///
/// Web forms submit untouched inputs as `""`; those are stored as NULL so
/// that UNIQUE columns such as `barcode` don't collide on empty strings.
pub fn normalize_optional_text(
    field: &str,
    value: Option<String>,
    max: usize,
) -> ValidationResult<Option<String>> {
    match value {
        None => Ok(None),
        Some(v) => {
            let v = v.trim();
            if v.is_empty() {
                Ok(None)
            } else if v.chars().count() > max {
                Err(ValidationError::TooLong {
                    field: field.to_string(),
                    max,
                })
            } else {
                Ok(Some(v.to_string()))
            }
        }
    }
}

/// Validates a name-like required field (product, customer, supplier).
///
/// ```rust
/// use stockroom_core::validation::validate_name;
///
/// assert_eq!(validate_name("name", "  Acme Ltd ").unwrap(), "Acme Ltd");
/// assert!(validate_name("name", "").is_err());
/// ```
pub fn validate_name(field: &str, name: &str) -> ValidationResult<String> {
    validate_required_text(field, name, MAX_NAME_LEN)
}

/// Validates a SKU (Stock Keeping Unit).
///
/// ## Rules
/// - Must not be empty
/// - At most 50 characters
/// - Letters, digits, hyphens, underscores and dots only
pub fn validate_sku(sku: &str) -> ValidationResult<String> {
    let sku = validate_required_text("sku", sku, 50)?;

    if !sku
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_' || c == '.')
    {
        return Err(ValidationError::invalid(
            "sku",
            "must contain only letters, numbers, hyphens, underscores and dots",
        ));
    }

    Ok(sku)
}

/// Validates an optional email address.
///
/// Only the shape is checked (one `@`, something on both sides, a dot in
/// the domain). Deliverability is not our concern.
pub fn validate_email(email: Option<String>) -> ValidationResult<Option<String>> {
    let Some(email) = normalize_optional_text("email", email, MAX_NAME_LEN)? else {
        return Ok(None);
    };

    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    };

    if !valid || email.chars().any(char::is_whitespace) {
        return Err(ValidationError::invalid("email", "not a valid email address"));
    }

    Ok(Some(email))
}

/// Validates a currency label.
///
/// Currency is an opaque label (`TRY`, `USD`, ...); no conversion is ever
/// done, so the only rules are "present, short, no spaces".
pub fn validate_currency(label: &str) -> ValidationResult<String> {
    let label = validate_required_text("currency", label, 10)?;

    if label.chars().any(char::is_whitespace) {
        return Err(ValidationError::invalid("currency", "must not contain spaces"));
    }

    Ok(label)
}

/// Validates a search query.
///
/// ## Returns
/// `None` when the query is blank (meaning "no filter").
pub fn validate_search_query(query: Option<&str>) -> ValidationResult<Option<String>> {
    let Some(query) = query.map(str::trim).filter(|q| !q.is_empty()) else {
        return Ok(None);
    };

    if query.chars().count() > 100 {
        return Err(ValidationError::TooLong {
            field: "search".to_string(),
            max: 100,
        });
    }

    Ok(Some(query.to_string()))
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates an invoice line quantity.
///
/// ## Rules
/// - Must be at least 1
/// - Must not exceed MAX_ITEM_QUANTITY (9,999)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if !(1..=MAX_ITEM_QUANTITY).contains(&qty) {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a stock counter (`quantity`, `minQuantity` on a product).
pub fn validate_stock_level(field: &str, value: i64) -> ValidationResult<()> {
    if value < 0 {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Validates a money amount that must be zero or greater.
///
/// ```rust
/// use stockroom_core::money::Money;
/// use stockroom_core::validation::validate_amount;
///
/// assert!(validate_amount("price", Money::from_cents(0)).is_ok());
/// assert!(validate_amount("price", Money::from_cents(-1)).is_err());
/// ```
pub fn validate_amount(field: &str, amount: Money) -> ValidationResult<()> {
    if amount.is_negative() {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Clamps list paging parameters.
///
/// A missing or zero limit falls back to `default_limit`; anything above
/// `MAX_PAGE_SIZE` is an error rather than silently truncated.
pub fn validate_page(
    limit: Option<i64>,
    offset: Option<i64>,
    default_limit: i64,
) -> ValidationResult<(i64, i64)> {
    let limit = match limit {
        None | Some(0) => default_limit,
        Some(l) => l,
    };

    if !(1..=MAX_PAGE_SIZE).contains(&limit) {
        return Err(ValidationError::OutOfRange {
            field: "limit".to_string(),
            min: 1,
            max: MAX_PAGE_SIZE,
        });
    }

    let offset = offset.unwrap_or(0);
    if offset < 0 {
        return Err(ValidationError::Negative {
            field: "offset".to_string(),
        });
    }

    Ok((limit, offset))
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID string format.
///
/// ```rust
/// use stockroom_core::validation::validate_uuid;
///
/// assert!(validate_uuid("id", "550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("id", "not-a-uuid").is_err());
/// ```
pub fn validate_uuid(field: &str, id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::required(field));
    }

    uuid::Uuid::parse_str(id.trim())
        .map_err(|_| ValidationError::invalid(field, "must be a valid UUID"))?;

    Ok(())
}

/// Normalizes an optional foreign-key id: blank becomes `None`, anything
/// else must parse as a UUID.
pub fn normalize_optional_id(field: &str, id: Option<String>) -> ValidationResult<Option<String>> {
    match normalize_optional_text(field, id, 64)? {
        None => Ok(None),
        Some(id) => {
            validate_uuid(field, &id)?;
            Ok(Some(id))
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_sku() {
        assert_eq!(validate_sku(" OIL-1L ").unwrap(), "OIL-1L");
        assert!(validate_sku("ABC123").is_ok());
        assert!(validate_sku("product_1.v2").is_ok());

        assert!(validate_sku("").is_err());
        assert!(validate_sku("   ").is_err());
        assert!(validate_sku("has space").is_err());
        assert!(validate_sku(&"A".repeat(51)).is_err());
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("name", "Zeytinyağı 1L").is_ok());
        assert_eq!(
            validate_name("customerName", ""),
            Err(ValidationError::required("customerName"))
        );
        assert!(validate_name("name", &"A".repeat(201)).is_err());
        // Length counts characters, not bytes.
        assert!(validate_name("name", &"ğ".repeat(200)).is_ok());
    }

    #[test]
    fn test_normalize_optional_text() {
        assert_eq!(normalize_optional_text("phone", None, 10).unwrap(), None);
        assert_eq!(
            normalize_optional_text("phone", Some("   ".into()), 10).unwrap(),
            None
        );
        assert_eq!(
            normalize_optional_text("phone", Some(" 555 ".into()), 10).unwrap(),
            Some("555".to_string())
        );
        assert!(normalize_optional_text("phone", Some("1".repeat(11)), 10).is_err());
    }

    #[test]
    fn test_validate_email() {
        assert_eq!(validate_email(None).unwrap(), None);
        assert_eq!(validate_email(Some("".into())).unwrap(), None);
        assert_eq!(
            validate_email(Some("ali@example.com".into())).unwrap(),
            Some("ali@example.com".to_string())
        );

        assert!(validate_email(Some("no-at-sign".into())).is_err());
        assert!(validate_email(Some("@example.com".into())).is_err());
        assert!(validate_email(Some("a@b@c.com".into())).is_err());
        assert!(validate_email(Some("a@localhost".into())).is_err());
        assert!(validate_email(Some("a b@example.com".into())).is_err());
    }

    #[test]
    fn test_validate_currency() {
        assert_eq!(validate_currency("TRY").unwrap(), "TRY");
        assert!(validate_currency("").is_err());
        assert!(validate_currency("US D").is_err());
    }

    #[test]
    fn test_validate_search_query() {
        assert_eq!(validate_search_query(None).unwrap(), None);
        assert_eq!(validate_search_query(Some("  ")).unwrap(), None);
        assert_eq!(
            validate_search_query(Some(" oil ")).unwrap(),
            Some("oil".to_string())
        );
        assert!(validate_search_query(Some(&"x".repeat(101))).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(MAX_ITEM_QUANTITY).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(MAX_ITEM_QUANTITY + 1).is_err());
    }

    #[test]
    fn test_validate_stock_level() {
        assert!(validate_stock_level("quantity", 0).is_ok());
        assert!(validate_stock_level("minQuantity", -1).is_err());
    }

    #[test]
    fn test_validate_page() {
        assert_eq!(validate_page(None, None, 10).unwrap(), (10, 0));
        assert_eq!(validate_page(Some(0), Some(20), 10).unwrap(), (10, 20));
        assert_eq!(validate_page(Some(25), Some(5), 10).unwrap(), (25, 5));

        assert!(validate_page(Some(MAX_PAGE_SIZE + 1), None, 10).is_err());
        assert!(validate_page(Some(-3), None, 10).is_err());
        assert!(validate_page(None, Some(-1), 10).is_err());
    }

    #[test]
    fn test_validate_uuid() {
        assert!(validate_uuid("id", "550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_uuid("id", "").is_err());
        assert!(validate_uuid("id", "123").is_err());
    }

    #[test]
    fn test_normalize_optional_id() {
        assert_eq!(normalize_optional_id("supplierId", Some("".into())).unwrap(), None);
        assert!(normalize_optional_id("supplierId", Some("nope".into())).is_err());
        assert!(normalize_optional_id(
            "supplierId",
            Some("550e8400-e29b-41d4-a716-446655440000".into())
        )
        .unwrap()
        .is_some());
    }
}
