//! # Database Error Types
//!
//! Error types for database operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)        CoreError (invoice rules)           │
//! │       │                                  │                              │
//! │       ▼                                  ▼                              │
//! │  DbError (this module) ← Adds context and categorization               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ApiError (apps/api) ← {code, message} JSON + HTTP status              │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use stockroom_core::{CoreError, ValidationError};
use thiserror::Error;

/// Database operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// No row with this id.
    ///
    /// Raised by `update` / `delete` of a missing id; lookups return
    /// `Ok(None)` instead.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// A UNIQUE index rejected the write.
    ///
    /// `field` is the column (`sku`, `barcode`, `transaction_number`), taken
    /// from SQLite's "UNIQUE constraint failed: products.sku" message.
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// A write pointed at a missing supplier/customer/product, or a delete
    /// hit a row that invoices or products still reference.
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// The input or the invoice broke a domain rule before any SQL ran.
    #[error(transparent)]
    Rule(#[from] CoreError),

    /// The database file could not be opened or the pool is closed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// SQLite rejected a statement for a reason other than a constraint.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Every connection stayed busy past the acquire timeout.
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Decode failures and anything else sqlx reports.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Shorthand for [`DbError::NotFound`].
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Shorthand for [`DbError::UniqueViolation`].
    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Fills in the offending value of a UniqueViolation; SQLite only names
    /// the column.
    pub(crate) fn with_value(self, value: impl Into<String>) -> Self {
        match self {
            DbError::UniqueViolation { field, .. } => DbError::UniqueViolation {
                field,
                value: value.into(),
            },
            other => other,
        }
    }

    /// True when the database is unreachable, as opposed to the request
    /// being wrong.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, DbError::ConnectionFailed(_) | DbError::PoolExhausted)
    }
}

/// Column named in a "UNIQUE constraint failed: products.sku" message.
///
/// Composite indexes list several columns; the first one is reported.
fn unique_column(message: &str) -> Option<&str> {
    let columns = message.split("UNIQUE constraint failed: ").nth(1)?;
    let first = columns.split(',').next()?.trim();
    first.rsplit('.').next()
}

/// ```text
/// sqlx::Error::Database   UNIQUE ...       → UniqueViolation { field }
///                         FOREIGN KEY ...  → ForeignKeyViolation
///                         anything else    → QueryFailed
/// RowNotFound                              → NotFound
/// PoolTimedOut                             → PoolExhausted
/// PoolClosed, Io                           → ConnectionFailed
/// everything else                          → Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                if let Some(field) = unique_column(msg) {
                    DbError::duplicate(field, "unknown")
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::RowNotFound => DbError::not_found("Record", "unknown"),

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            sqlx::Error::Io(e) => DbError::ConnectionFailed(e.to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<ValidationError> for DbError {
    fn from(err: ValidationError) -> Self {
        DbError::Rule(CoreError::Validation(err))
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_value_only_touches_unique() {
        let err = DbError::duplicate("sku", "unknown").with_value("OIL-1L");
        assert_eq!(err.to_string(), "Duplicate sku: 'OIL-1L' already exists");

        let err = DbError::not_found("Product", "p1").with_value("x");
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[test]
    fn test_unique_column() {
        assert_eq!(
            unique_column("UNIQUE constraint failed: products.sku"),
            Some("sku")
        );
        assert_eq!(
            unique_column("UNIQUE constraint failed: t.a, t.b"),
            Some("a")
        );
        assert_eq!(unique_column("FOREIGN KEY constraint failed"), None);
    }

    #[tokio::test]
    async fn test_sqlite_constraint_errors() {
        let db = crate::Database::new(crate::DbConfig::in_memory()).await.unwrap();

        let err: DbError = sqlx::query(
            "INSERT INTO transaction_items (id, transaction_id, product_id, product_name, quantity, price, total)
             VALUES ('i1', 'nope', 'nope', 'x', 1, 100, 100)",
        )
        .execute(db.pool())
        .await
        .unwrap_err()
        .into();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));

        let err: DbError = sqlx::query("SELECT * FROM no_such_table")
            .execute(db.pool())
            .await
            .unwrap_err()
            .into();
        assert!(matches!(err, DbError::QueryFailed(_)));
    }

    #[test]
    fn test_rule_errors_keep_their_message() {
        let err: DbError = CoreError::EmptyInvoice.into();
        assert_eq!(err.to_string(), "Invoice must contain at least one line item");
        assert!(!err.is_unavailable());
        assert!(DbError::PoolExhausted.is_unavailable());
    }
}
