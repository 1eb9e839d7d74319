//! # Repository Module
//!
//! Database repository implementations for Stockroom.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  HTTP handler                                                          │
//! │       │                                                                 │
//! │       │  db.products().list(Some("oil"))                               │
//! │       ▼                                                                 │
//! │  ProductRepository                                                     │
//! │  ├── list(&self, search)                                               │
//! │  ├── get_by_id(&self, id)                                              │
//! │  ├── insert(&self, product)                                            │
//! │  └── update(&self, product)                                            │
//! │       │                                                                 │
//! │       │  One parameterized SQL statement                               │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Validation happens before a repository is called; repositories        │
//! │  only translate between rows and domain types.                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`product::ProductRepository`] - Product CRUD, search, low stock
//! - [`customer::CustomerRepository`] - Customer CRUD and search
//! - [`supplier::SupplierRepository`] - Supplier CRUD and search
//! - [`transaction::TransactionRepository`] - Invoices and line items
//! - [`user::UserRepository`] - Back-office user profiles
//! - [`dashboard::DashboardRepository`] - Aggregate metrics

pub mod customer;
pub mod dashboard;
pub mod product;
pub mod supplier;
pub mod transaction;
pub mod user;

use uuid::Uuid;

/// Generates a new entity id (UUID v4).
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

/// Builds a `LIKE` pattern matching `query` as a literal substring.
///
/// `%`, `_` and the escape character itself are escaped; queries using it
/// must add `ESCAPE '\'`. Matching is case-insensitive for ASCII, which is
/// SQLite's `LIKE` behavior.
pub(crate) fn like_pattern(query: &str) -> String {
    let mut pattern = String::with_capacity(query.len() + 2);
    pattern.push('%');
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("oil"), "%oil%");
        assert_eq!(like_pattern("50%"), "%50\\%%");
        assert_eq!(like_pattern("a_b"), "%a\\_b%");
        assert_eq!(like_pattern("c:\\"), "%c:\\\\%");
    }

    #[test]
    fn test_generate_id_is_uuid() {
        assert!(Uuid::parse_str(&generate_id()).is_ok());
    }
}
