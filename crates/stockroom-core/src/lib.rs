//! # stockroom-core: Pure Business Logic for Stockroom
//!
//! This crate holds the domain of the Stockroom back office: products,
//! customers, suppliers and sales transactions (invoices). Everything here
//! is a pure function with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Stockroom Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Web client (separate repo)                   │   │
//! │  │    Dashboard ──► Products ──► Customers ──► Invoice form        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ JSON over HTTP                         │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    stockroom-api (axum)                         │   │
//! │  │    /api/products, /api/transactions, /api/dashboard, ...        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ stockroom-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  invoice  │  │ validation│  │   │
//! │  │   │  Product  │  │   Money   │  │  totals   │  │   rules   │  │   │
//! │  │   │Transaction│  │  "12.50"  │  │  INV-NNN  │  │   checks  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  stockroom-db (Database Layer)                  │   │
//! │  │              SQLite queries, migrations, repositories           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Stored entities (Product, Transaction, ...)
//! - [`input`] - Create/update request shapes and their validation
//! - [`invoice`] - Invoice totals and numbering
//! - [`money`] - Money type with integer arithmetic
//! - [`error`] - Domain error types
//! - [`validation`] - Field-level rules
//!
//! ## Example Usage
//!
//! ```rust
//! use stockroom_core::invoice::{next_invoice_number, InvoiceTotals};
//! use stockroom_core::money::Money;
//!
//! let price: Money = "89.90".parse().unwrap();
//! let subtotal = price.multiply_quantity(3);
//!
//! let totals = InvoiceTotals::compute(subtotal, Money::from_cents(500), Money::zero()).unwrap();
//! assert_eq!(totals.total.to_string(), "264.70");
//!
//! assert_eq!(next_invoice_number(Some(7)), "INV-008");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod input;
pub mod invoice;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use input::{
    CustomerPatch, NewCustomer, NewProduct, NewSupplier, ProductPatch, SupplierPatch, UpsertUser,
};
pub use invoice::{
    InvoiceDraft, InvoiceLine, InvoicePreview, InvoiceRequest, InvoiceTotals, NewTransaction,
    NewTransactionItem, TransactionPatch,
};
pub use money::Money;
pub use types::*;

// =============================================================================
// Constants
// =============================================================================

/// Currency label given to products created without one.
pub const DEFAULT_CURRENCY: &str = "TRY";

/// Reorder threshold given to products created without one.
pub const DEFAULT_MIN_QUANTITY: i64 = 5;

/// Maximum quantity on a single invoice line.
pub const MAX_ITEM_QUANTITY: i64 = 9999;

/// Maximum number of lines on one invoice.
pub const MAX_INVOICE_LINES: usize = 100;

/// Page size used when a listing request does not name one.
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Largest page a listing request may ask for.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Prefix of every invoice number (`INV-001`).
pub const INVOICE_PREFIX: &str = "INV-";
