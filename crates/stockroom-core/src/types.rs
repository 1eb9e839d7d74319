//! # Domain Types
//!
//! Core domain types used throughout Stockroom.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Supplier     │◄──│    Product      │◄──│ TransactionItem │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  product_id     │       │
//! │  │  name           │   │  sku (business) │   │  product_name   │       │
//! │  │  tax_number     │   │  price, cost    │   │  price × qty    │       │
//! │  └─────────────────┘   │  quantity/min   │   └────────┬────────┘       │
//! │                        └─────────────────┘            │                 │
//! │  ┌─────────────────┐   ┌─────────────────┐            │                 │
//! │  │    Customer     │◄──│  Transaction    │◄───────────┘                 │
//! │  │  ─────────────  │   │  ─────────────  │                              │
//! │  │  id (UUID)      │   │  INV-001        │                              │
//! │  │  name, email    │   │  subtotal/total │                              │
//! │  └─────────────────┘   │  status         │                              │
//! │                        └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has:
//! - `id`: UUID v4 - immutable, used for database relations
//! - Business ID where one exists: `sku`, `barcode`, `transaction_number`
//!
//! ## Wire Format
//! All types serialize with camelCase field names (`minQuantity`,
//! `customerName`) and money as two-decimal strings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// User
// =============================================================================

/// Role of a back-office user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    #[default]
    Employee,
}

/// A back-office user. Authentication itself lives outside this system;
/// the record only carries profile data keyed by the identity provider's id.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile_image_url: Option<String>,
    pub role: UserRole,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// "First Last", falling back to the username or email.
    pub fn display_name(&self) -> Option<String> {
        match (&self.first_name, &self.last_name) {
            (Some(f), Some(l)) => Some(format!("{} {}", f, l)),
            (Some(f), None) => Some(f.clone()),
            (None, Some(l)) => Some(l.clone()),
            (None, None) => self.username.clone().or_else(|| self.email.clone()),
        }
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product kept in stock and sold on invoices.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name shown on invoices.
    pub name: String,

    pub description: Option<String>,

    /// Stock Keeping Unit - business identifier, unique.
    pub sku: String,

    /// Barcode (EAN-13, UPC-A, ...), unique when present.
    pub barcode: Option<String>,

    pub category: Option<String>,

    /// Selling price.
    #[ts(type = "string")]
    pub price: Money,

    /// Purchase cost.
    #[ts(type = "string | null")]
    pub cost: Option<Money>,

    /// Opaque currency label (`TRY`, `USD`).
    pub currency: String,

    pub supplier_id: Option<String>,

    /// Units currently in stock. A plain counter.
    pub quantity: i64,

    /// Reorder threshold; at or below this the product is low-stock.
    pub min_quantity: i64,

    /// Inactive products are hidden from supplier listings and metrics.
    pub is_active: bool,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Low-stock: current quantity at or below the configured minimum.
    #[inline]
    pub fn is_low_stock(&self) -> bool {
        self.quantity <= self.min_quantity
    }
}

// =============================================================================
// Customer
// =============================================================================

/// A customer invoices can be issued to.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Supplier
// =============================================================================

/// A supplier products are bought from.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Supplier {
    pub id: String,
    pub name: String,
    pub contact_person: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub tax_number: Option<String>,
    /// Free text, e.g. "Net 30".
    pub payment_terms: Option<String>,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Transaction Status
// =============================================================================

/// The status of a sales transaction.
///
/// ```text
/// pending ──► completed
///    │            │
///    └────► cancelled (counted as a return on the dashboard)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    /// Paid and final. Counts toward sales totals.
    #[default]
    Completed,
    /// Issued but not yet settled.
    Pending,
    /// Voided or returned.
    Cancelled,
}

impl TransactionStatus {
    /// Lowercase name as stored in the database.
    pub const fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Completed => "completed",
            TransactionStatus::Pending => "pending",
            TransactionStatus::Cancelled => "cancelled",
        }
    }
}

// =============================================================================
// Transaction (Invoice)
// =============================================================================

/// A sales transaction (invoice).
///
/// `total = subtotal - discount + tax`, always recomputed server side.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    /// `INV-001`, `INV-002`, ...
    pub transaction_number: String,
    pub customer_id: Option<String>,
    /// Free text; filled from the customer record or typed in for walk-ins.
    pub customer_name: String,
    #[ts(type = "string")]
    pub subtotal: Money,
    #[ts(type = "string")]
    pub discount: Money,
    #[ts(type = "string")]
    pub tax: Money,
    #[ts(type = "string")]
    pub total: Money,
    pub status: TransactionStatus,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Transaction Item
// =============================================================================

/// A line item on an invoice.
/// Uses the snapshot pattern: name and unit price are frozen at sale time.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TransactionItem {
    pub id: String,
    pub transaction_id: String,
    pub product_id: String,
    /// Product name at time of sale (frozen).
    pub product_name: String,
    pub quantity: i64,
    /// Unit price at time of sale (frozen).
    #[ts(type = "string")]
    pub price: Money,
    /// `price × quantity`.
    #[ts(type = "string")]
    pub total: Money,
}

/// A transaction together with its line items.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TransactionWithItems {
    #[serde(flatten)]
    #[ts(flatten)]
    pub transaction: Transaction,
    pub items: Vec<TransactionItem>,
}

// =============================================================================
// Dashboard
// =============================================================================

/// Aggregate numbers for the dashboard.
///
/// "This month" is the UTC calendar month containing the moment the
/// metrics were computed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMetrics {
    /// Sum of completed transaction totals this month.
    #[ts(type = "string")]
    pub total_sales: Money,
    /// All transactions ever recorded.
    pub total_orders: i64,
    pub active_products: i64,
    /// Customers created this month.
    pub new_customers: i64,
    pub low_stock_count: i64,
    pub pending_orders: i64,
    /// Distinct customers on transactions this month.
    pub active_customers: i64,
    /// Cancelled transactions.
    pub returns: i64,
}

// =============================================================================
// Unit Tests
// =============================================================================
