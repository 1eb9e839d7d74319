//! # REST Routes
//!
//! One module per resource, each handler a thin wrapper around a single
//! repository call.
//!
//! ## Route Table
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  GET    /api/health                      health                         │
//! │  GET    /api/dashboard/metrics           dashboard                      │
//! │                                                                         │
//! │  GET    /api/products?search=            list                           │
//! │  POST   /api/products                    create        201              │
//! │  GET    /api/products/low-stock          quantity <= minQuantity        │
//! │  GET    /api/products/barcode/{barcode}  scanner lookup                 │
//! │  GET    /api/products/{id}                                              │
//! │  PUT    /api/products/{id}               partial update                 │
//! │  DELETE /api/products/{id}                             204              │
//! │                                                                         │
//! │  /api/customers[/{id}]                   same shape as products         │
//! │  /api/suppliers[/{id}]                   same shape as products         │
//! │  GET    /api/suppliers/{id}/products     active products of supplier    │
//! │                                                                         │
//! │  GET    /api/transactions?limit=&offset=&search=                        │
//! │  POST   /api/transactions                {transaction, items}   201     │
//! │  POST   /api/transactions/preview        totals only, nothing stored    │
//! │  GET    /api/transactions/{id}           header + items                 │
//! │  PUT    /api/transactions/{id}           status, customer, discount, tax│
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod customers;
pub mod dashboard;
pub mod health;
pub mod products;
pub mod suppliers;
pub mod transactions;

use axum::http::Uri;
use axum::routing::{get, post};
use axum::Router;
use serde::Deserialize;
use stockroom_core::validation::validate_search_query;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Routes mounted under `/api`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/dashboard/metrics", get(dashboard::metrics))
        // Products
        .route("/products", get(products::list).post(products::create))
        .route("/products/low-stock", get(products::low_stock))
        .route("/products/barcode/{barcode}", get(products::by_barcode))
        .route(
            "/products/{id}",
            get(products::get).put(products::update).delete(products::delete),
        )
        // Customers
        .route("/customers", get(customers::list).post(customers::create))
        .route(
            "/customers/{id}",
            get(customers::get).put(customers::update).delete(customers::delete),
        )
        // Suppliers
        .route("/suppliers", get(suppliers::list).post(suppliers::create))
        .route(
            "/suppliers/{id}",
            get(suppliers::get).put(suppliers::update).delete(suppliers::delete),
        )
        .route("/suppliers/{id}/products", get(suppliers::products))
        // Transactions
        .route(
            "/transactions",
            get(transactions::list).post(transactions::create),
        )
        .route("/transactions/preview", post(transactions::preview))
        .route(
            "/transactions/{id}",
            get(transactions::get).put(transactions::update),
        )
}

/// Fallback for paths no route matches.
pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::not_found("Route", uri.path())
}

/// `?search=` on list endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub search: Option<String>,
}

impl SearchParams {
    /// Trimmed query, `None` when blank.
    pub fn query(&self) -> ApiResult<Option<String>> {
        Ok(validate_search_query(self.search.as_deref())?)
    }
}
