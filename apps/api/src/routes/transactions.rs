//! # Transaction (Invoice) Endpoints
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  POST /api/transactions                                                 │
//! │                                                                         │
//! │  { transaction: {...}, items: [...] }                                   │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  InvoiceDraft::from_request    lines, totals, rules      → 400          │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  transactions().create(draft)  products, number, insert  → 400/409      │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  201 { ...transaction, items: [...] }                                   │
//! │                                                                         │
//! │  POST /api/transactions/preview stops after the first step.            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use stockroom_core::validation::{validate_page, validate_search_query};
use stockroom_core::{
    InvoiceDraft, InvoicePreview, InvoiceRequest, Transaction, TransactionPatch,
    TransactionWithItems, ValidationError,
};

use crate::error::{ApiError, ApiJson, ApiQuery, ApiResult};
use crate::AppState;

/// `?limit=&offset=&search=`
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub search: Option<String>,
}

/// `GET /api/transactions`, newest first.
pub async fn list(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<ListParams>,
) -> ApiResult<Json<Vec<Transaction>>> {
    let (limit, offset) = validate_page(
        params.limit,
        params.offset,
        state.config.default_page_size,
    )?;
    if limit > state.config.max_page_size {
        return Err(ValidationError::OutOfRange {
            field: "limit".to_string(),
            min: 1,
            max: state.config.max_page_size,
        }
        .into());
    }
    let search = validate_search_query(params.search.as_deref())?;

    let transactions = state
        .db
        .transactions()
        .list(limit, offset, search.as_deref())
        .await?;
    Ok(Json(transactions))
}

/// `GET /api/transactions/{id}` with its line items.
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<TransactionWithItems>> {
    state
        .db
        .transactions()
        .get_with_items(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Transaction", &id))
}

/// `POST /api/transactions`. Totals are recomputed server-side.
pub async fn create(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<InvoiceRequest>,
) -> ApiResult<(StatusCode, Json<TransactionWithItems>)> {
    let draft = InvoiceDraft::from_request(request)?;
    let created = state.db.transactions().create(draft).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `POST /api/transactions/preview`. Nothing is stored.
pub async fn preview(ApiJson(request): ApiJson<InvoiceRequest>) -> ApiResult<Json<InvoicePreview>> {
    let draft = InvoiceDraft::from_request(request)?;
    Ok(Json(draft.preview()))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(patch): ApiJson<TransactionPatch>,
) -> ApiResult<Json<Transaction>> {
    let transaction = state.db.transactions().update(&id, patch).await?;
    Ok(Json(transaction))
}
