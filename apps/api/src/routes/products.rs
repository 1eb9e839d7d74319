//! Product endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use stockroom_core::{NewProduct, Product, ProductPatch};

use super::SearchParams;
use crate::error::{ApiError, ApiJson, ApiQuery, ApiResult};
use crate::AppState;

/// `GET /api/products?search=` matches name, SKU or barcode.
pub async fn list(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<SearchParams>,
) -> ApiResult<Json<Vec<Product>>> {
    let query = params.query()?;
    let products = state.db.products().list(query.as_deref()).await?;
    Ok(Json(products))
}

pub async fn low_stock(State(state): State<AppState>) -> ApiResult<Json<Vec<Product>>> {
    let products = state.db.products().low_stock().await?;
    Ok(Json(products))
}

pub async fn by_barcode(
    State(state): State<AppState>,
    Path(barcode): Path<String>,
) -> ApiResult<Json<Product>> {
    state
        .db
        .products()
        .get_by_barcode(&barcode)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Product with barcode", &barcode))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Product>> {
    state
        .db
        .products()
        .get_by_id(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Product", &id))
}

pub async fn create(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NewProduct>,
) -> ApiResult<(StatusCode, Json<Product>)> {
    let product = state.db.products().create(input).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(patch): ApiJson<ProductPatch>,
) -> ApiResult<Json<Product>> {
    let product = state.db.products().update(&id, patch).await?;
    Ok(Json(product))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state
        .db
        .products()
        .delete(&id)
        .await
        .map_err(|e| ApiError::from_delete(e, "Product"))?;
    Ok(StatusCode::NO_CONTENT)
}
