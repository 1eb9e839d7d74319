//! Supplier endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use stockroom_core::{NewSupplier, Product, Supplier, SupplierPatch};

use super::SearchParams;
use crate::error::{ApiError, ApiJson, ApiQuery, ApiResult};
use crate::AppState;

pub async fn list(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<SearchParams>,
) -> ApiResult<Json<Vec<Supplier>>> {
    let query = params.query()?;
    let suppliers = state.db.suppliers().list(query.as_deref()).await?;
    Ok(Json(suppliers))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Supplier>> {
    state
        .db
        .suppliers()
        .get_by_id(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Supplier", &id))
}

pub async fn create(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NewSupplier>,
) -> ApiResult<(StatusCode, Json<Supplier>)> {
    let supplier = state.db.suppliers().create(input).await?;
    Ok((StatusCode::CREATED, Json(supplier)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(patch): ApiJson<SupplierPatch>,
) -> ApiResult<Json<Supplier>> {
    let supplier = state.db.suppliers().update(&id, patch).await?;
    Ok(Json(supplier))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state
        .db
        .suppliers()
        .delete(&id)
        .await
        .map_err(|e| ApiError::from_delete(e, "Supplier"))?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /api/suppliers/{id}/products`: active products, newest first.
/// An unknown supplier gives an empty list.
pub async fn products(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<Product>>> {
    let products = state.db.products().list_by_supplier(&id).await?;
    Ok(Json(products))
}

#[cfg(test)]
mod tests {
    use crate::test_support::*;
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_supplier_products() {
        let (app, _db) = app().await;

        let (status, supplier) = post(
            &app,
            "/api/suppliers",
            json!({ "name": "Anadolu Gıda", "paymentTerms": "Net 30" }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(supplier["paymentTerms"], "Net 30");
        let id = supplier["id"].as_str().unwrap().to_string();

        for (sku, name, active) in [("B", "Bulgur", true), ("Z", "Old", false), ("A", "Ayran", true)] {
            let (status, _) = post(
                &app,
                "/api/products",
                json!({
                    "name": name,
                    "sku": sku,
                    "price": "1.00",
                    "supplierId": id,
                    "isActive": active
                }),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let (status, products) = get(&app, &format!("/api/suppliers/{id}/products")).await;
        assert_eq!(status, StatusCode::OK);
        let names: Vec<&str> = products
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["name"].as_str().unwrap())
            .collect();
        // Newest first; the inactive one is left out
        assert_eq!(names, vec!["Ayran", "Bulgur"]);

        let (status, none) = get(&app, "/api/suppliers/missing/products").await;
        assert_eq!(status, StatusCode::OK);
        assert!(none.as_array().unwrap().is_empty());

        // Still referenced by products
        let (status, _) = delete(&app, &format!("/api/suppliers/{id}")).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_supplier_update_and_search() {
        let (app, _db) = app().await;
        let (_, supplier) = post(&app, "/api/suppliers", json!({ "name": "Ege Zeytin" })).await;
        let id = supplier["id"].as_str().unwrap();

        let (status, updated) = put(
            &app,
            &format!("/api/suppliers/{id}"),
            json!({ "contactPerson": "Zeynep Kaya", "taxNumber": "1234567890" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["contactPerson"], "Zeynep Kaya");

        let (_, found) = get(&app, "/api/suppliers?search=zeytin").await;
        assert_eq!(found.as_array().unwrap().len(), 1);

        let (status, _) = delete(&app, &format!("/api/suppliers/{id}")).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }
}
