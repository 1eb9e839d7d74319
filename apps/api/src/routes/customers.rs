//! Customer endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use stockroom_core::{Customer, CustomerPatch, NewCustomer};

use super::SearchParams;
use crate::error::{ApiError, ApiJson, ApiQuery, ApiResult};
use crate::AppState;

pub async fn list(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<SearchParams>,
) -> ApiResult<Json<Vec<Customer>>> {
    let query = params.query()?;
    let customers = state.db.customers().list(query.as_deref()).await?;
    Ok(Json(customers))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Customer>> {
    state
        .db
        .customers()
        .get_by_id(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Customer", &id))
}

pub async fn create(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NewCustomer>,
) -> ApiResult<(StatusCode, Json<Customer>)> {
    let customer = state.db.customers().create(input).await?;
    Ok((StatusCode::CREATED, Json(customer)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(patch): ApiJson<CustomerPatch>,
) -> ApiResult<Json<Customer>> {
    let customer = state.db.customers().update(&id, patch).await?;
    Ok(Json(customer))
}

/// Customers referenced by an invoice cannot be deleted.
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state
        .db
        .customers()
        .delete(&id)
        .await
        .map_err(|e| ApiError::from_delete(e, "Customer"))?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use crate::test_support::*;
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_customer_crud() {
        let (app, _db) = app().await;

        let (status, created) = post(
            &app,
            "/api/customers",
            json!({ "name": "Acme Market", "email": "orders@acme.example", "phone": "" }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert!(created["phone"].is_null());
        let id = created["id"].as_str().unwrap().to_string();

        post(&app, "/api/customers", json!({ "name": "Corner Shop" })).await;

        let (_, found) = get(&app, "/api/customers?search=ACME").await;
        assert_eq!(found.as_array().unwrap().len(), 1);

        // Newest first
        let (_, all) = get(&app, "/api/customers").await;
        assert_eq!(all[0]["name"], "Corner Shop");

        let (status, updated) = put(
            &app,
            &format!("/api/customers/{id}"),
            json!({ "address": "Kadıköy, İstanbul" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["address"], "Kadıköy, İstanbul");
        assert_eq!(updated["email"], "orders@acme.example");

        let (status, _) = delete(&app, &format!("/api/customers/{id}")).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = get(&app, &format!("/api/customers/{id}")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_invalid_customer() {
        let (app, _db) = app().await;

        let (status, body) = post(&app, "/api/customers", json!({ "name": "   " })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");

        let (status, _) = post(
            &app,
            "/api/customers",
            json!({ "name": "Bad Mail", "email": "not-an-email" }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_customer_on_invoice_cannot_be_deleted() {
        let (app, _db) = app().await;
        let product = create_product(&app, "OIL", "10.00", 5).await;
        let (_, customer) = post(&app, "/api/customers", json!({ "name": "Acme" })).await;

        let (status, _) = post(
            &app,
            "/api/transactions",
            json!({
                "transaction": { "customerId": customer["id"] },
                "items": [{ "productId": product["id"], "quantity": 1, "price": "10.00" }]
            }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let id = customer["id"].as_str().unwrap();
        let (status, body) = delete(&app, &format!("/api/customers/{id}")).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "CONFLICT");
    }
}
