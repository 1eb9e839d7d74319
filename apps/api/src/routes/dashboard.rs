//! Dashboard metrics.

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use stockroom_core::DashboardMetrics;

use crate::error::ApiResult;
use crate::AppState;

/// `GET /api/dashboard/metrics` for the current calendar month (UTC).
pub async fn metrics(State(state): State<AppState>) -> ApiResult<Json<DashboardMetrics>> {
    let metrics = state.db.dashboard().metrics(Utc::now()).await?;
    Ok(Json(metrics))
}

#[cfg(test)]
mod tests {
    use crate::test_support::*;
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_metrics() {
        let (app, _db) = app().await;

        let (status, empty) = get(&app, "/api/dashboard/metrics").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(empty["totalSales"], "0.00");
        assert_eq!(empty["totalOrders"], 0);

        let product = create_product(&app, "OIL", "10.00", 2).await;
        let (status, _) = post(
            &app,
            "/api/transactions",
            json!({
                "transaction": { "customerName": "Walk-in" },
                "items": [{ "productId": product["id"], "quantity": 3, "price": "10.00" }]
            }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (_, metrics) = get(&app, "/api/dashboard/metrics").await;
        assert_eq!(metrics["totalSales"], "30.00");
        assert_eq!(metrics["totalOrders"], 1);
        assert_eq!(metrics["activeProducts"], 1);
        assert_eq!(metrics["lowStockCount"], 1);
        assert_eq!(metrics["pendingOrders"], 0);
    }
}
