//! # Dashboard Repository
//!
//! Aggregate numbers for the dashboard, computed on demand.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  metrics(now)                     month = "2026-10" (UTC, from now)     │
//! │                                                                         │
//! │  totalSales      Σ total  WHERE status = completed AND month            │
//! │  totalOrders     COUNT(*) transactions                                  │
//! │  activeProducts  COUNT(*) products WHERE is_active                      │
//! │  newCustomers    COUNT(*) customers WHERE month                         │
//! │  lowStockCount   COUNT(*) products WHERE quantity <= min_quantity       │
//! │  pendingOrders   COUNT(*) transactions WHERE status = pending           │
//! │  activeCustomers COUNT(DISTINCT customer_id) WHERE month                │
//! │  returns         COUNT(*) transactions WHERE status = cancelled         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Timestamps are stored as RFC 3339 text in UTC, so the first seven
//! characters are the calendar month.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use stockroom_core::{DashboardMetrics, Money, TransactionStatus};

/// Repository for dashboard aggregates.
#[derive(Debug, Clone)]
pub struct DashboardRepository {
    pool: SqlitePool,
}

impl DashboardRepository {
    /// Creates a new DashboardRepository.
    pub fn new(pool: SqlitePool) -> Self {
        DashboardRepository { pool }
    }

    /// Computes the dashboard metrics for the month containing `now`.
    pub async fn metrics(&self, now: DateTime<Utc>) -> DbResult<DashboardMetrics> {
        let month = now.format("%Y-%m").to_string();

        debug!(month = %month, "Computing dashboard metrics");

        let (total_sales, total_orders, pending_orders, active_customers, returns): (
            i64,
            i64,
            i64,
            i64,
            i64,
        ) = sqlx::query_as(
            r#"
            SELECT
                COALESCE(SUM(CASE WHEN status = ?2 AND SUBSTR(created_at, 1, 7) = ?1
                                  THEN total END), 0),
                COUNT(*),
                COUNT(CASE WHEN status = ?3 THEN 1 END),
                COUNT(DISTINCT CASE WHEN SUBSTR(created_at, 1, 7) = ?1
                                    THEN customer_id END),
                COUNT(CASE WHEN status = ?4 THEN 1 END)
            FROM transactions
            "#,
        )
        .bind(&month)
        .bind(TransactionStatus::Completed)
        .bind(TransactionStatus::Pending)
        .bind(TransactionStatus::Cancelled)
        .fetch_one(&self.pool)
        .await?;

        let (active_products, low_stock_count): (i64, i64) = sqlx::query_as(
            r#"
            SELECT
                COUNT(CASE WHEN is_active = 1 THEN 1 END),
                COUNT(CASE WHEN quantity <= min_quantity THEN 1 END)
            FROM products
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        let new_customers: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM customers WHERE SUBSTR(created_at, 1, 7) = ?1",
        )
        .bind(&month)
        .fetch_one(&self.pool)
        .await?;

        Ok(DashboardMetrics {
            total_sales: Money::from_cents(total_sales),
            total_orders,
            active_products,
            new_customers,
            low_stock_count,
            pending_orders,
            active_customers,
            returns,
        })
    }
}
