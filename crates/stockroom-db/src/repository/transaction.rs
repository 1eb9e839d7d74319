//! # Transaction Repository
//!
//! Database operations for sales transactions (invoices) and their line
//! items.
//!
//! ## Invoice Creation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       create(draft)                                     │
//! │                                                                         │
//! │  BEGIN IMMEDIATE                         (takes the write lock)         │
//! │    ├── every product id exists?            no → ProductNotFound        │
//! │    ├── fill blank product / customer names from their rows             │
//! │    ├── MAX(INV-NNN) + 1                    → INV-042                    │
//! │    ├── INSERT transactions                                             │
//! │    └── INSERT transaction_items × N                                    │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  Any failure rolls the whole invoice back: there is never a header     │
//! │  without its lines.                                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The write lock is taken before the number is read, so concurrent creates
//! on one database file wait for each other (up to the busy timeout) rather
//! than compute the same number. The UNIQUE index on the number still
//! rejects a duplicate from any other writer, which the caller sees as a
//! conflict.

use chrono::Utc;
use sqlx::{SqliteExecutor, SqlitePool};
use tracing::{debug, info, warn};

use super::{generate_id, like_pattern};
use crate::error::{DbError, DbResult};
use stockroom_core::invoice::next_invoice_number;
use stockroom_core::{
    CoreError, InvoiceDraft, Transaction, TransactionItem, TransactionPatch,
    TransactionWithItems, ValidationError,
};

const SELECT_TRANSACTION: &str = r#"
    SELECT
        id, transaction_number, customer_id, customer_name,
        subtotal, discount, tax, total, status,
        created_at, updated_at
    FROM transactions
"#;

/// Repository for transaction database operations.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    pool: SqlitePool,
}

impl TransactionRepository {
    /// Creates a new TransactionRepository.
    pub fn new(pool: SqlitePool) -> Self {
        TransactionRepository { pool }
    }

    /// Lists transactions newest first.
    ///
    /// ## Arguments
    /// * `limit` / `offset` - Paging, already validated by the caller
    /// * `search` - Optional substring of the invoice number
    pub async fn list(
        &self,
        limit: i64,
        offset: i64,
        search: Option<&str>,
    ) -> DbResult<Vec<Transaction>> {
        debug!(limit, offset, search = ?search, "Listing transactions");

        let sql = format!(
            r#"{SELECT_TRANSACTION}
            WHERE (?3 IS NULL OR transaction_number LIKE ?3 ESCAPE '\')
            ORDER BY created_at DESC, rowid DESC
            LIMIT ?1 OFFSET ?2"#
        );
        let transactions = sqlx::query_as::<_, Transaction>(&sql)
            .bind(limit)
            .bind(offset)
            .bind(search.map(like_pattern))
            .fetch_all(&self.pool)
            .await?;

        Ok(transactions)
    }

    /// Gets a transaction header by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Transaction>> {
        let sql = format!("{SELECT_TRANSACTION} WHERE id = ?1");
        let transaction = sqlx::query_as::<_, Transaction>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(transaction)
    }

    /// Gets the line items of a transaction, in the order they were entered.
    pub async fn get_items(&self, transaction_id: &str) -> DbResult<Vec<TransactionItem>> {
        let items = sqlx::query_as::<_, TransactionItem>(
            r#"
            SELECT id, transaction_id, product_id, product_name, quantity, price, total
            FROM transaction_items
            WHERE transaction_id = ?1
            ORDER BY rowid
            "#,
        )
        .bind(transaction_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Gets a transaction together with its line items.
    pub async fn get_with_items(&self, id: &str) -> DbResult<Option<TransactionWithItems>> {
        let Some(transaction) = self.get_by_id(id).await? else {
            return Ok(None);
        };
        let items = self.get_items(id).await?;

        Ok(Some(TransactionWithItems { transaction, items }))
    }

    /// Highest `INV-` sequence in use, `None` when there are no invoices.
    pub async fn last_invoice_sequence(&self) -> DbResult<Option<u64>> {
        max_invoice_sequence(&self.pool).await
    }

    /// Stores a validated invoice and its lines atomically.
    ///
    /// ## Errors
    /// * `DbError::Rule(ProductNotFound)` - A line references an unknown product
    /// * `DbError::Rule(Validation)` - No customer name could be determined
    /// * `DbError::UniqueViolation` - Lost a race for the invoice number
    pub async fn create(&self, mut draft: InvoiceDraft) -> DbResult<TransactionWithItems> {
        if let Some(claimed) = draft.claimed_total_mismatch() {
            warn!(
                claimed = %claimed,
                computed = %draft.totals.total,
                "Client invoice total differs from computed total; using computed"
            );
        }

        let mut tx = self.pool.begin_with("BEGIN IMMEDIATE").await?;

        for product_id in draft.product_ids() {
            let name: Option<String> =
                sqlx::query_scalar("SELECT name FROM products WHERE id = ?1")
                    .bind(&product_id)
                    .fetch_optional(&mut *tx)
                    .await?;

            match name {
                Some(name) => draft.fill_product_name(&product_id, &name),
                None => return Err(CoreError::ProductNotFound(product_id).into()),
            }
        }

        if draft.customer_name.is_none() {
            if let Some(customer_id) = &draft.customer_id {
                let name: Option<String> =
                    sqlx::query_scalar("SELECT name FROM customers WHERE id = ?1")
                        .bind(customer_id)
                        .fetch_optional(&mut *tx)
                        .await?;

                draft.customer_name = Some(name.ok_or_else(|| {
                    ValidationError::invalid("customerId", "customer does not exist")
                })?);
            }
        }

        let number = next_invoice_number(max_invoice_sequence(&mut *tx).await?);
        let (transaction, items) =
            draft.into_records(generate_id(), number, Utc::now(), generate_id)?;

        debug!(
            id = %transaction.id,
            number = %transaction.transaction_number,
            lines = items.len(),
            "Inserting invoice"
        );

        sqlx::query(
            r#"
            INSERT INTO transactions (
                id, transaction_number, customer_id, customer_name,
                subtotal, discount, tax, total, status,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&transaction.id)
        .bind(&transaction.transaction_number)
        .bind(&transaction.customer_id)
        .bind(&transaction.customer_name)
        .bind(transaction.subtotal)
        .bind(transaction.discount)
        .bind(transaction.tax)
        .bind(transaction.total)
        .bind(transaction.status)
        .bind(transaction.created_at)
        .bind(transaction.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| DbError::from(e).with_value(&transaction.transaction_number))?;

        for item in &items {
            sqlx::query(
                r#"
                INSERT INTO transaction_items (
                    id, transaction_id, product_id, product_name, quantity, price, total
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
            )
            .bind(&item.id)
            .bind(&item.transaction_id)
            .bind(&item.product_id)
            .bind(&item.product_name)
            .bind(item.quantity)
            .bind(item.price)
            .bind(item.total)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!(
            number = %transaction.transaction_number,
            total = %transaction.total,
            status = transaction.status.as_str(),
            "Invoice created"
        );

        Ok(TransactionWithItems { transaction, items })
    }

    /// Applies a partial update to the header and recomputes the total.
    pub async fn update(&self, id: &str, patch: TransactionPatch) -> DbResult<Transaction> {
        debug!(id = %id, "Updating transaction");

        let mut transaction = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Transaction", id))?;

        patch.apply(&mut transaction, Utc::now())?;

        let result = sqlx::query(
            r#"
            UPDATE transactions SET
                customer_id = ?2,
                customer_name = ?3,
                discount = ?4,
                tax = ?5,
                total = ?6,
                status = ?7,
                updated_at = ?8
            WHERE id = ?1
            "#,
        )
        .bind(&transaction.id)
        .bind(&transaction.customer_id)
        .bind(&transaction.customer_name)
        .bind(transaction.discount)
        .bind(transaction.tax)
        .bind(transaction.total)
        .bind(transaction.status)
        .bind(transaction.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Transaction", id));
        }

        Ok(transaction)
    }
}

async fn max_invoice_sequence<'e, E>(executor: E) -> DbResult<Option<u64>>
where
    E: SqliteExecutor<'e>,
{
    // Only all-digit suffixes: CAST would read "INV-12a" as 12.
    let max: Option<i64> = sqlx::query_scalar(
        r#"
        SELECT MAX(CAST(SUBSTR(transaction_number, 5) AS INTEGER))
        FROM transactions
        WHERE transaction_number GLOB 'INV-[0-9]*'
          AND SUBSTR(transaction_number, 5) NOT GLOB '*[^0-9]*'
        "#,
    )
    .fetch_one(executor)
    .await?;

    Ok(max.and_then(|m| u64::try_from(m).ok()))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use stockroom_core::{
        InvoiceRequest, Money, NewCustomer, NewProduct, Product, TransactionStatus,
    };

    async fn setup() -> (Database, Product, Product) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let oil = db
            .products()
            .create(NewProduct {
                name: "Olive Oil 1L".into(),
                sku: "OIL-1L".into(),
                price: Some(Money::from_cents(8990)),
                ..Default::default()
            })
            .await
            .unwrap();
        let bread = db
            .products()
            .create(NewProduct {
                name: "Bread".into(),
                sku: "BREAD".into(),
                price: Some(Money::from_cents(1250)),
                ..Default::default()
            })
            .await
            .unwrap();
        (db, oil, bread)
    }

    fn draft(json: serde_json::Value) -> InvoiceDraft {
        let request: InvoiceRequest = serde_json::from_value(json).unwrap();
        InvoiceDraft::from_request(request).unwrap()
    }

    fn simple(product: &Product, customer: &str) -> InvoiceDraft {
        draft(serde_json::json!({
            "transaction": { "customerName": customer },
            "items": [{ "productId": product.id, "quantity": 1, "price": "10.00" }]
        }))
    }

    #[tokio::test]
    async fn test_create_invoice_with_items() {
        let (db, oil, bread) = setup().await;
        let repo = db.transactions();

        let created = repo
            .create(draft(serde_json::json!({
                "transaction": {
                    "customerName": "Walk-in",
                    "discount": "5.00",
                    "tax": "18.00",
                    "total": "1.00"
                },
                "items": [
                    { "productId": oil.id, "quantity": 3, "price": "89.90" },
                    { "productId": bread.id, "productName": "Fresh Bread", "quantity": 2, "price": "12.50" }
                ]
            })))
            .await
            .unwrap();

        let tx = &created.transaction;
        assert_eq!(tx.transaction_number, "INV-001");
        assert_eq!(tx.subtotal, Money::from_cents(29_470));
        assert_eq!(tx.total, Money::from_cents(30_770));
        assert_eq!(tx.status, TransactionStatus::Completed);

        let stored = repo.get_with_items(&tx.id).await.unwrap().unwrap();
        assert_eq!(stored.items.len(), 2);
        assert_eq!(stored.items[0].product_name, "Olive Oil 1L");
        assert_eq!(stored.items[0].total, Money::from_cents(26_970));
        assert_eq!(stored.items[1].product_name, "Fresh Bread");
        assert_eq!(stored.transaction.total, Money::from_cents(30_770));
    }

    #[tokio::test]
    async fn test_invoice_numbers_are_sequential() {
        let (db, oil, _) = setup().await;
        let repo = db.transactions();

        assert_eq!(repo.last_invoice_sequence().await.unwrap(), None);

        let numbers: Vec<String> = {
            let mut out = Vec::new();
            for _ in 0..3 {
                let created = repo.create(simple(&oil, "Walk-in")).await.unwrap();
                out.push(created.transaction.transaction_number);
            }
            out
        };

        assert_eq!(numbers, vec!["INV-001", "INV-002", "INV-003"]);
        assert_eq!(repo.last_invoice_sequence().await.unwrap(), Some(3));
    }

    #[tokio::test]
    async fn test_numbering_continues_past_999() {
        let (db, oil, _) = setup().await;
        let repo = db.transactions();

        let seeded = repo.create(simple(&oil, "Walk-in")).await.unwrap();
        sqlx::query("UPDATE transactions SET transaction_number = 'INV-999' WHERE id = ?1")
            .bind(&seeded.transaction.id)
            .execute(db.pool())
            .await
            .unwrap();

        let next = repo.create(simple(&oil, "Walk-in")).await.unwrap();
        assert_eq!(next.transaction.transaction_number, "INV-1000");

        // Numeric, not lexicographic: INV-1000 > INV-999.
        let after = repo.create(simple(&oil, "Walk-in")).await.unwrap();
        assert_eq!(after.transaction.transaction_number, "INV-1001");
    }

    #[tokio::test]
    async fn test_non_numeric_numbers_ignored() {
        let (db, oil, _) = setup().await;
        let repo = db.transactions();

        let first = repo.create(simple(&oil, "Walk-in")).await.unwrap();
        let edited = repo.create(simple(&oil, "Walk-in")).await.unwrap();
        for (id, number) in [
            (&first.transaction.id, "INV-007"),
            (&edited.transaction.id, "INV-12a"),
        ] {
            sqlx::query("UPDATE transactions SET transaction_number = ?2 WHERE id = ?1")
                .bind(id)
                .bind(number)
                .execute(db.pool())
                .await
                .unwrap();
        }

        assert_eq!(repo.last_invoice_sequence().await.unwrap(), Some(7));
        let next = repo.create(simple(&oil, "Walk-in")).await.unwrap();
        assert_eq!(next.transaction.transaction_number, "INV-008");
    }

    #[tokio::test]
    async fn test_concurrent_creates_get_distinct_numbers() {
        let dir = tempfile::TempDir::new().unwrap();
        let db = Database::new(DbConfig::new(dir.path().join("stockroom.db")).max_connections(5))
            .await
            .unwrap();
        let oil = db
            .products()
            .create(NewProduct {
                name: "Olive Oil 1L".into(),
                sku: "OIL-1L".into(),
                price: Some(Money::from_cents(8990)),
                ..Default::default()
            })
            .await
            .unwrap();

        let handles: Vec<_> = (0..20)
            .map(|_| {
                let repo = db.transactions();
                let draft = simple(&oil, "Walk-in");
                tokio::spawn(async move { repo.create(draft).await })
            })
            .collect();

        let mut numbers = Vec::new();
        for handle in handles {
            let created = handle.await.unwrap().unwrap();
            numbers.push(created.transaction.transaction_number);
        }
        numbers.sort();
        numbers.dedup();

        assert_eq!(numbers.len(), 20);
        assert_eq!(numbers[0], "INV-001");
        assert_eq!(numbers[19], "INV-020");

        db.close().await;
    }

    #[tokio::test]
    async fn test_unknown_product_rolls_back() {
        let (db, oil, _) = setup().await;
        let repo = db.transactions();

        let err = repo
            .create(draft(serde_json::json!({
                "transaction": { "customerName": "Walk-in" },
                "items": [
                    { "productId": oil.id, "quantity": 1, "price": "1.00" },
                    { "productId": "does-not-exist", "quantity": 1, "price": "1.00" }
                ]
            })))
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::Rule(CoreError::ProductNotFound(_))));
        assert!(repo.list(10, 0, None).await.unwrap().is_empty());
        assert_eq!(repo.last_invoice_sequence().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_customer_name_filled_from_customer() {
        let (db, oil, _) = setup().await;
        let customer = db
            .customers()
            .create(NewCustomer {
                name: "Acme Market".into(),
                ..Default::default()
            })
            .await
            .unwrap();

        let created = db
            .transactions()
            .create(draft(serde_json::json!({
                "transaction": { "customerId": customer.id, "customerName": "" },
                "items": [{ "productId": oil.id, "quantity": 1, "price": "1.00" }]
            })))
            .await
            .unwrap();

        assert_eq!(created.transaction.customer_name, "Acme Market");
        assert_eq!(
            created.transaction.customer_id.as_deref(),
            Some(customer.id.as_str())
        );
    }

    #[tokio::test]
    async fn test_list_paging_and_search() {
        let (db, oil, _) = setup().await;
        let repo = db.transactions();

        for _ in 0..5 {
            repo.create(simple(&oil, "Walk-in")).await.unwrap();
        }

        let first = repo.list(2, 0, None).await.unwrap();
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].transaction_number, "INV-005");

        let last = repo.list(2, 4, None).await.unwrap();
        assert_eq!(last.len(), 1);
        assert_eq!(last[0].transaction_number, "INV-001");

        let found = repo.list(10, 0, Some("003")).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].transaction_number, "INV-003");
        assert!(repo.list(10, 0, Some("%")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_recomputes_total() {
        let (db, oil, _) = setup().await;
        let repo = db.transactions();

        let created = repo.create(simple(&oil, "Walk-in")).await.unwrap();

        let patch: TransactionPatch = serde_json::from_value(serde_json::json!({
            "status": "pending",
            "tax": "2.00",
            "customerName": "Acme"
        }))
        .unwrap();
        let updated = repo.update(&created.transaction.id, patch).await.unwrap();
        assert_eq!(updated.total, Money::from_cents(1200));
        assert_eq!(updated.status, TransactionStatus::Pending);

        let stored = repo.get_by_id(&created.transaction.id).await.unwrap().unwrap();
        assert_eq!(stored.customer_name, "Acme");
        assert_eq!(stored.total, Money::from_cents(1200));

        let too_much: TransactionPatch =
            serde_json::from_value(serde_json::json!({ "discount": "100.00" })).unwrap();
        assert!(matches!(
            repo.update(&created.transaction.id, too_much).await,
            Err(DbError::Rule(CoreError::NegativeTotal { .. }))
        ));

        assert!(matches!(
            repo.update("missing", TransactionPatch::default()).await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_referenced_product_cannot_be_deleted() {
        let (db, oil, _) = setup().await;
        db.transactions().create(simple(&oil, "Walk-in")).await.unwrap();

        assert!(matches!(
            db.products().delete(&oil.id).await,
            Err(DbError::ForeignKeyViolation { .. })
        ));
    }
}
