//! # Product Repository
//!
//! Database operations for products.
//!
//! ## Key Operations
//! - Substring search across name, SKU and barcode
//! - CRUD operations
//! - Low-stock listing and supplier catalogue
//!
//! ## Search
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  User types: "oil"                                                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  name LIKE '%oil%' OR sku LIKE '%oil%' OR barcode LIKE '%oil%'          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  OIL-1L   | Olive Oil 1L      | 8690000000001  ← MATCH (name, sku)      │
//! │  OIL-5L   | Olive Oil 5L      | 8690000000002  ← MATCH                  │
//! │  RICE-1K  | Baldo Rice 1kg    | 8690000000003                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Newest first                                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use super::{generate_id, like_pattern};
use crate::error::{DbError, DbResult};
use stockroom_core::{NewProduct, Product, ProductPatch};

const SELECT_PRODUCT: &str = r#"
    SELECT
        id, name, description, sku, barcode, category,
        price, cost, currency, supplier_id,
        quantity, min_quantity, is_active,
        created_at, updated_at
    FROM products
"#;

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool);
///
/// let results = repo.list(Some("oil")).await?;
/// let product = repo.get_by_id("uuid-here").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists products, newest first.
    ///
    /// ## Arguments
    /// * `search` - Optional substring matched against name, SKU and barcode
    pub async fn list(&self, search: Option<&str>) -> DbResult<Vec<Product>> {
        debug!(search = ?search, "Listing products");

        let products = match search {
            Some(query) => {
                let sql = format!(
                    r#"{SELECT_PRODUCT}
                    WHERE name LIKE ?1 ESCAPE '\'
                       OR sku LIKE ?1 ESCAPE '\'
                       OR barcode LIKE ?1 ESCAPE '\'
                    ORDER BY created_at DESC, rowid DESC"#
                );
                sqlx::query_as::<_, Product>(&sql)
                    .bind(like_pattern(query))
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let sql = format!("{SELECT_PRODUCT} ORDER BY created_at DESC, rowid DESC");
                sqlx::query_as::<_, Product>(&sql)
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        debug!(count = products.len(), "Listed products");
        Ok(products)
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let sql = format!("{SELECT_PRODUCT} WHERE id = ?1");
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Gets a product by its barcode (exact match, scanner input).
    pub async fn get_by_barcode(&self, barcode: &str) -> DbResult<Option<Product>> {
        let sql = format!("{SELECT_PRODUCT} WHERE barcode = ?1");
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(barcode.trim())
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Validates and inserts a new product.
    ///
    /// ## Returns
    /// * `Ok(Product)` - Stored product with generated id and timestamps
    /// * `Err(DbError::Rule)` - Input failed validation
    /// * `Err(DbError::UniqueViolation)` - SKU or barcode already exists
    /// * `Err(DbError::ForeignKeyViolation)` - Unknown supplier
    pub async fn create(&self, input: NewProduct) -> DbResult<Product> {
        let product = input.into_product(generate_id(), Utc::now())?;
        self.insert(&product).await?;
        Ok(product)
    }

    /// Inserts a fully built product (id and timestamps already set).
    pub async fn insert(&self, product: &Product) -> DbResult<()> {
        debug!(sku = %product.sku, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, name, description, sku, barcode, category,
                price, cost, currency, supplier_id,
                quantity, min_quantity, is_active,
                created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6,
                ?7, ?8, ?9, ?10,
                ?11, ?12, ?13,
                ?14, ?15
            )
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(&product.sku)
        .bind(&product.barcode)
        .bind(&product.category)
        .bind(product.price)
        .bind(product.cost)
        .bind(&product.currency)
        .bind(&product.supplier_id)
        .bind(product.quantity)
        .bind(product.min_quantity)
        .bind(product.is_active)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| unique_value(e.into(), product))?;

        Ok(())
    }

    /// Applies a partial update.
    ///
    /// ## Returns
    /// * `Ok(Product)` - The product after the update
    /// * `Err(DbError::NotFound)` - Product doesn't exist
    pub async fn update(&self, id: &str, patch: ProductPatch) -> DbResult<Product> {
        debug!(id = %id, "Updating product");

        let mut product = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))?;

        patch.apply(&mut product, Utc::now())?;

        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = ?2,
                description = ?3,
                sku = ?4,
                barcode = ?5,
                category = ?6,
                price = ?7,
                cost = ?8,
                currency = ?9,
                supplier_id = ?10,
                quantity = ?11,
                min_quantity = ?12,
                is_active = ?13,
                updated_at = ?14
            WHERE id = ?1
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(&product.sku)
        .bind(&product.barcode)
        .bind(&product.category)
        .bind(product.price)
        .bind(product.cost)
        .bind(&product.currency)
        .bind(&product.supplier_id)
        .bind(product.quantity)
        .bind(product.min_quantity)
        .bind(product.is_active)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| unique_value(e.into(), &product))?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(product)
    }

    /// Deletes a product.
    ///
    /// Products referenced by an invoice line cannot be deleted
    /// (`ForeignKeyViolation`); deactivate them instead.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Products at or below their reorder threshold, emptiest first.
    pub async fn low_stock(&self) -> DbResult<Vec<Product>> {
        let sql = format!(
            "{SELECT_PRODUCT} WHERE quantity <= min_quantity ORDER BY quantity ASC, name ASC"
        );
        let products = sqlx::query_as::<_, Product>(&sql)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = products.len(), "Low stock products");
        Ok(products)
    }

    /// Active products bought from a supplier, newest first.
    ///
    /// An unknown supplier simply has no products.
    pub async fn list_by_supplier(&self, supplier_id: &str) -> DbResult<Vec<Product>> {
        let sql = format!(
            r#"{SELECT_PRODUCT}
            WHERE supplier_id = ?1 AND is_active = 1
            ORDER BY created_at DESC, rowid DESC"#
        );
        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(supplier_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    /// Counts active products.
    pub async fn count_active(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE is_active = 1")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Fills in which value collided on a UNIQUE violation.
fn unique_value(err: DbError, product: &Product) -> DbError {
    let value = match &err {
        DbError::UniqueViolation { field, .. } if field == "barcode" => {
            product.barcode.clone().unwrap_or_default()
        }
        DbError::UniqueViolation { .. } => product.sku.clone(),
        _ => return err,
    };
    err.with_value(value)
}

// =============================================================================
// Unit Tests
// =============================================================================
