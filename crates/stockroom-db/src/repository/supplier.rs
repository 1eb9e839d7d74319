//! # Supplier Repository
//!
//! Database operations for suppliers. The products a supplier delivers are
//! listed through [`ProductRepository::list_by_supplier`](super::product::ProductRepository::list_by_supplier).

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use super::{generate_id, like_pattern};
use crate::error::{DbError, DbResult};
use stockroom_core::{NewSupplier, Supplier, SupplierPatch};

const SELECT_SUPPLIER: &str = r#"
    SELECT
        id, name, contact_person, email, phone, address,
        tax_number, payment_terms, is_active, created_at, updated_at
    FROM suppliers
"#;

/// Repository for supplier database operations.
#[derive(Debug, Clone)]
pub struct SupplierRepository {
    pool: SqlitePool,
}

impl SupplierRepository {
    /// Creates a new SupplierRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SupplierRepository { pool }
    }

    /// Lists suppliers newest first, optionally filtered by a name substring.
    pub async fn list(&self, search: Option<&str>) -> DbResult<Vec<Supplier>> {
        debug!(search = ?search, "Listing suppliers");

        let suppliers = match search {
            Some(query) => {
                let sql = format!(
                    r#"{SELECT_SUPPLIER}
                    WHERE name LIKE ?1 ESCAPE '\'
                    ORDER BY created_at DESC, rowid DESC"#
                );
                sqlx::query_as::<_, Supplier>(&sql)
                    .bind(like_pattern(query))
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let sql = format!("{SELECT_SUPPLIER} ORDER BY created_at DESC, rowid DESC");
                sqlx::query_as::<_, Supplier>(&sql)
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        Ok(suppliers)
    }

    /// Gets a supplier by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Supplier>> {
        let sql = format!("{SELECT_SUPPLIER} WHERE id = ?1");
        let supplier = sqlx::query_as::<_, Supplier>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(supplier)
    }

    /// Validates and inserts a new supplier.
    pub async fn create(&self, input: NewSupplier) -> DbResult<Supplier> {
        let supplier = input.into_supplier(generate_id(), Utc::now())?;

        debug!(id = %supplier.id, "Inserting supplier");

        sqlx::query(
            r#"
            INSERT INTO suppliers (
                id, name, contact_person, email, phone, address,
                tax_number, payment_terms, is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&supplier.id)
        .bind(&supplier.name)
        .bind(&supplier.contact_person)
        .bind(&supplier.email)
        .bind(&supplier.phone)
        .bind(&supplier.address)
        .bind(&supplier.tax_number)
        .bind(&supplier.payment_terms)
        .bind(supplier.is_active)
        .bind(supplier.created_at)
        .bind(supplier.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(supplier)
    }

    /// Applies a partial update.
    pub async fn update(&self, id: &str, patch: SupplierPatch) -> DbResult<Supplier> {
        debug!(id = %id, "Updating supplier");

        let mut supplier = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Supplier", id))?;

        patch.apply(&mut supplier, Utc::now())?;

        let result = sqlx::query(
            r#"
            UPDATE suppliers SET
                name = ?2,
                contact_person = ?3,
                email = ?4,
                phone = ?5,
                address = ?6,
                tax_number = ?7,
                payment_terms = ?8,
                is_active = ?9,
                updated_at = ?10
            WHERE id = ?1
            "#,
        )
        .bind(&supplier.id)
        .bind(&supplier.name)
        .bind(&supplier.contact_person)
        .bind(&supplier.email)
        .bind(&supplier.phone)
        .bind(&supplier.address)
        .bind(&supplier.tax_number)
        .bind(&supplier.payment_terms)
        .bind(supplier.is_active)
        .bind(supplier.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Supplier", id));
        }

        Ok(supplier)
    }

    /// Deletes a supplier. Fails with `ForeignKeyViolation` while products
    /// still reference it.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting supplier");

        let result = sqlx::query("DELETE FROM suppliers WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Supplier", id));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use stockroom_core::{Money, NewProduct};

    fn named(name: &str) -> NewSupplier {
        NewSupplier {
            name: name.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_update_search() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.suppliers();

        let supplier = repo
            .create(NewSupplier {
                payment_terms: Some("Net 30".into()),
                ..named("Anadolu Gıda")
            })
            .await
            .unwrap();
        repo.create(named("Ege Zeytin")).await.unwrap();

        let patch: SupplierPatch = serde_json::from_value(serde_json::json!({
            "contactPerson": "Mehmet Demir",
            "paymentTerms": null
        }))
        .unwrap();
        let updated = repo.update(&supplier.id, patch).await.unwrap();
        assert_eq!(updated.contact_person.as_deref(), Some("Mehmet Demir"));
        assert_eq!(updated.payment_terms, None);

        let found = repo.list(Some("ZEYTIN")).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Ege Zeytin");
        assert_eq!(repo.list(None).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_delete_referenced_supplier_fails() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let supplier = db.suppliers().create(named("Acme")).await.unwrap();

        db.products()
            .create(NewProduct {
                name: "Widget".into(),
                sku: "W-1".into(),
                price: Some(Money::from_cents(100)),
                supplier_id: Some(supplier.id.clone()),
                ..Default::default()
            })
            .await
            .unwrap();

        assert!(matches!(
            db.suppliers().delete(&supplier.id).await,
            Err(DbError::ForeignKeyViolation { .. })
        ));
        assert!(matches!(
            db.suppliers().delete("missing").await,
            Err(DbError::NotFound { .. })
        ));
    }
}
