//! # Customer Repository
//!
//! Database operations for customers.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use super::{generate_id, like_pattern};
use crate::error::{DbError, DbResult};
use stockroom_core::{Customer, CustomerPatch, NewCustomer};

const SELECT_CUSTOMER: &str = r#"
    SELECT id, name, email, phone, address, is_active, created_at, updated_at
    FROM customers
"#;

/// Repository for customer database operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    /// Creates a new CustomerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Lists customers newest first, optionally filtered by a name substring.
    pub async fn list(&self, search: Option<&str>) -> DbResult<Vec<Customer>> {
        debug!(search = ?search, "Listing customers");

        let customers = match search {
            Some(query) => {
                let sql = format!(
                    r#"{SELECT_CUSTOMER}
                    WHERE name LIKE ?1 ESCAPE '\'
                    ORDER BY created_at DESC, rowid DESC"#
                );
                sqlx::query_as::<_, Customer>(&sql)
                    .bind(like_pattern(query))
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let sql = format!("{SELECT_CUSTOMER} ORDER BY created_at DESC, rowid DESC");
                sqlx::query_as::<_, Customer>(&sql)
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        Ok(customers)
    }

    /// Gets a customer by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Customer>> {
        let sql = format!("{SELECT_CUSTOMER} WHERE id = ?1");
        let customer = sqlx::query_as::<_, Customer>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(customer)
    }

    /// Validates and inserts a new customer.
    pub async fn create(&self, input: NewCustomer) -> DbResult<Customer> {
        let customer = input.into_customer(generate_id(), Utc::now())?;

        debug!(id = %customer.id, "Inserting customer");

        sqlx::query(
            r#"
            INSERT INTO customers (
                id, name, email, phone, address, is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&customer.id)
        .bind(&customer.name)
        .bind(&customer.email)
        .bind(&customer.phone)
        .bind(&customer.address)
        .bind(customer.is_active)
        .bind(customer.created_at)
        .bind(customer.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Applies a partial update.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - Customer doesn't exist
    pub async fn update(&self, id: &str, patch: CustomerPatch) -> DbResult<Customer> {
        debug!(id = %id, "Updating customer");

        let mut customer = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Customer", id))?;

        patch.apply(&mut customer, Utc::now())?;

        let result = sqlx::query(
            r#"
            UPDATE customers SET
                name = ?2,
                email = ?3,
                phone = ?4,
                address = ?5,
                is_active = ?6,
                updated_at = ?7
            WHERE id = ?1
            "#,
        )
        .bind(&customer.id)
        .bind(&customer.name)
        .bind(&customer.email)
        .bind(&customer.phone)
        .bind(&customer.address)
        .bind(customer.is_active)
        .bind(customer.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", id));
        }

        Ok(customer)
    }

    /// Deletes a customer.
    ///
    /// A customer referenced by an invoice cannot be deleted
    /// (`ForeignKeyViolation`).
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting customer");

        let result = sqlx::query("DELETE FROM customers WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", id));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    fn named(name: &str) -> NewCustomer {
        NewCustomer {
            name: name.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_crud_roundtrip() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.customers();

        let created = repo
            .create(NewCustomer {
                email: Some("ayse@example.com".into()),
                phone: Some("".into()),
                ..named("Ayşe Yılmaz")
            })
            .await
            .unwrap();
        assert_eq!(created.phone, None);

        let patch: CustomerPatch =
            serde_json::from_value(serde_json::json!({ "phone": "+90 555 000 0000" })).unwrap();
        let updated = repo.update(&created.id, patch).await.unwrap();
        assert_eq!(updated.phone.as_deref(), Some("+90 555 000 0000"));
        assert_eq!(updated.email.as_deref(), Some("ayse@example.com"));

        let stored = repo.get_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(stored.phone, updated.phone);

        repo.delete(&created.id).await.unwrap();
        assert!(repo.get_by_id(&created.id).await.unwrap().is_none());
        assert!(matches!(
            repo.update(&created.id, CustomerPatch::default()).await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_search_by_name() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.customers();

        repo.create(named("Acme Market")).await.unwrap();
        repo.create(named("Corner Shop")).await.unwrap();

        let found = repo.list(Some("acme")).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Acme Market");

        let all = repo.list(None).await.unwrap();
        assert_eq!(all[0].name, "Corner Shop");
    }

    #[tokio::test]
    async fn test_invalid_email_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let err = db
            .customers()
            .create(NewCustomer {
                email: Some("not-an-email".into()),
                ..named("X")
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Rule(_)));
    }
}
