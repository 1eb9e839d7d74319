//! # User Repository
//!
//! Back-office user profiles. Users are created or refreshed by the identity
//! layer in front of the API (`upsert` on every login); nothing here deals
//! with credentials.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use stockroom_core::{UpsertUser, User};

/// Repository for user database operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Creates a new UserRepository.
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Gets a user by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT
                id, username, email, first_name, last_name, profile_image_url,
                role, is_active, created_at, updated_at
            FROM users
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Inserts the user, or refreshes the profile of an existing one.
    ///
    /// `created_at` and `role` of an existing user are preserved; the role
    /// is only changed when the input names one explicitly.
    pub async fn upsert(&self, input: UpsertUser) -> DbResult<User> {
        let explicit_role = input.role;
        let user = input.into_user(Utc::now())?;

        debug!(id = %user.id, "Upserting user");

        let stored = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (
                id, username, email, first_name, last_name, profile_image_url,
                role, is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            ON CONFLICT(id) DO UPDATE SET
                username = excluded.username,
                email = excluded.email,
                first_name = excluded.first_name,
                last_name = excluded.last_name,
                profile_image_url = excluded.profile_image_url,
                role = CASE WHEN ?11 THEN excluded.role ELSE users.role END,
                updated_at = excluded.updated_at
            RETURNING
                id, username, email, first_name, last_name, profile_image_url,
                role, is_active, created_at, updated_at
            "#,
        )
        .bind(&user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.profile_image_url)
        .bind(user.role)
        .bind(user.is_active)
        .bind(user.created_at)
        .bind(user.updated_at)
        .bind(explicit_role.is_some())
        .fetch_one(&self.pool)
        .await?;

        Ok(stored)
    }
}
