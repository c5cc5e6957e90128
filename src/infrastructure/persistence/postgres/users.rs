//! # PostgreSQL User Directory
//!
//! PostgreSQL implementation of [`UserDirectory`] using sqlx.
//!
//! Accounts are owned by the identity service; this directory is a
//! read-only view onto its `users` table. Emails are stored normalized
//! (trimmed, lowercased), so equality lookups suffice.

use crate::domain::entities::User;
use crate::domain::value_objects::{EmailAddress, UserId};
use crate::infrastructure::persistence::traits::{StoreError, StoreResult, UserDirectory};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

/// PostgreSQL implementation of [`UserDirectory`].
#[derive(Debug, Clone)]
pub struct PostgresUserDirectory {
    pool: PgPool,
}

impl PostgresUserDirectory {
    /// Creates a new PostgreSQL user directory.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns a reference to the connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl UserDirectory for PostgresUserDirectory {
    async fn find_by_id(&self, id: UserId) -> StoreResult<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as("SELECT id, email, name FROM users WHERE id = $1")
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::query)?;

        row.map(UserRow::try_into_user).transpose()
    }

    async fn find_by_email(&self, email: &EmailAddress) -> StoreResult<Option<User>> {
        let row: Option<UserRow> =
            sqlx::query_as("SELECT id, email, name FROM users WHERE email = $1")
                .bind(email.as_str())
                .fetch_optional(&self.pool)
                .await
                .map_err(StoreError::query)?;

        row.map(UserRow::try_into_user).transpose()
    }
}

/// Row type for user queries.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    name: String,
}

impl UserRow {
    /// Converts the row into a user entity.
    fn try_into_user(self) -> StoreResult<User> {
        let email = EmailAddress::new(&self.email).map_err(StoreError::query)?;
        Ok(User::new(UserId::new(self.id), email, self.name))
    }
}
