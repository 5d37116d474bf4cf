//! User repository: trait contract plus the PostgreSQL implementation.

use sqlx::PgPool;
use tracing::instrument;

use crate::{
    db::{
        errors::{DbError, Result},
        models::users::{User, UserCreateDBRequest, UserUpdateDBRequest},
    },
    types::UserId,
};

/// Data access contract for users. The auth core and the handlers only ever
/// see this trait; the backing store is swappable.
#[async_trait::async_trait]
pub trait UserStore: Send + Sync {
    async fn create(&self, request: &UserCreateDBRequest) -> Result<User>;

    async fn get_by_id(&self, id: UserId) -> Result<Option<User>>;

    async fn get_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Replace email and stored credential. The identity itself is immutable.
    async fn update(&self, id: UserId, request: &UserUpdateDBRequest) -> Result<User>;

    /// Flip the premium flag. Returns false when the user does not exist.
    async fn set_premium(&self, id: UserId, premium: bool) -> Result<bool>;

    /// Wipe all users. Only reachable through the dev-platform admin reset.
    async fn delete_all(&self) -> Result<()>;
}

#[derive(Clone, Debug)]
pub struct PgUsers {
    pool: PgPool,
}

impl PgUsers {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const USER_COLUMNS: &str = "id, email, password_hash, is_premium, created_at, updated_at";

#[async_trait::async_trait]
impl UserStore for PgUsers {
    #[instrument(skip(self, request), err)]
    async fn create(&self, request: &UserCreateDBRequest) -> Result<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (email, password_hash) VALUES ($1, $2) RETURNING {USER_COLUMNS}"
        ))
        .bind(&request.email)
        .bind(&request.password_hash)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    #[instrument(skip(self), err)]
    async fn get_by_id(&self, id: UserId) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    #[instrument(skip(self, email), err)]
    async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    #[instrument(skip(self, request), err)]
    async fn update(&self, id: UserId, request: &UserUpdateDBRequest) -> Result<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET email = $2, password_hash = $3, updated_at = now() WHERE id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(&request.email)
        .bind(&request.password_hash)
        .fetch_optional(&self.pool)
        .await?;

        user.ok_or(DbError::NotFound)
    }

    #[instrument(skip(self), err)]
    async fn set_premium(&self, id: UserId, premium: bool) -> Result<bool> {
        let done = sqlx::query("UPDATE users SET is_premium = $2, updated_at = now() WHERE id = $1")
            .bind(id)
            .bind(premium)
            .execute(&self.pool)
            .await?;

        Ok(done.rows_affected() > 0)
    }

    #[instrument(skip(self), err)]
    async fn delete_all(&self) -> Result<()> {
        sqlx::query("DELETE FROM users").execute(&self.pool).await?;

        Ok(())
    }
}
