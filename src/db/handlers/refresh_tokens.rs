//! Refresh token store adapter: trait contract plus the PostgreSQL
//! implementation.
//!
//! The service stores the opaque token string as issued. Tokens carry 256
//! bits of entropy, so the stored value is already unguessable; rows are
//! revoked, never deleted.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use crate::{
    db::{errors::Result, models::refresh_tokens::RefreshTokenRecord},
    types::UserId,
};

#[async_trait::async_trait]
pub trait RefreshTokenStore: Send + Sync {
    /// Persist a newly issued token for a user.
    async fn persist(&self, token: &str, user_id: UserId, expires_at: DateTime<Utc>) -> Result<()>;

    async fn lookup(&self, token: &str) -> Result<Option<RefreshTokenRecord>>;

    /// Set the revocation timestamp. Sets it at most once: revoking an
    /// already-revoked token is success and keeps the original timestamp.
    /// Returns false when the token is unknown.
    async fn revoke(&self, token: &str, now: DateTime<Utc>) -> Result<bool>;
}

#[derive(Clone, Debug)]
pub struct PgRefreshTokens {
    pool: PgPool,
}

impl PgRefreshTokens {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const REFRESH_TOKEN_COLUMNS: &str = "token, user_id, expires_at, revoked_at, created_at";

#[async_trait::async_trait]
impl RefreshTokenStore for PgRefreshTokens {
    #[instrument(skip(self, token), err)]
    async fn persist(&self, token: &str, user_id: UserId, expires_at: DateTime<Utc>) -> Result<()> {
        sqlx::query("INSERT INTO refresh_tokens (token, user_id, expires_at) VALUES ($1, $2, $3)")
            .bind(token)
            .bind(user_id)
            .bind(expires_at)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    #[instrument(skip(self, token), err)]
    async fn lookup(&self, token: &str) -> Result<Option<RefreshTokenRecord>> {
        let record = sqlx::query_as::<_, RefreshTokenRecord>(&format!(
            "SELECT {REFRESH_TOKEN_COLUMNS} FROM refresh_tokens WHERE token = $1"
        ))
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    #[instrument(skip(self, token), err)]
    async fn revoke(&self, token: &str, now: DateTime<Utc>) -> Result<bool> {
        let done = sqlx::query(
            "UPDATE refresh_tokens SET revoked_at = COALESCE(revoked_at, $2) WHERE token = $1",
        )
        .bind(token)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(done.rows_affected() > 0)
    }
}
