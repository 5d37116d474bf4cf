//! Database model for refresh tokens.

use chrono::{DateTime, Utc};
use crate::types::UserId;

/// A persisted refresh token. Rows are created at login, mutated only by
/// revocation, and never deleted by this service.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RefreshTokenRecord {
    pub token: String,
    pub user_id: UserId,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl RefreshTokenRecord {
    /// A record is usable iff it has not been revoked and has not reached its
    /// expiry. Equal-to-now counts as expired (fail closed).
    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        self.revoked_at.is_none() && self.expires_at > now
    }
}
