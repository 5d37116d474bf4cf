//! Database models for chirps.

use chrono::{DateTime, Utc};
use crate::types::{ChirpId, UserId};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Chirp {
    pub id: ChirpId,
    pub body: String,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct ChirpCreateDBRequest {
    pub body: String,
    pub user_id: UserId,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Filter for chirp listing.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChirpFilter {
    pub author_id: Option<UserId>,
    pub sort: SortOrder,
}
