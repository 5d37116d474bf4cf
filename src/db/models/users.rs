//! Database models for users.

use chrono::{DateTime, Utc};
use crate::types::UserId;

/// A user row. The auth core only ever reads the id and the stored
/// credential; everything else belongs to the resource handlers.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub password_hash: String,
    pub is_premium: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct UserCreateDBRequest {
    pub email: String,
    pub password_hash: String,
}

#[derive(Debug, Clone)]
pub struct UserUpdateDBRequest {
    pub email: String,
    pub password_hash: String,
}
