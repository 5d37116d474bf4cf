//! In-memory store implementations.
//!
//! Used by the test suite and by development deployments started without a
//! `database_url`. Not suitable for production: state dies with the process.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    db::{
        errors::{DbError, Result},
        handlers::{ChirpStore, RefreshTokenStore, UserStore},
        models::{
            chirps::{Chirp, ChirpCreateDBRequest, ChirpFilter, SortOrder},
            refresh_tokens::RefreshTokenRecord,
            users::{User, UserCreateDBRequest, UserUpdateDBRequest},
        },
    },
    types::{ChirpId, UserId},
};

#[derive(Debug, Default)]
pub struct MemUsers {
    users: Mutex<HashMap<UserId, User>>,
}

impl MemUsers {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl UserStore for MemUsers {
    async fn create(&self, request: &UserCreateDBRequest) -> Result<User> {
        let mut users = self.users.lock().expect("users lock poisoned");

        if users.values().any(|u| u.email == request.email) {
            return Err(DbError::UniqueViolation {
                constraint: Some("users_email_key".to_string()),
                table: Some("users".to_string()),
                message: format!("duplicate email {}", request.email),
            });
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: request.email.clone(),
            password_hash: request.password_hash.clone(),
            is_premium: false,
            created_at: now,
            updated_at: now,
        };
        users.insert(user.id, user.clone());

        Ok(user)
    }

    async fn get_by_id(&self, id: UserId) -> Result<Option<User>> {
        Ok(self.users.lock().expect("users lock poisoned").get(&id).cloned())
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self
            .users
            .lock()
            .expect("users lock poisoned")
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn update(&self, id: UserId, request: &UserUpdateDBRequest) -> Result<User> {
        let mut users = self.users.lock().expect("users lock poisoned");

        let user = users.get_mut(&id).ok_or(DbError::NotFound)?;
        user.email = request.email.clone();
        user.password_hash = request.password_hash.clone();
        user.updated_at = Utc::now();

        Ok(user.clone())
    }

    async fn set_premium(&self, id: UserId, premium: bool) -> Result<bool> {
        let mut users = self.users.lock().expect("users lock poisoned");

        match users.get_mut(&id) {
            Some(user) => {
                user.is_premium = premium;
                user.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_all(&self) -> Result<()> {
        self.users.lock().expect("users lock poisoned").clear();
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemChirps {
    chirps: Mutex<Vec<Chirp>>,
}

impl MemChirps {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl ChirpStore for MemChirps {
    async fn create(&self, request: &ChirpCreateDBRequest) -> Result<Chirp> {
        let now = Utc::now();
        let chirp = Chirp {
            id: Uuid::new_v4(),
            body: request.body.clone(),
            user_id: request.user_id,
            created_at: now,
            updated_at: now,
        };
        self.chirps.lock().expect("chirps lock poisoned").push(chirp.clone());

        Ok(chirp)
    }

    async fn get_by_id(&self, id: ChirpId) -> Result<Option<Chirp>> {
        Ok(self
            .chirps
            .lock()
            .expect("chirps lock poisoned")
            .iter()
            .find(|c| c.id == id)
            .cloned())
    }

    async fn list(&self, filter: &ChirpFilter) -> Result<Vec<Chirp>> {
        let chirps = self.chirps.lock().expect("chirps lock poisoned");

        let mut result: Vec<Chirp> = chirps
            .iter()
            .filter(|c| filter.author_id.is_none_or(|author| c.user_id == author))
            .cloned()
            .collect();

        result.sort_by_key(|c| c.created_at);
        if filter.sort == SortOrder::Desc {
            result.reverse();
        }

        Ok(result)
    }

    async fn delete(&self, id: ChirpId) -> Result<bool> {
        let mut chirps = self.chirps.lock().expect("chirps lock poisoned");
        let before = chirps.len();
        chirps.retain(|c| c.id != id);

        Ok(chirps.len() < before)
    }
}

#[derive(Debug, Default)]
pub struct MemRefreshTokens {
    tokens: Mutex<HashMap<String, RefreshTokenRecord>>,
}

impl MemRefreshTokens {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl RefreshTokenStore for MemRefreshTokens {
    async fn persist(&self, token: &str, user_id: UserId, expires_at: DateTime<Utc>) -> Result<()> {
        let record = RefreshTokenRecord {
            token: token.to_string(),
            user_id,
            expires_at,
            revoked_at: None,
            created_at: Utc::now(),
        };
        self.tokens
            .lock()
            .expect("tokens lock poisoned")
            .insert(token.to_string(), record);

        Ok(())
    }

    async fn lookup(&self, token: &str) -> Result<Option<RefreshTokenRecord>> {
        Ok(self.tokens.lock().expect("tokens lock poisoned").get(token).cloned())
    }

    async fn revoke(&self, token: &str, now: DateTime<Utc>) -> Result<bool> {
        let mut tokens = self.tokens.lock().expect("tokens lock poisoned");

        match tokens.get_mut(token) {
            Some(record) => {
                // Keep the first revocation timestamp.
                record.revoked_at.get_or_insert(now);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[tokio::test]
    async fn test_user_email_uniqueness() {
        let store = MemUsers::new();
        let request = UserCreateDBRequest {
            email: "walt@example.com".to_string(),
            password_hash: "hash".to_string(),
        };

        store.create(&request).await.unwrap();
        let err = store.create(&request).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_revoked_token_stays_revoked_and_revoke_is_idempotent() {
        let store = MemRefreshTokens::new();
        let user_id = Uuid::new_v4();
        let now = Utc::now();

        store.persist("token-1", user_id, now + Duration::days(60)).await.unwrap();

        assert!(store.revoke("token-1", now).await.unwrap());
        let first = store.lookup("token-1").await.unwrap().unwrap();
        assert!(!first.is_usable(now));

        // Re-revoking does not error and keeps the original timestamp.
        assert!(store.revoke("token-1", now + Duration::hours(1)).await.unwrap());
        let second = store.lookup("token-1").await.unwrap().unwrap();
        assert_eq!(first.revoked_at, second.revoked_at);
    }

    #[tokio::test]
    async fn test_revoke_unknown_token_reports_missing() {
        let store = MemRefreshTokens::new();
        assert!(!store.revoke("missing", Utc::now()).await.unwrap());
    }

    #[tokio::test]
    async fn test_chirp_listing_filters_and_sorts() {
        let store = MemChirps::new();
        let author = Uuid::new_v4();
        let other = Uuid::new_v4();

        for (body, user_id) in [("one", author), ("two", other), ("three", author)] {
            store
                .create(&ChirpCreateDBRequest {
                    body: body.to_string(),
                    user_id,
                })
                .await
                .unwrap();
        }

        let mine = store
            .list(&ChirpFilter {
                author_id: Some(author),
                sort: SortOrder::Desc,
            })
            .await
            .unwrap();

        assert_eq!(mine.len(), 2);
        assert!(mine[0].created_at >= mine[1].created_at);
    }
}
