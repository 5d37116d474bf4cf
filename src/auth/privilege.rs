//! Privilege predicates.
//!
//! A privilege answers "may this caller do this" after authentication has
//! settled who the caller is. `Ok(false)` means denied and becomes a uniform
//! 403; `Err` means the predicate itself could not be evaluated and surfaces
//! with its own status and message.

use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Path},
    http::{StatusCode, request::Parts},
};
use thiserror::Error as ThisError;
use uuid::Uuid;

use crate::{
    auth::context::AuthContext,
    db::handlers::ChirpStore,
    errors::{Error, Result},
};

/// A privilege check failed to evaluate. Distinct from a clean denial: this
/// carries its own status code and the message shown to the client.
#[derive(ThisError, Debug)]
#[error("{cause}")]
pub struct PrivilegeError {
    pub status: StatusCode,
    pub cause: anyhow::Error,
}

impl PrivilegeError {
    pub fn new(status: StatusCode, cause: impl Into<anyhow::Error>) -> Self {
        Self {
            status,
            cause: cause.into(),
        }
    }
}

#[async_trait::async_trait]
pub trait Privilege: Send + Sync {
    async fn evaluate(
        &self,
        parts: &mut Parts,
        ctx: &AuthContext,
    ) -> std::result::Result<bool, PrivilegeError>;
}

/// Evaluate predicates in order, stopping at the first denial or failure.
/// All must pass for the request to proceed.
pub async fn evaluate_all(
    privileges: &[Arc<dyn Privilege>],
    parts: &mut Parts,
    ctx: &AuthContext,
) -> Result<()> {
    for privilege in privileges {
        if !privilege.evaluate(parts, ctx).await? {
            return Err(Error::Forbidden);
        }
    }

    Ok(())
}

/// Grants access only to the author of the chirp named in the request path.
pub struct OwnsChirp {
    chirps: Arc<dyn ChirpStore>,
}

impl OwnsChirp {
    pub fn new(chirps: Arc<dyn ChirpStore>) -> Self {
        Self { chirps }
    }
}

#[async_trait::async_trait]
impl Privilege for OwnsChirp {
    async fn evaluate(
        &self,
        parts: &mut Parts,
        ctx: &AuthContext,
    ) -> std::result::Result<bool, PrivilegeError> {
        let Some(user_id) = ctx.user_id() else {
            return Ok(false);
        };

        let Path(chirp_id) = Path::<Uuid>::from_request_parts(parts, &())
            .await
            .map_err(|e| PrivilegeError::new(StatusCode::BAD_REQUEST, anyhow::anyhow!("{e}")))?;

        let chirp = self
            .chirps
            .get_by_id(chirp_id)
            .await
            .map_err(|e| PrivilegeError::new(StatusCode::INTERNAL_SERVER_ERROR, e))?
            .ok_or_else(|| {
                PrivilegeError::new(StatusCode::NOT_FOUND, anyhow::anyhow!("chirp not found"))
            })?;

        Ok(chirp.user_id == user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{memory::MemChirps, models::chirps::ChirpCreateDBRequest};
    use axum::http::Request;

    fn parts_for(uri: &str) -> Parts {
        let (parts, ()) = Request::builder().uri(uri).body(()).unwrap().into_parts();
        parts
    }

    #[tokio::test]
    async fn test_anonymous_caller_is_denied_not_errored() {
        let privilege = OwnsChirp::new(Arc::new(MemChirps::new()));
        let mut parts = parts_for("/api/chirps/whatever");

        let allowed = privilege.evaluate(&mut parts, &AuthContext::new()).await.unwrap();
        assert!(!allowed);
    }

    #[tokio::test]
    async fn test_unroutable_path_is_a_bad_request() {
        let store = Arc::new(MemChirps::new());
        let chirp = store
            .create(&ChirpCreateDBRequest {
                body: "hi".to_string(),
                user_id: Uuid::new_v4(),
            })
            .await
            .unwrap();

        let privilege = OwnsChirp::new(store);
        let mut ctx = AuthContext::new();
        ctx.set_user(chirp.user_id);

        // Parts built outside a router carry no path captures.
        let mut parts = parts_for(&format!("/api/chirps/{}", chirp.id));
        let err = privilege.evaluate(&mut parts, &ctx).await.unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_denial_from_any_predicate_is_forbidden() {
        struct Deny;

        #[async_trait::async_trait]
        impl Privilege for Deny {
            async fn evaluate(
                &self,
                _parts: &mut Parts,
                _ctx: &AuthContext,
            ) -> std::result::Result<bool, PrivilegeError> {
                Ok(false)
            }
        }

        struct Allow;

        #[async_trait::async_trait]
        impl Privilege for Allow {
            async fn evaluate(
                &self,
                _parts: &mut Parts,
                _ctx: &AuthContext,
            ) -> std::result::Result<bool, PrivilegeError> {
                Ok(true)
            }
        }

        let mut parts = parts_for("/anything");
        let ctx = AuthContext::new();

        let all_pass: Vec<Arc<dyn Privilege>> = vec![Arc::new(Allow), Arc::new(Allow)];
        evaluate_all(&all_pass, &mut parts, &ctx).await.unwrap();

        let one_denies: Vec<Arc<dyn Privilege>> = vec![Arc::new(Allow), Arc::new(Deny)];
        let err = evaluate_all(&one_denies, &mut parts, &ctx).await.unwrap_err();
        assert!(matches!(err, Error::Forbidden));
    }
}
