//! Login, refresh and revoke endpoints.

use axum::{Json, extract::State, http::HeaderMap, http::StatusCode};
use chrono::Utc;
use tracing::instrument;

use crate::{
    AppState,
    api::models::auth::{LoginRequest, LoginResponse, RefreshResponse},
    auth::{extract::bearer_token, password::verify_password, refresh::generate_refresh_token, token::issue_token},
    errors::{Error, Result},
};

/// A login failure never says whether the email or the password was wrong.
fn bad_credentials() -> Error {
    Error::Unauthenticated {
        message: Some("email or password does not match".to_string()),
    }
}

fn chrono_ttl(ttl: std::time::Duration) -> Result<chrono::Duration> {
    chrono::Duration::from_std(ttl).map_err(|e| Error::Internal {
        operation: format!("convert configured ttl: {e}"),
    })
}

#[instrument(skip(state, request), fields(email = %request.email))]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let user = state
        .users
        .get_by_email(&request.email)
        .await?
        .ok_or_else(bad_credentials)?;

    // bcrypt verification takes tens of milliseconds; keep it off the
    // async workers.
    let hash = user.password_hash.clone();
    let password = request.password;
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("join password verification task: {e}"),
        })?
        .map_err(|_| bad_credentials())?;

    let token = issue_token(user.id, state.config.jwt_secret()?, chrono_ttl(state.config.access_token_ttl)?)?;

    let refresh_token = generate_refresh_token();
    let expires_at = Utc::now() + chrono_ttl(state.config.refresh_token_ttl)?;
    state
        .refresh_tokens
        .persist(&refresh_token, user.id, expires_at)
        .await?;

    Ok(Json(LoginResponse {
        id: user.id,
        created_at: user.created_at,
        updated_at: user.updated_at,
        email: user.email,
        is_premium: user.is_premium,
        token,
        refresh_token,
    }))
}

#[instrument(skip(state, headers))]
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<RefreshResponse>> {
    let presented = bearer_token(&headers)?;

    let record = state.refresh_tokens.lookup(&presented).await?;
    let user_id = match record {
        Some(r) if r.is_usable(Utc::now()) => r.user_id,
        // Unknown, revoked and expired all look the same to the client.
        _ => {
            return Err(Error::Unauthenticated {
                message: Some("token expired".to_string()),
            });
        }
    };

    let token = issue_token(user_id, state.config.jwt_secret()?, chrono_ttl(state.config.access_token_ttl)?)?;

    Ok(Json(RefreshResponse { token }))
}

/// Revoking is idempotent and succeeds even for tokens we never issued.
#[instrument(skip(state, headers))]
pub async fn revoke(State(state): State<AppState>, headers: HeaderMap) -> Result<StatusCode> {
    let presented = bearer_token(&headers)?;

    state.refresh_tokens.revoke(&presented, Utc::now()).await?;

    Ok(StatusCode::NO_CONTENT)
}
