//! User signup and self-service profile update.

use std::sync::Arc;

use axum::{
    Json,
    body::Body,
    extract::{FromRequest, State},
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::instrument;

use crate::{
    AppState,
    api::models::users::{CreateUserRequest, UpdateUserRequest, UserResponse},
    auth::{context::AuthContext, middleware::Handler, password::hash_password},
    db::{
        handlers::UserStore,
        models::users::{UserCreateDBRequest, UserUpdateDBRequest},
    },
    errors::{Error, Result},
};

async fn hash_on_blocking_thread(password: String) -> Result<String> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("join password hashing task: {e}"),
        })?
}

#[instrument(skip(state, request), fields(email = %request.email))]
pub async fn signup(
    State(state): State<AppState>,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>)> {
    let password_hash = hash_on_blocking_thread(request.password).await?;

    let user = state
        .users
        .create(&UserCreateDBRequest {
            email: request.email,
            password_hash,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// Terminal handler for `PUT /api/users`. Runs behind `Authenticate`; the
/// target user is whoever the token names, never taken from the body.
pub struct UpdateUser {
    users: Arc<dyn UserStore>,
}

impl UpdateUser {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }
}

#[async_trait::async_trait]
impl Handler for UpdateUser {
    async fn handle(&self, request: Request<Body>, ctx: &mut AuthContext) -> Result<Response> {
        let user_id = ctx.require_user()?;

        let Json(body) = Json::<UpdateUserRequest>::from_request(request, &())
            .await
            .map_err(|e| Error::BadRequest {
                message: e.to_string(),
            })?;

        let password_hash = hash_on_blocking_thread(body.password).await?;

        let user = self
            .users
            .update(
                user_id,
                &UserUpdateDBRequest {
                    email: body.email,
                    password_hash,
                },
            )
            .await?;

        Ok(Json(UserResponse::from(user)).into_response())
    }
}
