//! Inbound webhook from the payment provider.

use axum::{Json, extract::State, http::HeaderMap, http::StatusCode};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    AppState,
    api::models::webhooks::PaymentEvent,
    auth::extract::api_key,
    errors::{Error, Result},
};

const USER_UPGRADED: &str = "user.upgraded";

/// `POST /api/webhooks/payments`. Guarded by a shared API key rather than a
/// user token; events other than an upgrade are acknowledged and dropped.
#[instrument(skip(state, headers, event), fields(event = %event.event))]
pub async fn payment_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(event): Json<PaymentEvent>,
) -> Result<StatusCode> {
    let presented = api_key(&headers)?;
    if state.config.payment_api_key.as_deref() != Some(presented.as_str()) {
        return Err(Error::Unauthenticated {
            message: Some("invalid API key".to_string()),
        });
    }

    if event.event != USER_UPGRADED {
        return Ok(StatusCode::NO_CONTENT);
    }

    if event.data.user_id.is_empty() {
        return Err(Error::BadRequest {
            message: "Missing user ID".to_string(),
        });
    }
    let user_id = Uuid::parse_str(&event.data.user_id).map_err(|e| Error::BadRequest {
        message: format!("invalid user ID: {e}"),
    })?;

    if !state.users.set_premium(user_id, true).await? {
        return Err(Error::NotFound {
            resource: "user".to_string(),
        });
    }

    Ok(StatusCode::NO_CONTENT)
}
