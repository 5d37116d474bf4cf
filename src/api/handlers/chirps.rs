//! Chirp endpoints. Reads are public; create and delete run behind the
//! middleware chain.

use std::sync::Arc;

use axum::{
    Json,
    body::Body,
    extract::{FromRequest, FromRequestParts, Path, Query, State},
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    AppState,
    api::models::chirps::{ChirpResponse, CreateChirpRequest, ListChirpsQuery},
    auth::{context::AuthContext, middleware::Handler},
    db::{
        handlers::ChirpStore,
        models::chirps::{ChirpCreateDBRequest, ChirpFilter, SortOrder},
    },
    errors::{Error, Result},
};

/// Byte cap on a chirp body, checked before masking.
pub const MAX_CHIRP_LENGTH: usize = 140;

const PROFANITIES: [&str; 3] = ["kerfuffle", "sharbert", "fornax"];

/// Replace every case-insensitive occurrence of a profane term with `****`.
/// Substring match, not word match: "KERFUFFLEs" becomes "****s".
fn mask_profanity(body: &str) -> String {
    let mut masked = body.to_string();

    for term in PROFANITIES {
        loop {
            // Indices line up since ASCII lowercasing never changes lengths.
            let Some(at) = masked.to_ascii_lowercase().find(term) else {
                break;
            };
            masked.replace_range(at..at + term.len(), "****");
        }
    }

    masked
}

/// Terminal handler for `POST /api/chirps`.
pub struct CreateChirp {
    chirps: Arc<dyn ChirpStore>,
}

impl CreateChirp {
    pub fn new(chirps: Arc<dyn ChirpStore>) -> Self {
        Self { chirps }
    }
}

#[async_trait::async_trait]
impl Handler for CreateChirp {
    async fn handle(&self, request: Request<Body>, ctx: &mut AuthContext) -> Result<Response> {
        let user_id = ctx.require_user()?;

        let Json(body) = Json::<CreateChirpRequest>::from_request(request, &())
            .await
            .map_err(|e| Error::BadRequest {
                message: e.to_string(),
            })?;

        if body.body.len() > MAX_CHIRP_LENGTH {
            return Err(Error::BadRequest {
                message: "Chirp is too long".to_string(),
            });
        }

        let chirp = self
            .chirps
            .create(&ChirpCreateDBRequest {
                body: mask_profanity(&body.body),
                user_id,
            })
            .await?;

        Ok((StatusCode::CREATED, Json(ChirpResponse::from(chirp))).into_response())
    }
}

/// Terminal handler for `DELETE /api/chirps/{chirp_id}`. Ownership has
/// already been established by the privilege chain.
pub struct DeleteChirp {
    chirps: Arc<dyn ChirpStore>,
}

impl DeleteChirp {
    pub fn new(chirps: Arc<dyn ChirpStore>) -> Self {
        Self { chirps }
    }
}

#[async_trait::async_trait]
impl Handler for DeleteChirp {
    async fn handle(&self, request: Request<Body>, _ctx: &mut AuthContext) -> Result<Response> {
        let (mut parts, _body) = request.into_parts();
        let Path(chirp_id) = Path::<Uuid>::from_request_parts(&mut parts, &())
            .await
            .map_err(|e| Error::BadRequest {
                message: e.to_string(),
            })?;

        if !self.chirps.delete(chirp_id).await? {
            return Err(Error::NotFound {
                resource: "chirp".to_string(),
            });
        }

        Ok(StatusCode::NO_CONTENT.into_response())
    }
}

#[instrument(skip(state))]
pub async fn get_all_chirps(
    State(state): State<AppState>,
    Query(query): Query<ListChirpsQuery>,
) -> Result<Json<Vec<ChirpResponse>>> {
    let sort = match query.sort.as_deref() {
        Some("desc") => SortOrder::Desc,
        _ => SortOrder::Asc,
    };

    let chirps = state
        .chirps
        .list(&ChirpFilter {
            author_id: query.author_id,
            sort,
        })
        .await?;

    Ok(Json(chirps.into_iter().map(ChirpResponse::from).collect()))
}

#[instrument(skip(state))]
pub async fn get_one_chirp(
    State(state): State<AppState>,
    Path(chirp_id): Path<Uuid>,
) -> Result<Json<ChirpResponse>> {
    let chirp = state.chirps.get_by_id(chirp_id).await?.ok_or_else(|| Error::NotFound {
        resource: "chirp".to_string(),
    })?;

    Ok(Json(ChirpResponse::from(chirp)))
}
