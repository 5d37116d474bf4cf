//! Static frontend serving.
//!
//! Files come off disk via [`ServeDir`], wrapped as a chain terminal so the
//! hit-tracking middleware runs in front of them.

use axum::{
    body::Body,
    http::Request,
    response::{IntoResponse, Response},
};
use tower::ServiceExt;
use tower_http::services::ServeDir;

use crate::{
    auth::{context::AuthContext, middleware::Handler},
    errors::{Error, Result},
};

pub struct StaticAssets {
    serve: ServeDir,
}

impl StaticAssets {
    pub fn new(dir: &str) -> Self {
        Self {
            serve: ServeDir::new(dir),
        }
    }
}

#[async_trait::async_trait]
impl Handler for StaticAssets {
    async fn handle(&self, request: Request<Body>, _ctx: &mut AuthContext) -> Result<Response> {
        let response = self
            .serve
            .clone()
            .oneshot(request)
            .await
            .map_err(|e| Error::Internal {
                operation: format!("serve static asset: {e}"),
            })?;

        Ok(response.map(Body::new).into_response())
    }
}
