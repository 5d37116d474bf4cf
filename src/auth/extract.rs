//! Credential extraction from the `Authorization` header.
//!
//! Parsing is tolerant on purpose, matching long-standing client behavior:
//! the scheme prefix is stripped once if present, then everything after the
//! first space is ignored. `bearer_token("abc def")` is `"abc"` even with
//! no `Bearer ` prefix at all.

use axum::http::{HeaderMap, header::AUTHORIZATION};

use crate::errors::{Error, Result};

/// Extract a bearer token from the headers.
pub fn bearer_token(headers: &HeaderMap) -> Result<String> {
    token_with_prefix(headers, "Bearer ", "no bearer token present in headers")
}

/// Extract an API key from the headers.
pub fn api_key(headers: &HeaderMap) -> Result<String> {
    token_with_prefix(headers, "ApiKey ", "no API key present in headers")
}

fn token_with_prefix(headers: &HeaderMap, prefix: &str, missing: &str) -> Result<String> {
    let value = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| Error::Unauthenticated {
            message: Some(missing.to_string()),
        })?;

    let stripped = value.strip_prefix(prefix).unwrap_or(value);
    let token = stripped.split(' ').next().unwrap_or_default();

    Ok(token.to_string())
}
