//! Admin pages: the hit counter metrics view and the dev-only reset.

use axum::{extract::State, response::Html};
use tracing::{info, instrument};

use crate::{
    AppState,
    config::Platform,
    errors::{Error, Result},
};

#[instrument(skip(state))]
pub async fn metrics(State(state): State<AppState>) -> Html<String> {
    Html(format!(
        "<html>\n\n<body>\n  <h1>Welcome, Perch Admin</h1>\n  <p>The app has been visited {} times!</p>\n</body>\n\n</html>",
        state.hits.load()
    ))
}

/// Wipe all users and zero the hit counter. Refused outright anywhere but
/// the dev platform.
#[instrument(skip(state))]
pub async fn reset(State(state): State<AppState>) -> Result<&'static str> {
    if state.config.platform != Platform::Dev {
        return Err(Error::Forbidden);
    }

    state.users.delete_all().await?;
    state.hits.reset();
    info!("reset users and hit counter");

    Ok("Hits reset to 0 and database reset to initial state.")
}
