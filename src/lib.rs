//! # Perch
//!
//! A small multi-user microblogging service: users sign up with email and
//! password, post chirps, and authenticate with short-lived signed access
//! tokens backed by long-lived opaque refresh tokens.
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use perch::{Application, Config, config::Args, telemetry};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     telemetry::init_telemetry();
//!
//!     let app = Application::new(config).await?;
//!     app.serve(async {
//!         tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
//!     })
//!     .await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! The [`auth`] module holds the credential primitives and the middleware
//! chain; [`api`] holds the HTTP handlers and wire types; [`db`] holds the
//! store traits with their PostgreSQL and in-memory implementations. A
//! deployment without a `database_url` (dev only) runs entirely in memory.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
pub mod metrics;
pub mod static_assets;
pub mod telemetry;
pub mod types;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use bon::Builder;
use sqlx::{PgPool, postgres::PgPoolOptions};
use tokio::net::TcpListener;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::{Level, info};

pub use config::Config;

use crate::{
    api::handlers::{
        admin, auth as auth_handlers,
        chirps::{self, CreateChirp, DeleteChirp},
        misc,
        users::{self, UpdateUser},
        webhooks,
    },
    auth::{
        middleware::{Authenticate, Chain, Middleware, RequirePrivileges, TrackHits},
        privilege::{OwnsChirp, Privilege},
    },
    db::handlers::{
        ChirpStore, PgChirps, PgRefreshTokens, PgUsers, RefreshTokenStore, UserStore,
    },
    db::memory::{MemChirps, MemRefreshTokens, MemUsers},
    metrics::HitCounter,
    static_assets::StaticAssets,
};

/// Application state shared across all request handlers.
#[derive(Clone, Builder)]
pub struct AppState {
    pub config: Arc<Config>,
    pub users: Arc<dyn UserStore>,
    pub chirps: Arc<dyn ChirpStore>,
    pub refresh_tokens: Arc<dyn RefreshTokenStore>,
    pub hits: Arc<HitCounter>,
}

/// Get the perch database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// Build the full router: public routes as plain handlers, protected routes
/// mounted as middleware chains.
pub fn build_router(state: AppState) -> anyhow::Result<Router> {
    let secret = state.config.jwt_secret()?.to_string();

    let create_chirp = Chain::new(
        vec![Arc::new(Authenticate::new(secret.clone()))],
        Arc::new(CreateChirp::new(Arc::clone(&state.chirps))),
    )
    .into_service();

    let delete_chirp = Chain::new(
        vec![
            Arc::new(Authenticate::new(secret.clone())),
            Arc::new(RequirePrivileges::new(vec![
                Arc::new(OwnsChirp::new(Arc::clone(&state.chirps))) as Arc<dyn Privilege>,
            ])),
        ],
        Arc::new(DeleteChirp::new(Arc::clone(&state.chirps))),
    )
    .into_service();

    let update_user = Chain::new(
        vec![Arc::new(Authenticate::new(secret)) as Arc<dyn Middleware>],
        Arc::new(UpdateUser::new(Arc::clone(&state.users))),
    )
    .into_service();

    let static_app = Chain::new(
        vec![Arc::new(TrackHits::new(Arc::clone(&state.hits)))],
        Arc::new(StaticAssets::new(&state.config.static_dir)),
    )
    .into_service();

    let router = Router::new()
        .route("/api/users", post(users::signup).put_service(update_user))
        .route("/api/login", post(auth_handlers::login))
        .route("/api/refresh", post(auth_handlers::refresh))
        .route("/api/revoke", post(auth_handlers::revoke))
        .route(
            "/api/chirps",
            get(chirps::get_all_chirps).post_service(create_chirp),
        )
        .route(
            "/api/chirps/{chirp_id}",
            get(chirps::get_one_chirp).delete_service(delete_chirp),
        )
        .route("/api/webhooks/payments", post(webhooks::payment_event))
        .route("/api/healthz", get(misc::healthz))
        .route("/admin/metrics", get(admin::metrics))
        .route("/admin/reset", post(admin::reset))
        .nest_service("/app", static_app)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state);

    Ok(router)
}

pub struct Application {
    router: Router,
    config: Arc<Config>,
    pool: Option<PgPool>,
}

impl Application {
    /// Create a new application instance: connect to the database (or fall
    /// back to in-memory stores on dev), run migrations, build the router.
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let config = Arc::new(config);

        let (pool, users, chirps, refresh_tokens): (
            Option<PgPool>,
            Arc<dyn UserStore>,
            Arc<dyn ChirpStore>,
            Arc<dyn RefreshTokenStore>,
        ) = match &config.database_url {
            Some(url) => {
                let pool = PgPoolOptions::new().max_connections(10).connect(url).await?;
                migrator().run(&pool).await?;

                (
                    Some(pool.clone()),
                    Arc::new(PgUsers::new(pool.clone())),
                    Arc::new(PgChirps::new(pool.clone())),
                    Arc::new(PgRefreshTokens::new(pool)),
                )
            }
            None => {
                info!("no database_url configured, running with in-memory stores");

                (
                    None,
                    Arc::new(MemUsers::new()),
                    Arc::new(MemChirps::new()),
                    Arc::new(MemRefreshTokens::new()),
                )
            }
        };

        let state = AppState::builder()
            .config(Arc::clone(&config))
            .users(users)
            .chirps(chirps)
            .refresh_tokens(refresh_tokens)
            .hits(Arc::new(HitCounter::new()))
            .build();

        let router = build_router(state)?;

        Ok(Self { router, config, pool })
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!("perch listening on http://{bind_addr}");

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        if let Some(pool) = self.pool {
            info!("Closing database connections...");
            pool.close().await;
        }

        Ok(())
    }
}
