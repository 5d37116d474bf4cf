//! Request middleware chain.
//!
//! Routes that need authentication or authorization are mounted as a
//! [`Chain`]: an ordered list of [`Middleware`] in front of a terminal
//! [`Handler`]. The first middleware listed is the outermost. Each dispatch
//! gets a fresh [`AuthContext`] which middlewares fill in and the terminal
//! handler reads; an `Err` anywhere short-circuits the rest of the chain and
//! renders as the error's HTTP response.

use std::{
    convert::Infallible,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};

use axum::{
    body::Body,
    http::Request,
    response::{IntoResponse, Response},
};

use crate::{
    auth::{
        context::AuthContext,
        extract::bearer_token,
        privilege::{Privilege, evaluate_all},
        token::validate_token,
    },
    errors::Result,
    metrics::HitCounter,
};

/// Terminal request handler at the end of a chain.
#[async_trait::async_trait]
pub trait Handler: Send + Sync {
    async fn handle(&self, request: Request<Body>, ctx: &mut AuthContext) -> Result<Response>;
}

/// A link in the chain. Implementations decide whether to call `next` and
/// may mutate the context or the request on the way through.
#[async_trait::async_trait]
pub trait Middleware: Send + Sync {
    async fn handle(
        &self,
        request: Request<Body>,
        ctx: &mut AuthContext,
        next: Next<'_>,
    ) -> Result<Response>;
}

/// The remainder of a chain, handed to each middleware.
pub struct Next<'a> {
    rest: &'a [Arc<dyn Middleware>],
    terminal: &'a dyn Handler,
}

impl Next<'_> {
    pub async fn run(self, request: Request<Body>, ctx: &mut AuthContext) -> Result<Response> {
        match self.rest.split_first() {
            Some((middleware, rest)) => {
                let next = Next {
                    rest,
                    terminal: self.terminal,
                };
                middleware.handle(request, ctx, next).await
            }
            None => self.terminal.handle(request, ctx).await,
        }
    }
}

/// An ordered middleware stack with its terminal handler.
pub struct Chain {
    middlewares: Vec<Arc<dyn Middleware>>,
    terminal: Arc<dyn Handler>,
}

impl Chain {
    pub fn new(middlewares: Vec<Arc<dyn Middleware>>, terminal: Arc<dyn Handler>) -> Self {
        Self { middlewares, terminal }
    }

    /// Run one request through the chain with a fresh context.
    pub async fn dispatch(&self, request: Request<Body>) -> Response {
        let mut ctx = AuthContext::new();
        let next = Next {
            rest: &self.middlewares,
            terminal: self.terminal.as_ref(),
        };

        match next.run(request, &mut ctx).await {
            Ok(response) => response,
            Err(e) => e.into_response(),
        }
    }

    pub fn into_service(self) -> ChainService {
        ChainService {
            chain: Arc::new(self),
        }
    }
}

/// Tower adapter so a [`Chain`] mounts anywhere axum accepts a service.
#[derive(Clone)]
pub struct ChainService {
    chain: Arc<Chain>,
}

impl tower::Service<Request<Body>> for ChainService {
    type Response = Response;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = std::result::Result<Response, Infallible>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<std::result::Result<(), Infallible>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request<Body>) -> Self::Future {
        let chain = Arc::clone(&self.chain);
        Box::pin(async move { Ok(chain.dispatch(request).await) })
    }
}

/// Establishes the caller's identity from the bearer token. Requests without
/// a valid token stop here.
pub struct Authenticate {
    secret: String,
}

impl Authenticate {
    pub fn new(secret: impl Into<String>) -> Self {
        Self { secret: secret.into() }
    }
}

#[async_trait::async_trait]
impl Middleware for Authenticate {
    async fn handle(
        &self,
        request: Request<Body>,
        ctx: &mut AuthContext,
        next: Next<'_>,
    ) -> Result<Response> {
        let token = bearer_token(request.headers())?;
        let user_id = validate_token(&token, &self.secret)?;
        ctx.set_user(user_id);

        next.run(request, ctx).await
    }
}

/// Counts requests passing through, then continues. Used on the static app
/// routes to feed the admin metrics page.
pub struct TrackHits {
    hits: Arc<HitCounter>,
}

impl TrackHits {
    pub fn new(hits: Arc<HitCounter>) -> Self {
        Self { hits }
    }
}

#[async_trait::async_trait]
impl Middleware for TrackHits {
    async fn handle(
        &self,
        request: Request<Body>,
        ctx: &mut AuthContext,
        next: Next<'_>,
    ) -> Result<Response> {
        self.hits.increment();

        next.run(request, ctx).await
    }
}

/// Evaluates privilege predicates against the established context. Belongs
/// after `Authenticate` in the chain.
pub struct RequirePrivileges {
    privileges: Vec<Arc<dyn Privilege>>,
}

impl RequirePrivileges {
    pub fn new(privileges: Vec<Arc<dyn Privilege>>) -> Self {
        Self { privileges }
    }
}

#[async_trait::async_trait]
impl Middleware for RequirePrivileges {
    async fn handle(
        &self,
        request: Request<Body>,
        ctx: &mut AuthContext,
        next: Next<'_>,
    ) -> Result<Response> {
        let (mut parts, body) = request.into_parts();
        evaluate_all(&self.privileges, &mut parts, ctx).await?;

        next.run(Request::from_parts(parts, body), ctx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::token::issue_token;
    use axum::http::{StatusCode, header::AUTHORIZATION};
    use std::sync::Mutex;
    use uuid::Uuid;

    struct Recorder {
        name: &'static str,
        log: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait::async_trait]
    impl Middleware for Recorder {
        async fn handle(
            &self,
            request: Request<Body>,
            ctx: &mut AuthContext,
            next: Next<'_>,
        ) -> Result<Response> {
            self.log.lock().unwrap().push(format!("{}:before", self.name));
            let response = next.run(request, ctx).await;
            self.log.lock().unwrap().push(format!("{}:after", self.name));
            response
        }
    }

    struct Terminal {
        log: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait::async_trait]
    impl Handler for Terminal {
        async fn handle(&self, _request: Request<Body>, _ctx: &mut AuthContext) -> Result<Response> {
            self.log.lock().unwrap().push("terminal".to_string());
            Ok(StatusCode::OK.into_response())
        }
    }

    fn request() -> Request<Body> {
        Request::builder().uri("/").body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_first_listed_middleware_is_outermost() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let chain = Chain::new(
            vec![
                Arc::new(Recorder {
                    name: "outer",
                    log: Arc::clone(&log),
                }),
                Arc::new(Recorder {
                    name: "inner",
                    log: Arc::clone(&log),
                }),
            ],
            Arc::new(Terminal { log: Arc::clone(&log) }),
        );

        let response = chain.dispatch(request()).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            *log.lock().unwrap(),
            vec!["outer:before", "inner:before", "terminal", "inner:after", "outer:after"]
        );
    }

    #[tokio::test]
    async fn test_missing_token_short_circuits_before_terminal() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let chain = Chain::new(
            vec![Arc::new(Authenticate::new("secret"))],
            Arc::new(Terminal { log: Arc::clone(&log) }),
        );

        let response = chain.dispatch(request()).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(log.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_valid_token_reaches_terminal_with_identity() {
        struct AssertUser {
            expected: Uuid,
        }

        #[async_trait::async_trait]
        impl Handler for AssertUser {
            async fn handle(
                &self,
                _request: Request<Body>,
                ctx: &mut AuthContext,
            ) -> Result<Response> {
                assert_eq!(ctx.require_user()?, self.expected);
                Ok(StatusCode::OK.into_response())
            }
        }

        let user_id = Uuid::new_v4();
        let token = issue_token(user_id, "secret", chrono::Duration::hours(1)).unwrap();
        let chain = Chain::new(
            vec![Arc::new(Authenticate::new("secret"))],
            Arc::new(AssertUser { expected: user_id }),
        );

        let request = Request::builder()
            .uri("/")
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap();

        let response = chain.dispatch(request).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_track_hits_counts_every_dispatch() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let hits = Arc::new(HitCounter::new());
        let chain = Chain::new(
            vec![Arc::new(TrackHits::new(Arc::clone(&hits)))],
            Arc::new(Terminal { log }),
        );

        chain.dispatch(request()).await;
        chain.dispatch(request()).await;
        assert_eq!(hits.load(), 2);
    }
}
