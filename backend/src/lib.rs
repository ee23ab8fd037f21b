//! authgate: issues and checks user credentials for third-party applications.
//!
//! Users register with an email and password, log in to get a token signed
//! with the requesting application's secret, and can be asked about their
//! administrator flag. Storage lives behind the `adapters` crate.

pub mod auth;
pub mod config;
pub mod context;
pub mod database;
pub mod errors;
pub mod extract;
pub mod logging;
pub mod middleware;

use std::sync::Arc;
use std::time::Duration;

use axum::{routing::get, Router};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use auth::AuthService;

const MAX_BODY_SIZE: usize = 64 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
}

/// Builds the HTTP application around `auth`.
///
/// `request_timeout` bounds how long the service waits on storage and
/// hashing for any single request.
pub fn router(auth: Arc<AuthService>, request_timeout: Duration) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .nest("/api/auth", auth::auth_router())
        .with_state(AppState { auth })
        .layer(axum::middleware::from_fn_with_state(
            request_timeout,
            middleware::request_context,
        ))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_SIZE))
        .layer(TraceLayer::new_for_http())
}

async fn root_handler() -> &'static str {
    "Welcome to authgate!"
}
