//! HTTP routes for authentication, meant to be nested under `/api/auth`.

use axum::{routing::post, Router};

use super::handlers::{is_admin, login, register};
use crate::AppState;

pub fn auth_router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/is_admin", post(is_admin))
}
