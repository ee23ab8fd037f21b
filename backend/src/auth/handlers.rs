//! Handler functions for authentication endpoints.
//!
//! Each handler checks the shape of its request, calls [`AuthService`] with
//! the request's [`RequestContext`] and converts the outcome into a JSON
//! response or an [`ApiError`].

use std::sync::LazyLock;

use axum::extract::State;
use axum::{Extension, Json};
use regex::Regex;

use super::errors::AuthError;
use super::models::{
    IsAdminRequest, IsAdminResponse, LoginRequest, LoginResponse, RegisterRequest,
    RegisterResponse,
};
use super::service::AuthService;
use crate::context::RequestContext;
use crate::errors::ApiError;
use crate::extract::ApiJson;
use crate::AppState;
use adapters::UserId;

const EMPTY_USER_ID: UserId = 0;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+)*@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)*$",
    )
    .expect("email pattern is valid")
});

pub async fn register(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> Result<Json<RegisterResponse>, ApiError> {
    validate_credentials(&req.email, &req.password)?;

    let user_id = auth(&state).register(&ctx, &req.email, &req.password).await?;
    Ok(Json(RegisterResponse { user_id }))
}

pub async fn login(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    validate_credentials(&req.email, &req.password)?;

    let token = auth(&state)
        .login(&ctx, &req.email, &req.password, req.app_id)
        .await?;
    Ok(Json(LoginResponse { token }))
}

pub async fn is_admin(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    ApiJson(req): ApiJson<IsAdminRequest>,
) -> Result<Json<IsAdminResponse>, ApiError> {
    validate_user_id(req.user_id)?;

    let is_admin = auth(&state).is_admin(&ctx, req.user_id).await?;
    Ok(Json(IsAdminResponse { is_admin }))
}

fn auth(state: &AppState) -> &AuthService {
    &state.auth
}

pub fn validate_credentials(email: &str, password: &str) -> Result<(), AuthError> {
    if email.is_empty() {
        return Err(AuthError::InvalidInput("email is required"));
    }
    if !is_valid_email(email) {
        return Err(AuthError::InvalidInput("email is not valid"));
    }
    if password.is_empty() {
        return Err(AuthError::InvalidInput("password is required"));
    }
    Ok(())
}

pub fn validate_user_id(user_id: UserId) -> Result<(), AuthError> {
    if user_id == EMPTY_USER_ID {
        return Err(AuthError::InvalidInput("userID is required"));
    }
    Ok(())
}

fn is_valid_email(email: &str) -> bool {
    email.len() <= 254 && EMAIL_RE.is_match(email)
}
