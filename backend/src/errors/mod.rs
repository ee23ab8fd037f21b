//! Caller-facing error responses.
//!
//! [`ApiError`] is what leaves the process: a stable status code plus a short
//! message. Domain errors are turned into it exactly once, in
//! `From<AuthError>`; internal causes are logged there and never echoed back.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::auth::AuthError;

const INTERNAL_MESSAGE: &str = "internal error";
const BAD_BODY_MESSAGE: &str = "invalid request body";

/// Status vocabulary of the transport, independent of HTTP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Code {
    InvalidArgument,
    AlreadyExists,
    Internal,
}

impl Code {
    pub fn http_status(self) -> StatusCode {
        match self {
            Self::InvalidArgument => StatusCode::BAD_REQUEST,
            Self::AlreadyExists => StatusCode::CONFLICT,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    pub code: Code,
    pub message: String,
}

impl ApiError {
    pub fn new(code: Code, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn internal() -> Self {
        Self::new(Code::Internal, INTERNAL_MESSAGE)
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidInput(msg) => Self::new(Code::InvalidArgument, msg),
            AuthError::AlreadyExists => Self::new(Code::AlreadyExists, "user already exists"),
            // Which check failed is not revealed to the caller.
            AuthError::InvalidCredentials | AuthError::NotFound(_) => {
                tracing::debug!(error = %err, "request rejected");
                Self::internal()
            }
            AuthError::Internal(ref cause) => {
                tracing::error!(cause = %cause, "request failed");
                Self::internal()
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(
            status = %rejection.status(),
            reason = %rejection.body_text(),
            "request body rejected"
        );
        Self::new(Code::InvalidArgument, BAD_BODY_MESSAGE)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.code.http_status(), Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Missing;

    #[test]
    fn domain_errors_map_to_stable_codes() {
        let cases = [
            (
                AuthError::InvalidInput("email is required"),
                ApiError::new(Code::InvalidArgument, "email is required"),
            ),
            (
                AuthError::AlreadyExists,
                ApiError::new(Code::AlreadyExists, "user already exists"),
            ),
            (AuthError::InvalidCredentials, ApiError::internal()),
            (AuthError::NotFound(Missing::App), ApiError::internal()),
            (AuthError::NotFound(Missing::User), ApiError::internal()),
            (
                AuthError::internal("sqlite error: disk I/O error"),
                ApiError::internal(),
            ),
        ];

        for (domain, expected) in cases {
            assert_eq!(ApiError::from(domain), expected);
        }
    }

    #[test]
    fn internal_message_hides_cause() {
        let api = ApiError::from(AuthError::internal("users table is locked"));
        assert_eq!(api.message, "internal error");
    }

    #[test]
    fn http_status_per_code() {
        assert_eq!(Code::InvalidArgument.http_status(), StatusCode::BAD_REQUEST);
        assert_eq!(Code::AlreadyExists.http_status(), StatusCode::CONFLICT);
        assert_eq!(
            Code::Internal.http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn response_carries_status_and_body() {
        let resp = ApiError::new(Code::AlreadyExists, "user already exists").into_response();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
    }
}
