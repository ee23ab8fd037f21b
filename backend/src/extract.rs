//! Request extractors whose failures are reported as [`ApiError`].

use axum::extract::FromRequest;

use crate::errors::ApiError;

/// JSON request body. Any rejection (wrong content type, malformed JSON,
/// wrong field types) becomes an invalid-argument error.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);
