//! Domain errors of the credential service.
//!
//! This is the closed set of outcomes a caller can branch on. Storage
//! failures are classified into these variants inside the service, once;
//! anything not recognised there becomes [`AuthError::Internal`].

use std::fmt;

use thiserror::Error;

use crate::context::ContextError;

/// Which record a [`AuthError::NotFound`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Missing {
    App,
    User,
}

impl fmt::Display for Missing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::App => f.write_str("app"),
            Self::User => f.write_str("user"),
        }
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    /// A request field is missing or malformed. Safe to retry once fixed.
    #[error("{0}")]
    InvalidInput(&'static str),

    /// The email is already registered. Retrying with the same input fails again.
    #[error("user already exists")]
    AlreadyExists,

    /// Unknown email or wrong password; the two are not told apart.
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("{0} not found")]
    NotFound(Missing),

    /// Storage, hashing, signing or context failure. The message is for logs only.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AuthError {
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

impl From<ContextError> for AuthError {
    fn from(err: ContextError) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<tokio::task::JoinError> for AuthError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Internal(format!("blocking task failed: {err}"))
    }
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        Self::Internal(format!("token signing failed: {err}"))
    }
}
