//! Token issuance.
//!
//! A token is an HS256 JSON Web Token whose payload is exactly [`Claims`],
//! signed with the secret of the application it was issued for. Tokens are
//! not stored; whoever receives one verifies it with the same secret.

use std::time::Duration;

use adapters::{App, User};
use chrono::{DateTime, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};

use super::errors::AuthError;
use super::models::Claims;

#[derive(Debug, Clone, Copy, Default)]
pub struct TokenIssuer;

impl TokenIssuer {
    pub fn new() -> Self {
        Self
    }

    /// Issues a token for `user` scoped to `app`, valid for `ttl` from now.
    pub fn issue(&self, user: &User, app: &App, ttl: Duration) -> Result<String, AuthError> {
        self.issue_at(user, app, ttl, Utc::now())
    }

    /// Same as [`TokenIssuer::issue`] with an explicit issuance time.
    pub fn issue_at(
        &self,
        user: &User,
        app: &App,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<String, AuthError> {
        let ttl_secs = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
        let claims = Claims {
            user_id: user.id,
            email: user.email.clone(),
            app_id: app.id,
            exp: now.timestamp().saturating_add(ttl_secs),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(app.secret.as_bytes()),
        )?;
        Ok(token)
    }
}
