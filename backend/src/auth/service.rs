//! Core business logic for the authentication system.
//!
//! [`AuthService`] registers users, checks passwords and issues tokens, and
//! answers whether a user is an administrator. It owns no state between
//! calls: storage is reached through the gateway traits, and hashing and reads
//! are bounded by the caller's [`RequestContext`].

use std::sync::Arc;
use std::time::Duration;

use adapters::{AppId, AppProvider, StorageError, UserId, UserProvider, UserSaver};
use tracing::{error, info, instrument, warn};

use super::errors::{AuthError, Missing};
use super::jwt::TokenIssuer;
use super::password::PasswordHasher;
use crate::context::RequestContext;

/// Password checked against when the email is unknown, so both failure paths
/// cost one verification.
const DUMMY_PASSWORD: &str = "authgate-timing-equaliser";

pub struct AuthService {
    user_saver: Arc<dyn UserSaver>,
    user_provider: Arc<dyn UserProvider>,
    app_provider: Arc<dyn AppProvider>,
    hasher: PasswordHasher,
    issuer: TokenIssuer,
    token_ttl: Duration,
    dummy_hash: Vec<u8>,
}

impl AuthService {
    pub async fn new(
        user_saver: Arc<dyn UserSaver>,
        user_provider: Arc<dyn UserProvider>,
        app_provider: Arc<dyn AppProvider>,
        hasher: PasswordHasher,
        token_ttl: Duration,
    ) -> Result<Self, AuthError> {
        let dummy_hash = hasher.hash(DUMMY_PASSWORD).await?;
        Ok(Self {
            user_saver,
            user_provider,
            app_provider,
            hasher,
            issuer: TokenIssuer::new(),
            token_ttl,
            dummy_hash,
        })
    }

    /// Registers a new user and returns the identity the store assigned.
    ///
    /// Fails with [`AuthError::AlreadyExists`] if the email is taken.
    ///
    /// The context bounds hashing and is checked once more before the write.
    /// A write that has been dispatched is awaited to completion, so the
    /// result always reflects what the store did.
    #[instrument(skip(self, ctx, password), fields(op = "auth.register"))]
    pub async fn register(
        &self,
        ctx: &RequestContext,
        email: &str,
        password: &str,
    ) -> Result<UserId, AuthError> {
        let pass_hash = ctx.run(self.hasher.hash(password)).await??;

        ctx.check()?;

        let user_id = match self.user_saver.save_user(email, &pass_hash).await {
            Ok(id) => id,
            Err(StorageError::UserExists) => {
                warn!("user already exists");
                return Err(AuthError::AlreadyExists);
            }
            Err(err) => {
                error!(error = %err, "failed to save user");
                return Err(AuthError::internal(format!("save user: {err}")));
            }
        };

        info!(user_id, "user registered");
        Ok(user_id)
    }

    /// Checks the credentials and returns a token scoped to `app_id`.
    ///
    /// Unknown email and wrong password both fail with
    /// [`AuthError::InvalidCredentials`]. An unknown application fails with
    /// [`AuthError::NotFound`].
    #[instrument(skip(self, ctx, password), fields(op = "auth.login"))]
    pub async fn login(
        &self,
        ctx: &RequestContext,
        email: &str,
        password: &str,
        app_id: AppId,
    ) -> Result<String, AuthError> {
        let user = match ctx.run(self.user_provider.user(email)).await? {
            Ok(user) => Some(user),
            Err(StorageError::UserNotFound) => None,
            Err(err) => {
                error!(error = %err, "failed to get user");
                return Err(AuthError::internal(format!("get user: {err}")));
            }
        };

        let stored_hash = user.as_ref().map_or(&self.dummy_hash, |u| &u.pass_hash);
        let matches = ctx.run(self.hasher.verify(password, stored_hash)).await??;

        let user = match user {
            Some(user) if matches => user,
            Some(_) => {
                warn!("invalid password");
                return Err(AuthError::InvalidCredentials);
            }
            None => {
                warn!("user not found");
                return Err(AuthError::InvalidCredentials);
            }
        };

        let app = match ctx.run(self.app_provider.app(app_id)).await? {
            Ok(app) => app,
            Err(StorageError::AppNotFound) => {
                warn!(app_id, "app not found");
                return Err(AuthError::NotFound(Missing::App));
            }
            Err(err) => {
                error!(error = %err, "failed to get app");
                return Err(AuthError::internal(format!("get app: {err}")));
            }
        };

        let token = self.issuer.issue(&user, &app, self.token_ttl).inspect_err(|err| {
            error!(error = %err, "failed to generate token");
        })?;

        info!(user_id = user.id, app_id, "user logged in");
        Ok(token)
    }

    /// Reports whether the user is flagged as an administrator.
    ///
    /// Fails with [`AuthError::NotFound`] if no such user exists.
    #[instrument(skip(self, ctx), fields(op = "auth.is_admin"))]
    pub async fn is_admin(&self, ctx: &RequestContext, user_id: UserId) -> Result<bool, AuthError> {
        match ctx.run(self.user_provider.is_admin(user_id)).await? {
            Ok(is_admin) => {
                tracing::debug!(is_admin, "checked admin flag");
                Ok(is_admin)
            }
            Err(StorageError::UserNotFound) => {
                warn!("user not found");
                Err(AuthError::NotFound(Missing::User))
            }
            Err(err) => {
                error!(error = %err, "failed to check admin flag");
                Err(AuthError::internal(format!("check admin: {err}")))
            }
        }
    }
}
