//! Storage gateway for authgate.
//!
//! This crate defines the narrow traits the credential service consumes
//! ([`UserSaver`], [`UserProvider`], [`AppProvider`]) plus the
//! [`Provisioner`] trait used at startup to seed applications and
//! administrators. Two concrete stores implement all four:
//!
//! - [`MemoryStore`] keeps everything in process memory.
//! - [`SqliteStore`] persists to a SQLite database file.
//!
//! Each trait can be implemented on its own, so a caller can swap or mock one
//! capability without touching the others.

pub mod errors;
pub mod memory;
pub mod models;
pub mod sqlite;

use async_trait::async_trait;

pub use errors::StorageError;
pub use memory::MemoryStore;
pub use models::{App, AppId, User, UserId};
pub use sqlite::SqliteStore;

/// Persists new users.
#[async_trait]
pub trait UserSaver: Send + Sync {
    /// Inserts a user and returns the identity assigned by the store.
    ///
    /// Returns [`StorageError::UserExists`] when the email is already taken,
    /// in which case nothing is written.
    async fn save_user(&self, email: &str, pass_hash: &[u8]) -> Result<UserId, StorageError>;
}

/// Point lookups on users.
#[async_trait]
pub trait UserProvider: Send + Sync {
    /// Fetches a user by exact email, or [`StorageError::UserNotFound`].
    async fn user(&self, email: &str) -> Result<User, StorageError>;

    /// Reads the administrator flag, or [`StorageError::UserNotFound`].
    async fn is_admin(&self, user_id: UserId) -> Result<bool, StorageError>;
}

/// Point lookups on applications.
#[async_trait]
pub trait AppProvider: Send + Sync {
    /// Fetches an application by id, or [`StorageError::AppNotFound`].
    async fn app(&self, app_id: AppId) -> Result<App, StorageError>;
}

/// Seeding operations run by the process at startup. The credential service
/// never calls these.
#[async_trait]
pub trait Provisioner: Send + Sync {
    /// Inserts the application or replaces its name and secret.
    async fn upsert_app(&self, app: &App) -> Result<(), StorageError>;

    /// Sets the administrator flag of the user with this email, or
    /// [`StorageError::UserNotFound`].
    async fn set_admin(&self, email: &str, is_admin: bool) -> Result<(), StorageError>;
}
