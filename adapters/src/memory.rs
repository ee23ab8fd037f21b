//! In-process store.
//!
//! Keeps users and applications in hash maps behind a single lock. Data is
//! lost when the process exits, which makes it suitable for tests and local
//! experiments.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::errors::StorageError;
use crate::models::{App, AppId, User, UserId};
use crate::{AppProvider, Provisioner, UserProvider, UserSaver};

#[derive(Debug)]
struct UserRow {
    user: User,
    is_admin: bool,
}

#[derive(Debug, Default)]
struct Inner {
    users: HashMap<UserId, UserRow>,
    by_email: HashMap<String, UserId>,
    apps: HashMap<AppId, App>,
    last_id: UserId,
}

/// Store backed by process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered users.
    pub fn user_count(&self) -> usize {
        self.inner.read().users.len()
    }
}

#[async_trait]
impl UserSaver for MemoryStore {
    async fn save_user(&self, email: &str, pass_hash: &[u8]) -> Result<UserId, StorageError> {
        let mut inner = self.inner.write();
        if inner.by_email.contains_key(email) {
            return Err(StorageError::UserExists);
        }

        inner.last_id += 1;
        let id = inner.last_id;
        inner.by_email.insert(email.to_owned(), id);
        inner.users.insert(
            id,
            UserRow {
                user: User {
                    id,
                    email: email.to_owned(),
                    pass_hash: pass_hash.to_vec(),
                },
                is_admin: false,
            },
        );
        Ok(id)
    }
}

#[async_trait]
impl UserProvider for MemoryStore {
    async fn user(&self, email: &str) -> Result<User, StorageError> {
        let inner = self.inner.read();
        inner
            .by_email
            .get(email)
            .and_then(|id| inner.users.get(id))
            .map(|row| row.user.clone())
            .ok_or(StorageError::UserNotFound)
    }

    async fn is_admin(&self, user_id: UserId) -> Result<bool, StorageError> {
        self.inner
            .read()
            .users
            .get(&user_id)
            .map(|row| row.is_admin)
            .ok_or(StorageError::UserNotFound)
    }
}

#[async_trait]
impl AppProvider for MemoryStore {
    async fn app(&self, app_id: AppId) -> Result<App, StorageError> {
        self.inner
            .read()
            .apps
            .get(&app_id)
            .cloned()
            .ok_or(StorageError::AppNotFound)
    }
}

#[async_trait]
impl Provisioner for MemoryStore {
    async fn upsert_app(&self, app: &App) -> Result<(), StorageError> {
        self.inner.write().apps.insert(app.id, app.clone());
        Ok(())
    }

    async fn set_admin(&self, email: &str, is_admin: bool) -> Result<(), StorageError> {
        let mut inner = self.inner.write();
        let id = *inner
            .by_email
            .get(email)
            .ok_or(StorageError::UserNotFound)?;
        let row = inner.users.get_mut(&id).ok_or(StorageError::UserNotFound)?;
        row.is_admin = is_admin;
        Ok(())
    }
}
