//! SQLite-backed store.
//!
//! Tables:
//! - `users`: id, email (unique), pass_hash, is_admin
//! - `apps`: id, name (unique), secret
//!
//! rusqlite is blocking, so every call takes the connection lock inside
//! `spawn_blocking` and never on a runtime worker thread.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};

use crate::errors::StorageError;
use crate::models::{App, AppId, User, UserId};
use crate::{AppProvider, Provisioner, UserProvider, UserSaver};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS users (
        id        INTEGER PRIMARY KEY AUTOINCREMENT,
        email     TEXT    NOT NULL UNIQUE,
        pass_hash BLOB    NOT NULL,
        is_admin  INTEGER NOT NULL DEFAULT 0
    );

    CREATE TABLE IF NOT EXISTS apps (
        id     INTEGER PRIMARY KEY,
        name   TEXT NOT NULL UNIQUE,
        secret TEXT NOT NULL
    );";

/// Store backed by a SQLite database.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Opens (or creates) the database at `path` and ensures the tables exist.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )?;
        Self::init(conn)
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory() -> Result<Self, StorageError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StorageError> {
        conn.execute_batch(SCHEMA)?;
        tracing::debug!("sqlite schema ready");
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    async fn with_conn<T, F>(&self, f: F) -> Result<T, StorageError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, StorageError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let conn = conn.lock();
            f(&conn)
        })
        .await?
    }
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

#[async_trait]
impl UserSaver for SqliteStore {
    async fn save_user(&self, email: &str, pass_hash: &[u8]) -> Result<UserId, StorageError> {
        let email = email.to_owned();
        let pass_hash = pass_hash.to_vec();
        self.with_conn(move |conn| {
            match conn.execute(
                "INSERT INTO users (email, pass_hash) VALUES (?1, ?2)",
                params![email, pass_hash],
            ) {
                Ok(_) => Ok(conn.last_insert_rowid()),
                Err(err) if is_unique_violation(&err) => Err(StorageError::UserExists),
                Err(err) => Err(err.into()),
            }
        })
        .await
    }
}

#[async_trait]
impl UserProvider for SqliteStore {
    async fn user(&self, email: &str) -> Result<User, StorageError> {
        let email = email.to_owned();
        self.with_conn(move |conn| {
            conn.query_row(
                "SELECT id, email, pass_hash FROM users WHERE email = ?1",
                params![email],
                |row| {
                    Ok(User {
                        id: row.get(0)?,
                        email: row.get(1)?,
                        pass_hash: row.get(2)?,
                    })
                },
            )
            .optional()?
            .ok_or(StorageError::UserNotFound)
        })
        .await
    }

    async fn is_admin(&self, user_id: UserId) -> Result<bool, StorageError> {
        self.with_conn(move |conn| {
            conn.query_row(
                "SELECT is_admin FROM users WHERE id = ?1",
                params![user_id],
                |row| row.get::<_, bool>(0),
            )
            .optional()?
            .ok_or(StorageError::UserNotFound)
        })
        .await
    }
}

#[async_trait]
impl AppProvider for SqliteStore {
    async fn app(&self, app_id: AppId) -> Result<App, StorageError> {
        self.with_conn(move |conn| {
            conn.query_row(
                "SELECT id, name, secret FROM apps WHERE id = ?1",
                params![app_id],
                |row| {
                    Ok(App {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        secret: row.get(2)?,
                    })
                },
            )
            .optional()?
            .ok_or(StorageError::AppNotFound)
        })
        .await
    }
}

#[async_trait]
impl Provisioner for SqliteStore {
    async fn upsert_app(&self, app: &App) -> Result<(), StorageError> {
        let app = app.clone();
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO apps (id, name, secret) VALUES (?1, ?2, ?3)
                 ON CONFLICT(id) DO UPDATE SET
                    name = excluded.name,
                    secret = excluded.secret",
                params![app.id, app.name, app.secret],
            )?;
            Ok(())
        })
        .await
    }

    async fn set_admin(&self, email: &str, is_admin: bool) -> Result<(), StorageError> {
        let email = email.to_owned();
        self.with_conn(move |conn| {
            let updated = conn.execute(
                "UPDATE users SET is_admin = ?1 WHERE email = ?2",
                params![is_admin, email],
            )?;
            if updated == 0 {
                return Err(StorageError::UserNotFound);
            }
            Ok(())
        })
        .await
    }
}
