//! Opens the configured credential store and seeds it.
//!
//! The rest of the backend only sees the store through the three gateway
//! traits bundled in [`Gateway`].

use std::sync::Arc;

use adapters::{
    App, AppProvider, MemoryStore, Provisioner, SqliteStore, StorageError, UserProvider,
    UserSaver,
};
use tracing::{info, warn};

use crate::config::{Config, StorageConfig};

/// The store, split into the capabilities the credential service consumes.
#[derive(Clone)]
pub struct Gateway {
    pub user_saver: Arc<dyn UserSaver>,
    pub user_provider: Arc<dyn UserProvider>,
    pub app_provider: Arc<dyn AppProvider>,
}

impl Gateway {
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: UserSaver + UserProvider + AppProvider + 'static,
    {
        Self {
            user_saver: store.clone(),
            user_provider: store.clone(),
            app_provider: store,
        }
    }
}

/// Opens the store named in `cfg.storage` and applies the configured apps
/// and admins to it.
pub async fn connect(cfg: &Config) -> Result<Gateway, StorageError> {
    match &cfg.storage {
        StorageConfig::Memory => {
            info!("using in-memory storage");
            let store = Arc::new(MemoryStore::new());
            provision(store.as_ref(), cfg).await?;
            Ok(Gateway::from_store(store))
        }
        StorageConfig::Sqlite { path } => {
            info!(path = %path.display(), "opening sqlite storage");
            if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
                std::fs::create_dir_all(dir)
                    .map_err(|e| StorageError::Task(format!("create {}: {e}", dir.display())))?;
            }
            let store = Arc::new(SqliteStore::open(path)?);
            provision(store.as_ref(), cfg).await?;
            Ok(Gateway::from_store(store))
        }
    }
}

/// Upserts every configured app and flags every configured admin.
///
/// An admin email with no registered user is skipped with a warning.
pub async fn provision<P: Provisioner + ?Sized>(store: &P, cfg: &Config) -> Result<(), StorageError> {
    for app in &cfg.apps {
        store.upsert_app(&App::from(app)).await?;
        info!(app_id = app.id, name = %app.name, "app provisioned");
    }

    for email in &cfg.admins {
        match store.set_admin(email, true).await {
            Ok(()) => info!(email = %email, "admin flag set"),
            Err(StorageError::UserNotFound) => {
                warn!(email = %email, "admin not provisioned: no such user")
            }
            Err(err) => return Err(err),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config(extra: &str) -> Config {
        format!(
            r#"
            admins = ["root@x.com", "ghost@x.com"]
            {extra}

            [[apps]]
            id = 7
            name = "seven"
            secret = "s7"
            "#
        )
        .parse()
        .unwrap()
    }

    #[tokio::test]
    async fn memory_store_is_provisioned() {
        let cfg = config("[storage]\nkind = \"memory\"");
        let gw = connect(&cfg).await.unwrap();

        assert_eq!(gw.app_provider.app(7).await.unwrap().secret, "s7");
    }

    #[tokio::test]
    async fn admins_are_flagged_and_unknown_ones_skipped() {
        let store = MemoryStore::new();
        let id = store.save_user("root@x.com", b"h").await.unwrap();

        provision(&store, &config("[storage]\nkind = \"memory\"")).await.unwrap();
        assert!(store.is_admin(id).await.unwrap());
    }

    #[tokio::test]
    async fn sqlite_store_is_created_under_missing_directory() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("auth.db");
        let cfg = config(&format!(
            "[storage]\nkind = \"sqlite\"\npath = {:?}",
            path.display().to_string()
        ));

        let gw = connect(&cfg).await.unwrap();
        assert!(path.exists());
        assert_eq!(gw.app_provider.app(7).await.unwrap().name, "seven");
    }
}
