//! Application configuration.
//!
//! Configuration is read once from a TOML file and passed by value into the
//! components that need it. Every section except `storage` has defaults.

use std::collections::HashSet;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use adapters::{App, AppId};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Deployment environment; selects the log format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Env {
    Local,
    Dev,
    #[default]
    Prod,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub env: Env,

    #[serde(default = "default_token_ttl_secs")]
    pub token_ttl_secs: u64,

    #[serde(default)]
    pub http: HttpConfig,

    pub storage: StorageConfig,

    #[serde(default)]
    pub hashing: HashingConfig,

    /// Applications provisioned at startup.
    #[serde(default)]
    pub apps: Vec<AppConfig>,

    /// Emails flagged as administrators at startup.
    #[serde(default)]
    pub admins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_addr")]
    pub addr: SocketAddr,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            addr: default_addr(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl HttpConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum StorageConfig {
    Memory,
    Sqlite { path: PathBuf },
}

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct HashingConfig {
    #[serde(default = "default_memory_kib")]
    pub memory_kib: u32,

    #[serde(default = "default_iterations")]
    pub iterations: u32,

    #[serde(default = "default_parallelism")]
    pub parallelism: u32,
}

impl Default for HashingConfig {
    fn default() -> Self {
        Self {
            memory_kib: default_memory_kib(),
            iterations: default_iterations(),
            parallelism: default_parallelism(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub id: AppId,
    pub name: String,
    pub secret: String,
}

impl From<&AppConfig> for App {
    fn from(cfg: &AppConfig) -> Self {
        Self {
            id: cfg.id,
            name: cfg.name.clone(),
            secret: cfg.secret.clone(),
        }
    }
}

const MAX_REQUEST_TIMEOUT_SECS: u64 = 3600;

fn default_token_ttl_secs() -> u64 {
    3600
}

fn default_addr() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 44044))
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_memory_kib() -> u32 {
    argon2::Params::DEFAULT_M_COST
}

fn default_iterations() -> u32 {
    argon2::Params::DEFAULT_T_COST
}

fn default_parallelism() -> u32 {
    argon2::Params::DEFAULT_P_COST
}

impl Config {
    /// Reads, parses and validates the file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        raw.parse()
    }

    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.token_ttl_secs)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.token_ttl_secs == 0 {
            return Err(ConfigError::Invalid("token_ttl_secs must be positive".into()));
        }
        if self.http.request_timeout_secs == 0
            || self.http.request_timeout_secs > MAX_REQUEST_TIMEOUT_SECS
        {
            return Err(ConfigError::Invalid(format!(
                "http.request_timeout_secs must be between 1 and {MAX_REQUEST_TIMEOUT_SECS}"
            )));
        }

        let mut seen = HashSet::new();
        let mut names = HashSet::new();
        for app in &self.apps {
            if app.id == 0 {
                return Err(ConfigError::Invalid(format!(
                    "app '{}' has id 0, ids must be non-zero",
                    app.name
                )));
            }
            if app.secret.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "app {} has an empty secret",
                    app.id
                )));
            }
            if !seen.insert(app.id) {
                return Err(ConfigError::Invalid(format!(
                    "app id {} is listed more than once",
                    app.id
                )));
            }
            if !names.insert(app.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "app name '{}' is listed more than once",
                    app.name
                )));
            }
        }
        Ok(())
    }
}

impl std::str::FromStr for Config {
    type Err = ConfigError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let cfg: Config = toml::from_str(raw)?;
        cfg.validate()?;
        Ok(cfg)
    }
}
