//! Main entry point for the authgate server.
//!
//! Loads configuration, sets up tracing, opens and seeds the credential
//! store, and serves the HTTP API.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use authgate::auth::{AuthService, PasswordHasher};
use authgate::config::Config;
use authgate::{database, logging, router};

#[derive(Debug, Parser)]
#[command(name = "authgate", version, about)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, env = "CONFIG_PATH")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = Config::load(&cli.config)?;

    logging::init(cfg.env);
    tracing::info!(env = ?cfg.env, version = env!("CARGO_PKG_VERSION"), "starting authgate");

    let gateway = database::connect(&cfg)
        .await
        .context("failed to init storage")?;
    let hasher = PasswordHasher::new(&cfg.hashing)?;
    let auth = AuthService::new(
        gateway.user_saver,
        gateway.user_provider,
        gateway.app_provider,
        hasher,
        cfg.token_ttl(),
    )
    .await?;

    let app = router(Arc::new(auth), cfg.http.request_timeout());

    let listener = tokio::net::TcpListener::bind(cfg.http.addr)
        .await
        .with_context(|| format!("failed to bind {}", cfg.http.addr))?;
    tracing::info!(addr = %cfg.http.addr, "listening");

    axum::serve(listener, app).await?;
    Ok(())
}
