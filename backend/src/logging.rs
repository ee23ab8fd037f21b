//! Tracing subscriber setup.

use tracing_subscriber::EnvFilter;

use crate::config::Env;

/// Installs the global subscriber for `env`. `RUST_LOG` overrides the level.
pub fn init(env: Env) {
    let default_level = match env {
        Env::Local | Env::Dev => "debug",
        Env::Prod => "info",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let result = match env {
        Env::Local => builder.pretty().try_init(),
        Env::Dev => builder
            .compact()
            .with_file(true)
            .with_line_number(true)
            .try_init(),
        Env::Prod => builder.json().try_init(),
    };

    if let Err(err) = result {
        eprintln!("tracing subscriber already installed: {err}");
    }
}
