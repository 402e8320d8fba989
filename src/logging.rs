//! Logging setup for the dashboard binary.
//!
//! Installs a global tracing subscriber writing to stderr, filtered by
//! `RUST_LOG` when set and by the given default level otherwise.

use crate::error::{DashboardError, Result};
use std::sync::OnceLock;
use tracing_subscriber::{fmt, prelude::*, EnvFilter, Registry};

static INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize tracing. Subsequent calls are no-ops.
pub fn init(default_level: &str) -> Result<()> {
    if INITIALIZED.get().is_some() {
        return Ok(());
    }

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let stderr_layer = fmt::layer().with_target(false).with_writer(std::io::stderr);

    let subscriber = Registry::default().with(env_filter).with(stderr_layer);
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|err| DashboardError::Logging(err.to_string()))?;
    let _ = INITIALIZED.set(());

    tracing::debug!("Logging initialized at default level {}", default_level);
    Ok(())
}
