//! Tracing setup for the `profile-sync` binary.
//!
//! Logs go to stderr; stdout carries the profile the binary prints.

use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Environment;

/// Filter used when `RUST_LOG` is not set
pub fn default_filter(env: &Environment) -> &'static str {
    match env {
        Environment::Dev => "jobboard_profile=debug,profile_sync=debug,reqwest=info,info",
        Environment::Staging => "jobboard_profile=debug,profile_sync=info,info",
        Environment::Prod => "jobboard_profile=info,profile_sync=info,warn",
    }
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(env: &Environment) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter(env)));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(env.is_dev())
        .with_line_number(env.is_dev());

    if env.is_prod() {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.json())
            .try_init()
            .context("Failed to install JSON log subscriber")?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.pretty())
            .try_init()
            .context("Failed to install log subscriber")?;
    }

    tracing::info!("Logging initialized for {:?} environment", env);
    Ok(())
}
