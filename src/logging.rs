use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

/// The environment variable that overrides the configured filter.
pub const LOG_ENV: &str = "WEBLINKS_LOG";

const DEFAULT_FILTER: &str = "info,weblinks=debug";

/// Installs a stderr `tracing` subscriber. The filter comes from
/// [`LOG_ENV`], then `default_filter`, then `info,weblinks=debug`.
pub fn init(default_filter: Option<&str>) -> Result<()> {
    let env_filter = match EnvFilter::try_from_env(LOG_ENV) {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_filter.unwrap_or(DEFAULT_FILTER))?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow!("Installing log subscriber: {}", e))?;

    tracing::debug!("logging initialized");
    Ok(())
}
