//! CLI command implementations

pub mod confirm;
pub mod envelope;
pub mod inquiry;
pub mod redirect;
pub mod reverse;
pub mod status;
pub mod token;

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Serialize;

use irankish_core::config::GatewayConfig;
use irankish_core::{GatewayContext, TransactionResult};

/// Get the irankish directory from environment or default
pub fn get_config_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("IRANKISH_DIR") {
        return Ok(PathBuf::from(dir));
    }
    dirs::home_dir()
        .map(|home| home.join(".irankish"))
        .context("Could not find home directory; set IRANKISH_DIR")
}

/// Load configuration only, for commands that never reach the gateway
pub fn load_config() -> Result<GatewayConfig> {
    let config_dir = get_config_dir()?;
    tracing::debug!(config_dir = %config_dir.display(), "loading configuration");
    GatewayConfig::load(&config_dir)
        .with_context(|| format!("Failed to load configuration from {:?}", config_dir))
}

/// Build the gateway context (configuration plus HTTP client)
pub fn get_context() -> Result<GatewayContext> {
    let config_dir = get_config_dir()?;
    tracing::debug!(config_dir = %config_dir.display(), "initializing gateway client");
    GatewayContext::new(&config_dir).context("Failed to initialize IranKish client")
}

/// Print an operation outcome as a JSON `TransactionResult`
///
/// Exits with status 1 when the outcome is a failure.
pub fn emit_json<T: Serialize>(result: irankish_core::Result<T>) -> Result<()> {
    let outcome = TransactionResult::from(result);
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    if !outcome.is_success() {
        std::process::exit(1);
    }
    Ok(())
}
