pub mod types;

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use std::path::Path;
pub use types::*;

/// Prefix for environment overrides, e.g. `LOOP_MCP__UNITY__PORT=9000`
pub const ENV_PREFIX: &str = "LOOP_MCP";

/// Load configuration from built-in defaults, an optional TOML file and the environment.
///
/// The result is not validated: callers layer their own overrides on top and
/// then run [`validate_config`].
pub fn load_config(path: Option<&Path>) -> Result<BridgeConfig> {
    let mut builder = Config::builder();

    if let Some(path) = path {
        builder = builder.add_source(File::from(path));
    }

    let config = builder
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .with_context(|| match path {
            Some(path) => format!("Failed to load config from: {}", path.display()),
            None => "Failed to load config from environment".to_string(),
        })?;

    config
        .try_deserialize()
        .context("Failed to deserialize configuration")
}

/// Validate the loaded configuration
pub fn validate_config(config: &BridgeConfig) -> Result<()> {
    let unity = &config.unity;

    if unity.host.trim().is_empty() {
        anyhow::bail!("Unity host must not be empty");
    }

    if unity.port == 0 {
        anyhow::bail!("Unity port must be non-zero");
    }

    if unity.connect_timeout_ms == 0 || unity.request_timeout_secs == 0 {
        anyhow::bail!("Unity connect and request timeouts must be greater than zero");
    }

    if unity.max_frame_bytes < 1024 {
        anyhow::bail!(
            "Unity max_frame_bytes must be at least 1024, got {}",
            unity.max_frame_bytes
        );
    }

    if config.server.name.trim().is_empty() {
        anyhow::bail!("Server name must not be empty");
    }

    // Validate tool filter entries
    if let Some(filter) = &config.tools {
        let entries = filter
            .include
            .iter()
            .chain(filter.exclude.iter())
            .flatten();
        for name in entries {
            if name.trim().is_empty() {
                anyhow::bail!("Tool filter contains an empty tool name");
            }
        }
    }

    // Validate log level
    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.logging.level.as_str()) {
        anyhow::bail!(
            "Invalid log level '{}'. Valid levels: {}",
            config.logging.level,
            valid_levels.join(", ")
        );
    }

    // Validate log format
    let valid_formats = ["pretty", "json"];
    if !valid_formats.contains(&config.logging.format.as_str()) {
        anyhow::bail!(
            "Invalid log format '{}'. Valid formats: {}",
            config.logging.format,
            valid_formats.join(", ")
        );
    }

    Ok(())
}
