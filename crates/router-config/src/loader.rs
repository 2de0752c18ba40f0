//! Configuration loading from disk.

use crate::model::RouterConfig;
use anyhow::Context;
use router_core::{RouterError, RouterResult};
use std::path::Path;
use tracing::info;

/// Load and validate a configuration file.
///
/// The format is picked by extension: `.yaml`/`.yml`, `.toml`, or `.json`.
///
/// # Errors
/// Returns `Configuration` when the file cannot be read, parsed, or fails
/// validation.
pub fn load_from_path(path: impl AsRef<Path>) -> RouterResult<RouterConfig> {
    let path = path.as_ref();
    let config = read_and_parse(path)
        .map_err(|e| RouterError::configuration(format!("{e:#}")))?;
    config.validate()?;
    info!(path = %path.display(), services = config.services.len(), "configuration loaded");
    Ok(config)
}

fn read_and_parse(path: &Path) -> anyhow::Result<RouterConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default()
        .to_lowercase();

    let config = match extension.as_str() {
        "yaml" | "yml" => serde_yaml::from_str(&raw)
            .with_context(|| format!("invalid YAML in {}", path.display()))?,
        "toml" => toml::from_str(&raw)
            .with_context(|| format!("invalid TOML in {}", path.display()))?,
        "json" => serde_json::from_str(&raw)
            .with_context(|| format!("invalid JSON in {}", path.display()))?,
        other => anyhow::bail!("unsupported configuration format '.{other}'"),
    };
    Ok(config)
}
