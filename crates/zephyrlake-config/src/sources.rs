// Configuration source loading
//
// Priority order:
// 1. Environment variables (ZEPHYRLAKE_* prefix)
// 2. Config file path from ZEPHYRLAKE_CONFIG
// 3. Default config file (./zephyrlake.toml)
// 4. Built-in defaults

use anyhow::{Context, Result};
use std::env;
use std::path::Path;

use crate::env_overrides::{apply_env_overrides, EnvSource, ENV_PREFIX};
use crate::RuntimeConfig;

/// Load configuration from the standard locations with env overrides.
pub fn load() -> Result<RuntimeConfig> {
    let mut config = match config_file_from_env()? {
        Some(config) => config,
        None => read_default_file()?.unwrap_or_default(),
    };

    apply_env_overrides(&mut config, &StdEnvSource)?;
    config.validate()?;
    Ok(config)
}

/// Load configuration from a specific file path (for the CLI --config flag).
/// Errors if the file does not exist or cannot be parsed; env overrides
/// still apply on top.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RuntimeConfig> {
    let mut config = read_file(path.as_ref())?;
    apply_env_overrides(&mut config, &StdEnvSource)?;
    config.validate()?;
    Ok(config)
}

fn config_file_from_env() -> Result<Option<RuntimeConfig>> {
    match env::var("ZEPHYRLAKE_CONFIG") {
        Ok(path) => read_file(Path::new(&path)).map(Some),
        Err(_) => Ok(None),
    }
}

fn read_default_file() -> Result<Option<RuntimeConfig>> {
    let path = Path::new("./zephyrlake.toml");
    if path.exists() {
        read_file(path).map(Some)
    } else {
        Ok(None)
    }
}

fn read_file(path: &Path) -> Result<RuntimeConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("failed to parse config file: {}", path.display()))
}

struct StdEnvSource;

impl EnvSource for StdEnvSource {
    fn get(&self, key: &str) -> Option<String> {
        env::var(format!("{ENV_PREFIX}{key}")).ok()
    }

    fn get_raw(&self, key: &str) -> Option<String> {
        env::var(key).ok()
    }
}
