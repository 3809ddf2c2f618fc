// Environment variable overrides for RuntimeConfig
//
// Variables use the ZEPHYRLAKE_ prefix (ZEPHYRLAKE_API_KEY, ZEPHYRLAKE_BASE_URL,
// ZEPHYRLAKE_LOG_LEVEL, ...). The unprefixed OPENAQ_API_KEY is accepted as a
// credential fallback so existing OpenAQ setups keep working.

use anyhow::{Context, Result};

use crate::{LogFormat, RuntimeConfig};

pub const ENV_PREFIX: &str = "ZEPHYRLAKE_";

/// Abstraction over environment lookup so overrides are testable without
/// touching the process environment.
pub trait EnvSource {
    /// Lookup with the ZEPHYRLAKE_ prefix applied.
    fn get(&self, key: &str) -> Option<String>;

    /// Lookup of a raw, unprefixed variable.
    fn get_raw(&self, key: &str) -> Option<String>;
}

/// Apply environment overrides on top of file/default configuration.
pub fn apply_env_overrides(config: &mut RuntimeConfig, env: &dyn EnvSource) -> Result<()> {
    if let Some(key) = env.get("API_KEY") {
        config.api.api_key = Some(key);
    } else if let Some(key) = env.get_raw("OPENAQ_API_KEY") {
        config.api.api_key = Some(key);
    }

    if let Some(url) = env.get("BASE_URL") {
        config.api.base_url = url;
    }

    if let Some(raw) = env.get("PAGE_SIZE") {
        config.extract.page_size = parse(&raw, "ZEPHYRLAKE_PAGE_SIZE")?;
    }

    if let Some(raw) = env.get("REQUEST_TIMEOUT_SECS") {
        config.extract.request_timeout_secs = parse(&raw, "ZEPHYRLAKE_REQUEST_TIMEOUT_SECS")?;
    }

    if let Some(raw) = env.get("PAGE_COOLDOWN_SECS") {
        config.extract.page_cooldown_secs = parse(&raw, "ZEPHYRLAKE_PAGE_COOLDOWN_SECS")?;
    }

    if let Some(level) = env.get("LOG_LEVEL") {
        config.log.level = level;
    }

    if let Some(format) = env.get("LOG_FORMAT") {
        config.log.format = match format.to_ascii_lowercase().as_str() {
            "json" => LogFormat::Json,
            "text" => LogFormat::Text,
            other => {
                tracing::warn!(value = other, "unknown ZEPHYRLAKE_LOG_FORMAT, keeping configured format");
                config.log.format
            }
        };
    }

    Ok(())
}

fn parse<T: std::str::FromStr>(raw: &str, var: &str) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.parse()
        .with_context(|| format!("invalid value for {var}: {raw:?}"))
}
