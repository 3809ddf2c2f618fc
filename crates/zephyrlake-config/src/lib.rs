// zephyrlake-config - Unified runtime configuration
//
// Supports configuration from multiple sources:
// 1. Environment variables (ZEPHYRLAKE_* prefix, highest priority)
// 2. Config file path from ZEPHYRLAKE_CONFIG env var
// 3. Default config file location (./zephyrlake.toml)
// 4. Built-in defaults (lowest priority)
//
// The API credential is resolved here into an explicit struct; core logic
// never reads the process environment itself.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

mod env_overrides;
mod sources;

pub use env_overrides::{apply_env_overrides, EnvSource, ENV_PREFIX};
pub use sources::{load, load_from_path};

/// Main runtime configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuntimeConfig {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub extract: ExtractConfig,

    #[serde(default)]
    pub log: LogConfig,
}

impl RuntimeConfig {
    pub fn validate(&self) -> Result<()> {
        if self.api.base_url.is_empty() {
            bail!("api.base_url must not be empty");
        }
        if self.extract.page_size == 0 {
            bail!("extract.page_size must be greater than zero");
        }
        Ok(())
    }
}

/// Upstream API endpoint and credential.
///
/// A missing credential is not a load error: summaries and dry runs work
/// without one. The extractor rejects it before issuing any request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

fn default_base_url() -> String {
    "https://api.openaq.org/v3".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
        }
    }
}

/// Request settings: pagination, timeouts, retry schedule, cooldown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractConfig {
    /// Max rows per page.
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Backoff delays between retries of the same page, in seconds.
    /// One retry per entry after the first attempt.
    #[serde(default = "default_retry_delays_secs")]
    pub retry_delays_secs: Vec<u64>,

    /// Pause between successful page fetches, in seconds.
    #[serde(default = "default_page_cooldown_secs")]
    pub page_cooldown_secs: u64,
}

fn default_page_size() -> u32 {
    100
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_retry_delays_secs() -> Vec<u64> {
    vec![1, 2, 3]
}

fn default_page_cooldown_secs() -> u64 {
    5
}

impl ExtractConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn retry_delays(&self) -> Vec<Duration> {
        self.retry_delays_secs
            .iter()
            .map(|s| Duration::from_secs(*s))
            .collect()
    }

    pub fn page_cooldown(&self) -> Duration {
        Duration::from_secs(self.page_cooldown_secs)
    }
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            request_timeout_secs: default_request_timeout_secs(),
            retry_delays_secs: default_retry_delays_secs(),
            page_cooldown_secs: default_page_cooldown_secs(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}
