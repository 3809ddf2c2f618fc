// Error types for the extractor crate

use thiserror::Error;

/// Errors that can occur during extraction. Retryable statuses are consumed
/// by the retry loop and never surface here on eventual success.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// No API credential configured. Checked once per run, before any request.
    #[error(
        "API key is not configured; set ZEPHYRLAKE_API_KEY (or OPENAQ_API_KEY) \
         in the environment, a .env file, or the config file"
    )]
    MissingApiKey,

    /// HTTP client construction failed.
    #[error("failed to build HTTP client")]
    Client(#[source] reqwest::Error),

    /// Transport failure sending the request or reading the response.
    #[error("request for page {page} failed")]
    Request {
        page: u32,
        #[source]
        source: reqwest::Error,
    },

    /// Response body was not a valid measurements page.
    #[error("failed to decode measurements page {page}")]
    Decode {
        page: u32,
        #[source]
        source: reqwest::Error,
    },

    /// Non-retryable HTTP status; aborts without consuming the retry schedule.
    #[error("page {page} failed with status {status}")]
    PermanentStatus { page: u32, status: u16 },

    /// Retry schedule exhausted on a retryable status.
    #[error("page {page} still failing with status {status} after {attempts} attempts")]
    RetriesExhausted {
        page: u32,
        status: u16,
        attempts: u32,
    },
}

pub type Result<T> = std::result::Result<T, ExtractError>;
