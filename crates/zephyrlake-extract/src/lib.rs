// zephyrlake-extract - Paginated OpenAQ measurement extraction
//
// Fetches measurement pages for one sensor, retries transient failures on
// a fixed backoff schedule, and flattens raw items into MeasurementRows.
// Network I/O only; no filesystem writes.

use std::time::Duration;

use tracing::{debug, info, warn};

use zephyrlake_config::RuntimeConfig;
use zephyrlake_core::types::MeasurementsPage;
use zephyrlake_core::MeasurementRow;

pub mod error;
pub mod retry;

pub use error::{ExtractError, Result};
pub use retry::{is_retryable, RetryPolicy, RetryState, RETRYABLE_STATUSES};

/// Extractor for one OpenAQ sensor's measurements endpoint.
#[derive(Debug)]
pub struct Extractor {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    page_size: u32,
    policy: RetryPolicy,
    page_cooldown: Duration,
}

impl Extractor {
    /// Build an extractor from explicit configuration.
    ///
    /// The credential check happens here, once per run, before any request
    /// is issued.
    pub fn new(config: &RuntimeConfig) -> Result<Self> {
        let api_key = config
            .api
            .api_key
            .clone()
            .ok_or(ExtractError::MissingApiKey)?;

        let client = reqwest::Client::builder()
            .timeout(config.extract.request_timeout())
            .build()
            .map_err(ExtractError::Client)?;

        Ok(Self {
            client,
            base_url: config.api.base_url.trim_end_matches('/').to_string(),
            api_key,
            page_size: config.extract.page_size,
            policy: RetryPolicy::new(config.extract.retry_delays()),
            page_cooldown: config.extract.page_cooldown(),
        })
    }

    /// Fetch up to `max_pages` pages of measurements since `start_time`
    /// (inclusive ISO-8601 UTC lower bound) and flatten them into rows.
    ///
    /// `max_pages == 0` returns immediately with no network calls. An empty
    /// page terminates pagination early; callers rely on this to avoid
    /// requesting pages past the end of data.
    pub async fn fetch(
        &self,
        sensor_id: u64,
        start_time: &str,
        max_pages: u32,
    ) -> Result<Vec<MeasurementRow>> {
        let url = format!("{}/sensors/{}/measurements", self.base_url, sensor_id);
        let mut collected = Vec::new();

        for page in 1..=max_pages {
            let items = self.fetch_page(&url, start_time, page).await?;
            if items.results.is_empty() {
                debug!(page, "empty page, no more data");
                break;
            }

            collected.extend(
                items
                    .results
                    .into_iter()
                    .map(|raw| MeasurementRow::from_raw(sensor_id, raw)),
            );

            // Throttle between successful pages, but not after the last one.
            if page < max_pages {
                tokio::time::sleep(self.page_cooldown).await;
            }
        }

        info!(sensor_id, rows = collected.len(), "fetch complete");
        Ok(collected)
    }

    /// Fetch one page, driving the retry state machine until it terminates.
    async fn fetch_page(&self, url: &str, start_time: &str, page: u32) -> Result<MeasurementsPage> {
        let mut state = RetryState::initial();

        loop {
            let RetryState::Attempting { attempt } = state else {
                unreachable!("fetch_page loops only through Attempting states");
            };

            let response = self
                .client
                .get(url)
                .header("X-API-Key", &self.api_key)
                .query(&[
                    ("datetime_from", start_time.to_string()),
                    ("limit", self.page_size.to_string()),
                    ("page", page.to_string()),
                ])
                .send()
                .await
                .map_err(|source| ExtractError::Request { page, source })?;

            let status = response.status().as_u16();
            match self.policy.on_status(status, attempt) {
                RetryState::Succeeded => {
                    debug!(page, attempt, "page fetched");
                    return response
                        .json::<MeasurementsPage>()
                        .await
                        .map_err(|source| ExtractError::Decode { page, source });
                }
                backoff @ RetryState::Backoff { delay, .. } => {
                    warn!(
                        page,
                        status,
                        attempt,
                        delay_secs = delay.as_secs(),
                        "retryable status, backing off"
                    );
                    tokio::time::sleep(delay).await;
                    state = backoff.after_backoff();
                }
                RetryState::FailedPermanently { status, attempts } => {
                    return Err(if is_retryable(status) {
                        ExtractError::RetriesExhausted {
                            page,
                            status,
                            attempts,
                        }
                    } else {
                        ExtractError::PermanentStatus { page, status }
                    });
                }
                RetryState::Attempting { .. } => {
                    unreachable!("on_status never returns Attempting");
                }
            }
        }
    }
}
