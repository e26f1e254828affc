//! Endpoint and polling configuration.
//!
//! Defaults point at the public QED deployment of HMS and poll every five
//! seconds.

use std::time::Duration;

/// Base URL of the v3 submit API; `{component}/{dataset}/` is appended.
pub const DEFAULT_BASE_URL: &str = "https://qed.epacdx.net/hms/rest/api/v3";

/// Job status/data endpoint, queried with `?job_id=`.
pub const DEFAULT_DATA_URL: &str = "https://qed.epacdx.net/hms/rest/api/v2/hms/data";

/// Swagger document carrying an example request body per dataset.
pub const DEFAULT_SWAGGER_URL: &str = "https://qed.epacdx.net/hms/api_doc/swagger/";

/// File the job result is written to.
pub const DEFAULT_OUTPUT_FILE: &str = "hms-data.json";

pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;
pub const DEFAULT_POLL_TIMEOUT_SECS: u64 = 30 * 60;
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_INITIAL_BACKOFF_MILLIS: u64 = 1000;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Where the HMS endpoints live and how long a single request may take.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub data_url: String,
    pub swagger_url: String,
    /// Per-request limit; `None` leaves requests unbounded.
    pub request_timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            base_url: DEFAULT_BASE_URL.to_string(),
            data_url: DEFAULT_DATA_URL.to_string(),
            swagger_url: DEFAULT_SWAGGER_URL.to_string(),
            request_timeout: Some(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS)),
        }
    }
}

impl ClientConfig {
    /// `{base_url}/{component}/{dataset}/`, tolerant of a trailing slash on the base.
    pub fn submit_url(&self, component: &str, dataset: &str) -> String {
        format!(
            "{}/{}/{}/",
            self.base_url.trim_end_matches('/'),
            component,
            dataset
        )
    }
}

/// How a submitted job is polled until it reaches a terminal status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollPolicy {
    /// Sleep before every status request.
    pub interval: Duration,
    /// Upper bound on the whole polling phase; `None` polls forever.
    pub timeout: Option<Duration>,
    /// Consecutive transient failures tolerated before giving up.
    pub max_retries: u32,
    /// First backoff delay, doubled on each further consecutive failure.
    pub initial_backoff: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        PollPolicy {
            interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            timeout: Some(Duration::from_secs(DEFAULT_POLL_TIMEOUT_SECS)),
            max_retries: DEFAULT_MAX_RETRIES,
            initial_backoff: Duration::from_millis(DEFAULT_INITIAL_BACKOFF_MILLIS),
        }
    }
}

impl PollPolicy {
    /// Backoff before retrying after the `failures`-th consecutive failure (1-based).
    pub fn backoff(&self, failures: u32) -> Duration {
        let exponent = failures.saturating_sub(1).min(16);
        self.initial_backoff.saturating_mul(1u32 << exponent)
    }
}
