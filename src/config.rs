use crate::constants::{
    DEFAULT_BATCHING_INTERVAL, DEFAULT_DATASET_URL, DEFAULT_METRICS_PREFIX, MAX_EVENTS_PER_BATCH,
};
use crate::env::{
    parse_flag, DATASET_API_KEY_ENV, DATASET_ENABLE_METRICS_ENV, DATASET_FLATTEN_ATTRIBUTES_ENV,
    DATASET_METRICS_PREFIX_ENV, DATASET_SERVER_URL_ENV,
};
use crate::error::{ConfigError, FlushError};
use crate::retry::RetryPolicy;
use crate::session::SessionInfo;
use crate::transport::ApiResponse;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Called once per failed flush.
pub type ErrorHandler = Arc<dyn Fn(&FlushError) + Send + Sync>;

/// Called once per successful flush with the server's answer.
pub type SuccessHandler = Arc<dyn Fn(&ApiResponse) + Send + Sync>;

/// Options accepted by [`DataSetLogger`](crate::logger::DataSetLogger).
///
/// **Fields**
/// - `api_key`: write token, required.
/// - `server_url`: base URL; `/api/addEvents` is resolved against it.
/// - `session_info`: metadata sent unchanged with every batch.
/// - `should_flatten_attributes`: flatten nested attributes and session
///   info into `.`-joined keys at enqueue time.
/// - `enable_metrics` / `metrics_prefix` / `metrics_registry`: Prometheus
///   instruments, see [`LoggerMetrics`](crate::metrics::LoggerMetrics).
/// - `batching_interval`: maximum time between two flushes.
/// - `max_batch_size`: queue length that forces an immediate flush.
/// - `retry`: retry policy for each flush.
/// - `on_error` / `on_success`: flush outcome callbacks.
#[derive(Clone)]
pub struct LoggerOptions {
    pub api_key: String,
    pub server_url: String,
    pub session_info: Option<SessionInfo>,
    pub should_flatten_attributes: bool,
    pub enable_metrics: bool,
    pub metrics_prefix: String,
    pub metrics_registry: Option<prometheus::Registry>,
    pub batching_interval: Duration,
    pub max_batch_size: usize,
    pub retry: RetryPolicy,
    pub on_error: Option<ErrorHandler>,
    pub on_success: Option<SuccessHandler>,
}

impl LoggerOptions {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            server_url: DEFAULT_DATASET_URL.to_string(),
            session_info: None,
            should_flatten_attributes: false,
            enable_metrics: false,
            metrics_prefix: DEFAULT_METRICS_PREFIX.to_string(),
            metrics_registry: None,
            batching_interval: DEFAULT_BATCHING_INTERVAL,
            max_batch_size: MAX_EVENTS_PER_BATCH,
            retry: RetryPolicy::default(),
            on_error: None,
            on_success: None,
        }
    }

    /// Build options from `DATASET_*` environment variables.
    ///
    /// **Returns**
    /// - `Err(ConfigError::MissingApiKey)` if `DATASET_API_KEY` is unset or empty.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(DATASET_API_KEY_ENV)
            .filter(|key| !key.is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        let mut options = Self::new(api_key);
        if let Some(url) = lookup(DATASET_SERVER_URL_ENV) {
            options.server_url = url;
        }
        if let Some(flag) = lookup(DATASET_FLATTEN_ATTRIBUTES_ENV) {
            options.should_flatten_attributes = parse_flag(&flag);
        }
        if let Some(flag) = lookup(DATASET_ENABLE_METRICS_ENV) {
            options.enable_metrics = parse_flag(&flag);
        }
        if let Some(prefix) = lookup(DATASET_METRICS_PREFIX_ENV) {
            options.metrics_prefix = prefix;
        }
        Ok(options)
    }

    pub fn with_server_url(mut self, url: impl Into<String>) -> Self {
        self.server_url = url.into();
        self
    }

    pub fn with_session_info(mut self, info: SessionInfo) -> Self {
        self.session_info = Some(info);
        self
    }

    pub fn with_flattened_attributes(mut self, flatten: bool) -> Self {
        self.should_flatten_attributes = flatten;
        self
    }

    pub fn with_metrics(mut self, registry: Option<prometheus::Registry>) -> Self {
        self.enable_metrics = true;
        self.metrics_registry = registry;
        self
    }

    pub fn with_batching_interval(mut self, interval: Duration) -> Self {
        self.batching_interval = interval;
        self
    }

    pub fn with_max_batch_size(mut self, size: usize) -> Self {
        self.max_batch_size = size.max(1);
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn on_error<F>(mut self, handler: F) -> Self
    where
        F: Fn(&FlushError) + Send + Sync + 'static,
    {
        self.on_error = Some(Arc::new(handler));
        self
    }

    pub fn on_success<F>(mut self, handler: F) -> Self
    where
        F: Fn(&ApiResponse) + Send + Sync + 'static,
    {
        self.on_success = Some(Arc::new(handler));
        self
    }
}

impl fmt::Debug for LoggerOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggerOptions")
            .field("api_key", &"<redacted>")
            .field("server_url", &self.server_url)
            .field("session_info", &self.session_info)
            .field("should_flatten_attributes", &self.should_flatten_attributes)
            .field("enable_metrics", &self.enable_metrics)
            .field("metrics_prefix", &self.metrics_prefix)
            .field("batching_interval", &self.batching_interval)
            .field("max_batch_size", &self.max_batch_size)
            .field("retry", &self.retry)
            .field("on_error", &self.on_error.is_some())
            .field("on_success", &self.on_success.is_some())
            .finish()
    }
}
