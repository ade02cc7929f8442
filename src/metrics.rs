use prometheus::{IntCounter, IntGauge, Registry};

/// Prometheus instruments exported by a logger when metrics are enabled.
#[derive(Clone)]
pub struct LoggerMetrics {
    registry: Registry,
    /// Events currently waiting in the queue.
    pub current_queue_length: IntGauge,
    /// Flushes that ended with the success status.
    pub success_requests: IntCounter,
    /// Flushes that ended with a terminal failure.
    pub failed_requests: IntCounter,
}

impl LoggerMetrics {
    /// Create the instruments with `prefix` and register them.
    ///
    /// **Parameters**
    /// - `prefix`: prepended to every metric name, e.g. `dataset_logger_`.
    /// - `registry`: registry to register into; a private one is created
    ///   when `None`.
    ///
    /// **Returns**
    /// - `Err(..)` if a name is invalid or already registered.
    pub fn new(prefix: &str, registry: Option<Registry>) -> Result<Self, prometheus::Error> {
        let registry = registry.unwrap_or_default();

        let current_queue_length = IntGauge::new(
            format!("{prefix}current_queue_length"),
            "Number of events waiting to be flushed",
        )?;
        registry.register(Box::new(current_queue_length.clone()))?;

        let success_requests = IntCounter::new(
            format!("{prefix}success_requests_counter"),
            "Number of addEvents requests accepted by the server",
        )?;
        registry.register(Box::new(success_requests.clone()))?;

        let failed_requests = IntCounter::new(
            format!("{prefix}failed_requests_counter"),
            "Number of addEvents requests that failed for good",
        )?;
        registry.register(Box::new(failed_requests.clone()))?;

        Ok(Self {
            registry,
            current_queue_length,
            success_requests,
            failed_requests,
        })
    }

    /// Registry holding the instruments, for scraping.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}
