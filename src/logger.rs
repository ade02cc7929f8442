use crate::config::LoggerOptions;
use crate::constants::ENDPOINT_ADD_EVENTS;
use crate::endpoint::create_url;
use crate::error::{ConfigError, LoggerError};
use crate::flusher::{FlushOutcome, Flusher, FlusherConfig};
use crate::metrics::LoggerMetrics;
use crate::queue::BatchQueue;
use crate::record::NewEvent;
use crate::scheduler::FlushScheduler;
use crate::session::flatten_session_info;
use crate::transport::Transport;
use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use tokio::runtime::Handle;
use tracing::{debug, trace};

/// Buffers events and ships them to the DataSet `addEvents` API in batches.
///
/// A batch is flushed when the queue reaches `max_batch_size`, when the
/// batching timer fires, or on [`close`](Self::close). [`log`](Self::log)
/// never blocks and never fails; flush outcomes are reported through the
/// callbacks in [`LoggerOptions`].
///
/// Clones share the same queue and session.
#[derive(Clone)]
pub struct DataSetLogger {
    inner: Arc<Inner>,
}

struct Inner {
    queue: BatchQueue,
    scheduler: FlushScheduler,
    flusher: Flusher,
    closed: AtomicBool,
    runtime: Handle,
    flatten: bool,
    max_batch_size: usize,
    this: Weak<Inner>,
}

impl DataSetLogger {
    /// Construct a logger that talks HTTP via [`HttpTransport`](crate::http::HttpTransport).
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// **Returns**
    /// - `Err(ConfigError::MissingApiKey)` if the API key is empty.
    /// - `Err(ConfigError::InvalidUrl(..))` if the server URL can't be parsed.
    #[cfg(feature = "http")]
    pub fn new(options: LoggerOptions) -> Result<Self, ConfigError> {
        let transport = crate::http::HttpTransport::new()
            .map_err(|e| ConfigError::Transport(e.to_string()))?;
        Self::with_transport(options, Arc::new(transport))
    }

    /// Construct a logger on top of a custom [`Transport`].
    ///
    /// Generates the session id and arms the batching timer.
    pub fn with_transport(
        options: LoggerOptions,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, ConfigError> {
        if options.api_key.is_empty() {
            return Err(ConfigError::MissingApiKey);
        }

        let url = create_url(&options.server_url, ENDPOINT_ADD_EVENTS)?;
        let runtime = Handle::try_current().map_err(|_| ConfigError::NoRuntime)?;

        let metrics = if options.enable_metrics {
            Some(LoggerMetrics::new(
                &options.metrics_prefix,
                options.metrics_registry.clone(),
            )?)
        } else {
            None
        };

        let queue = match &metrics {
            Some(metrics) => BatchQueue::with_length_gauge(metrics.current_queue_length.clone()),
            None => BatchQueue::new(),
        };

        let session_info = match options.session_info {
            Some(info) if options.should_flatten_attributes => Some(flatten_session_info(&info)),
            other => other,
        };
        let session_id = uuid::Uuid::new_v4().to_string();

        let flusher = Flusher::new(FlusherConfig {
            transport,
            url,
            api_key: options.api_key,
            session_id,
            session_info,
            retry: options.retry,
            on_success: options.on_success,
            on_error: options.on_error,
            metrics,
        });

        let inner = Arc::new_cyclic(|this| Inner {
            queue,
            scheduler: FlushScheduler::new(options.batching_interval, runtime.clone()),
            flusher,
            closed: AtomicBool::new(false),
            runtime,
            flatten: options.should_flatten_attributes,
            max_batch_size: options.max_batch_size.max(1),
            this: this.clone(),
        });
        inner.rearm_timer();

        debug!(session = inner.flusher.session_id(), "DataSet logger started");
        Ok(DataSetLogger { inner })
    }

    /// Queue an event, or a plain message, for the next batch.
    ///
    /// Silently dropped once the logger is closed. Reaching the batch size
    /// spawns a flush without waiting for it.
    pub fn log(&self, event: impl Into<NewEvent>) {
        let inner = &self.inner;
        if inner.closed.load(Ordering::Acquire) {
            trace!("logger closed, dropping event");
            return;
        }

        let event = event.into().into_event(Utc::now(), inner.flatten);
        let len = inner.queue.append(event);

        // An append racing `close` still gets its own flush.
        if len >= inner.max_batch_size || inner.closed.load(Ordering::Acquire) {
            inner.spawn_flush();
        }
    }

    /// Flush whatever is queued now and wait for the outcome.
    pub async fn flush(&self) -> FlushOutcome {
        self.inner.flush().await
    }

    /// Stop the timer and flush the remaining events.
    ///
    /// In-flight flushes are not cancelled.
    ///
    /// **Returns**
    /// - `Ok(outcome)` of the final flush.
    /// - `Err(LoggerError::AlreadyClosed)` on every call after the first.
    pub async fn close(&self) -> Result<FlushOutcome, LoggerError> {
        if self.inner.closed.swap(true, Ordering::AcqRel) {
            return Err(LoggerError::AlreadyClosed);
        }
        self.inner.scheduler.stop();
        debug!(session = self.session_id(), "closing DataSet logger");

        Ok(self.inner.flush().await)
    }

    /// Identifier of this logger's upload session.
    pub fn session_id(&self) -> &str {
        self.inner.flusher.session_id()
    }

    /// Events currently waiting for a flush.
    pub fn queue_len(&self) -> usize {
        self.inner.queue.len()
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    /// Prometheus instruments, when enabled.
    pub fn metrics(&self) -> Option<&LoggerMetrics> {
        self.inner.flusher.metrics()
    }
}

impl std::fmt::Debug for DataSetLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataSetLogger")
            .field("session_id", &self.session_id())
            .field("queue_len", &self.queue_len())
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl Inner {
    async fn flush(&self) -> FlushOutcome {
        self.rearm_timer();

        let batch = self.queue.drain_all();
        self.flusher.send_batch(batch).await
    }

    fn spawn_flush(&self) {
        let Some(inner) = self.this.upgrade() else {
            return;
        };
        self.runtime.spawn(async move {
            inner.flush().await;
        });
    }

    fn rearm_timer(&self) {
        let this = self.this.clone();
        self.scheduler.rearm(move || {
            if let Some(inner) = this.upgrade() {
                inner.spawn_flush();
            }
        });
    }
}
