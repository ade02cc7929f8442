use crate::logger::DataSetLogger;
use crate::record::{Attributes, NewEvent, Severity};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

/// `tracing_subscriber` layer that forwards events to a [`DataSetLogger`].
///
/// By default only `ERROR` events are forwarded. Events emitted by this
/// crate or by the HTTP stack it flushes through are always ignored, so
/// flush diagnostics never loop back into the queue.
pub struct DataSetLayer {
    logger: DataSetLogger,
    min_level: Level,
    /// Total events seen by the layer (before filtering by level).
    pub total_events: Arc<AtomicU64>,
    /// Events handed to the logger.
    pub forwarded_events: Arc<AtomicU64>,
}

impl DataSetLayer {
    pub fn new(logger: DataSetLogger) -> Self {
        Self::with_min_level(logger, Level::ERROR)
    }

    /// Forward events at `min_level` or more severe.
    pub fn with_min_level(logger: DataSetLogger, min_level: Level) -> Self {
        Self {
            logger,
            min_level,
            total_events: Arc::new(AtomicU64::new(0)),
            forwarded_events: Arc::new(AtomicU64::new(0)),
        }
    }
}

/// Map a `tracing` level onto the DataSet severity bands.
pub fn level_to_severity(level: &Level) -> Severity {
    match *level {
        Level::ERROR => Severity::Error,
        Level::WARN => Severity::Warn,
        _ => Severity::Info,
    }
}

/// Crates on the flush path. Their errors during an outage would otherwise
/// be queued and shipped through the same failing path.
const TRANSPORT_TARGETS: &[&str] = &["reqwest", "hyper", "hyper_util", "h2", "rustls", "tokio_rustls"];

fn in_crate(target: &str, krate: &str) -> bool {
    target == krate
        || target
            .strip_prefix(krate)
            .is_some_and(|rest| rest.starts_with("::"))
}

fn is_own_target(target: &str) -> bool {
    in_crate(target, env!("CARGO_CRATE_NAME"))
        || TRANSPORT_TARGETS.iter().any(|krate| in_crate(target, krate))
}

impl<S> Layer<S> for DataSetLayer
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    fn on_event(&self, event: &Event, _ctx: Context<'_, S>) {
        self.total_events.fetch_add(1, Ordering::Relaxed);

        let meta = event.metadata();
        if *meta.level() > self.min_level || is_own_target(meta.target()) {
            return;
        }

        let mut attrs = Attributes::new();
        event.record(&mut FieldVisitor { attrs: &mut attrs });
        attrs.insert("logger".to_string(), meta.target().into());

        let mut record = NewEvent::new()
            .with_attrs(attrs)
            .with_severity(level_to_severity(meta.level()));
        if let Some(name) = std::thread::current().name() {
            record = record.with_thread(name);
        }

        self.logger.log(record);
        self.forwarded_events.fetch_add(1, Ordering::Relaxed);
    }
}

/// Collects event fields as JSON attributes; `message` is kept as-is.
pub struct FieldVisitor<'a> {
    pub attrs: &'a mut Attributes,
}

impl<'a> Visit for FieldVisitor<'a> {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.attrs.insert(field.name().to_string(), value.into());
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.attrs.insert(field.name().to_string(), value.into());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.attrs.insert(field.name().to_string(), value.into());
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.attrs.insert(field.name().to_string(), value.into());
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.attrs.insert(field.name().to_string(), value.into());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.attrs
            .insert(field.name().to_string(), format!("{:?}", value).into());
    }
}
