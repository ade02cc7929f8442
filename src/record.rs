use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Event attributes as sent in the `attrs` field.
pub type Attributes = Map<String, Value>;

/// Severity ordinals understood by the DataSet API.
///
/// `<= 3` is info, `4` warn, `5` error and anything above is danger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info = 3,
    Warn = 4,
    Error = 5,
    Danger = 6,
}

impl Severity {
    /// Band an arbitrary ordinal falls into.
    pub fn from_ordinal(sev: i32) -> Self {
        match sev {
            i32::MIN..=3 => Severity::Info,
            4 => Severity::Warn,
            5 => Severity::Error,
            _ => Severity::Danger,
        }
    }

    pub fn ordinal(self) -> i32 {
        self as i32
    }
}

impl From<Severity> for i32 {
    fn from(value: Severity) -> Self {
        value.ordinal()
    }
}

/// One queued event, in its wire shape.
///
/// Once appended to the queue an `Event` is never modified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Nanoseconds since the Unix epoch.
    pub ts: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sev: Option<i32>,
    pub attrs: Attributes,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread: Option<String>,
}

impl Event {
    pub fn severity(&self) -> Severity {
        Severity::from_ordinal(self.sev.unwrap_or(Severity::Info.ordinal()))
    }
}

/// Event supplied by the application; timestamp and severity are optional.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewEvent {
    pub ts: Option<u64>,
    pub sev: Option<i32>,
    pub attrs: Attributes,
    pub thread: Option<String>,
}

impl NewEvent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Event whose only attribute is `message`.
    pub fn message(message: impl Into<String>) -> Self {
        Self::new().with_attr("message", message.into())
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    pub fn with_attrs(mut self, attrs: Attributes) -> Self {
        self.attrs.extend(attrs);
        self
    }

    pub fn with_severity(mut self, sev: impl Into<i32>) -> Self {
        self.sev = Some(sev.into());
        self
    }

    pub fn with_thread(mut self, thread: impl Into<String>) -> Self {
        self.thread = Some(thread.into());
        self
    }

    pub fn with_timestamp(mut self, ts: DateTime<Utc>) -> Self {
        self.ts = Some(timestamp_nanos(ts));
        self
    }

    pub fn with_timestamp_nanos(mut self, ts: u64) -> Self {
        self.ts = Some(ts);
        self
    }

    /// Fill in defaults and produce the queued form.
    ///
    /// A caller-supplied timestamp wins over `now`; severity defaults to
    /// [`Severity::Info`].
    pub(crate) fn into_event(self, now: DateTime<Utc>, flatten: bool) -> Event {
        let attrs = if flatten {
            crate::flatten::flatten_nested_object(&self.attrs)
        } else {
            self.attrs
        };

        Event {
            ts: self.ts.unwrap_or_else(|| timestamp_nanos(now)),
            sev: Some(self.sev.unwrap_or(Severity::Info.ordinal())),
            attrs,
            thread: self.thread,
        }
    }
}

impl From<&str> for NewEvent {
    fn from(value: &str) -> Self {
        NewEvent::message(value)
    }
}

impl From<String> for NewEvent {
    fn from(value: String) -> Self {
        NewEvent::message(value)
    }
}

impl From<Event> for NewEvent {
    fn from(value: Event) -> Self {
        NewEvent {
            ts: Some(value.ts),
            sev: value.sev,
            attrs: value.attrs,
            thread: value.thread,
        }
    }
}

/// Nanoseconds since the epoch, clamped to zero for pre-epoch instants.
pub fn timestamp_nanos(at: DateTime<Utc>) -> u64 {
    match at.timestamp_nanos_opt() {
        Some(ns) => ns.max(0) as u64,
        None => (at.timestamp_millis().max(0) as u64).saturating_mul(1_000_000),
    }
}
