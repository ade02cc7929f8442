use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Descriptive metadata attached to every batch of a session.
pub type SessionInfo = BTreeMap<String, SessionValue>;

/// Value of a session-info entry.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionValue {
    String(String),
    Number(serde_json::Number),
    Bool(bool),
    /// Serialized as RFC 3339 in JSON bodies and as epoch milliseconds in headers.
    Date(DateTime<Utc>),
    Json(Value),
}

impl SessionValue {
    /// Header representation used by the plain-text upload endpoint.
    pub fn to_header_value(&self) -> String {
        match self {
            SessionValue::String(s) => s.clone(),
            SessionValue::Number(n) => n.to_string(),
            SessionValue::Bool(b) => b.to_string(),
            SessionValue::Date(d) => d.timestamp_millis().to_string(),
            SessionValue::Json(Value::String(s)) => s.clone(),
            SessionValue::Json(v) => v.to_string(),
        }
    }

    fn to_json(&self) -> Value {
        match self {
            SessionValue::String(s) => Value::String(s.clone()),
            SessionValue::Number(n) => Value::Number(n.clone()),
            SessionValue::Bool(b) => Value::Bool(*b),
            SessionValue::Date(d) => {
                Value::String(d.to_rfc3339_opts(SecondsFormat::Millis, true))
            }
            SessionValue::Json(v) => v.clone(),
        }
    }
}

impl Serialize for SessionValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl From<&str> for SessionValue {
    fn from(value: &str) -> Self {
        SessionValue::String(value.to_string())
    }
}

impl From<String> for SessionValue {
    fn from(value: String) -> Self {
        SessionValue::String(value)
    }
}

impl From<bool> for SessionValue {
    fn from(value: bool) -> Self {
        SessionValue::Bool(value)
    }
}

impl From<i64> for SessionValue {
    fn from(value: i64) -> Self {
        SessionValue::Number(value.into())
    }
}

impl From<u64> for SessionValue {
    fn from(value: u64) -> Self {
        SessionValue::Number(value.into())
    }
}

impl From<DateTime<Utc>> for SessionValue {
    fn from(value: DateTime<Utc>) -> Self {
        SessionValue::Date(value)
    }
}

impl From<Value> for SessionValue {
    fn from(value: Value) -> Self {
        match value {
            Value::String(s) => SessionValue::String(s),
            Value::Number(n) => SessionValue::Number(n),
            Value::Bool(b) => SessionValue::Bool(b),
            other => SessionValue::Json(other),
        }
    }
}

/// Expand nested `Json` entries into `.`-joined keys.
pub fn flatten_session_info(info: &SessionInfo) -> SessionInfo {
    let mut out = SessionInfo::new();
    for (key, value) in info {
        match value {
            SessionValue::Json(nested @ (Value::Object(_) | Value::Array(_))) => {
                let mut wrapper = Map::new();
                wrapper.insert(key.clone(), nested.clone());
                for (flat_key, leaf) in crate::flatten::flatten_nested_object(&wrapper) {
                    out.insert(flat_key, SessionValue::from(leaf));
                }
            }
            other => {
                out.insert(key.clone(), other.clone());
            }
        }
    }
    out
}

/// `serverHost` -> `server-host`.
pub fn camel_to_kebab_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    for c in s.chars() {
        if c.is_ascii_uppercase() {
            out.push('-');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Convert session info to `server-*` headers for the upload endpoint.
///
/// Keys are kebab-cased and prefixed with `server-` unless they already
/// carry it.
pub fn convert_session_info_to_headers(info: Option<&SessionInfo>) -> BTreeMap<String, String> {
    let Some(info) = info else {
        return BTreeMap::new();
    };

    info.iter()
        .map(|(key, value)| {
            let name = camel_to_kebab_case(key);
            let name = if name.starts_with("server-") {
                name
            } else {
                format!("server-{name}")
            };
            (name, value.to_header_value())
        })
        .collect()
}
