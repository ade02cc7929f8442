use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Default DataSet (Scalyr) API host.
pub const DEFAULT_DATASET_URL: &str = "https://api.scalyr.com";

/// Structured event ingestion endpoint.
pub const ENDPOINT_ADD_EVENTS: &str = "/api/addEvents";

/// Plain-text log ingestion endpoint.
pub const ENDPOINT_UPLOAD_LOGS: &str = "/api/uploadLogs";

/// Number of queued events that forces an immediate flush.
///
/// The server rejects request bodies above [`MAX_REQUEST_BYTES`]. The batch
/// trigger only counts events, so very large events can still exceed it.
pub const MAX_EVENTS_PER_BATCH: usize = 200;

/// Request body ceiling documented for `addEvents`.
pub const MAX_REQUEST_BYTES: usize = 6 * 1024 * 1024;

/// Time between two timer-triggered flushes.
pub const DEFAULT_BATCHING_INTERVAL: Duration = Duration::from_millis(3_000);

/// Retries issued after the first attempt of a request.
pub const DEFAULT_RETRY_LIMIT: u32 = 5;

pub const DEFAULT_METRICS_PREFIX: &str = "dataset_logger_";

/// `status` field of an API response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ApiStatus {
    Success,
    BadParam,
    Other(String),
}

impl ApiStatus {
    pub const SUCCESS: &'static str = "success";
    pub const BAD_PARAM: &'static str = "error/client/badParam";

    pub fn as_str(&self) -> &str {
        match self {
            ApiStatus::Success => Self::SUCCESS,
            ApiStatus::BadParam => Self::BAD_PARAM,
            ApiStatus::Other(s) => s,
        }
    }
}

impl From<String> for ApiStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            Self::SUCCESS => ApiStatus::Success,
            Self::BAD_PARAM => ApiStatus::BadParam,
            _ => ApiStatus::Other(value),
        }
    }
}

impl From<ApiStatus> for String {
    fn from(value: ApiStatus) -> Self {
        match value {
            ApiStatus::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for ApiStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
