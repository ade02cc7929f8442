use crate::constants::ApiStatus;
use crate::record::Event;
use crate::session::SessionInfo;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::error::Error;
use url::Url;

/// Boxed error returned by a single transport attempt.
pub type BoxError = Box<dyn Error + Send + Sync>;

/// Body of an `addEvents` request.
#[derive(Debug, Clone, Serialize)]
pub struct AddEventsRequest {
    pub events: Vec<Event>,
    pub session: String,
    #[serde(rename = "sessionInfo", skip_serializing_if = "Option::is_none")]
    pub session_info: Option<SessionInfo>,
    pub token: String,
}

/// Response body returned by the DataSet API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: ApiStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Any other fields the server included.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
    /// HTTP status code, when the transport speaks HTTP.
    #[serde(skip)]
    pub http_status: Option<u16>,
}

impl ApiResponse {
    pub fn new(status: ApiStatus) -> Self {
        ApiResponse {
            status,
            message: None,
            extra: Map::new(),
            http_status: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Destination for batched events.
///
/// Implementations perform exactly one request per call; retrying is the
/// caller's job, which keeps the retry policy independent of any particular
/// HTTP client.
#[async_trait]
pub trait Transport: Send + Sync {
    /// POST one batch to `url`.
    ///
    /// **Returns**
    /// - `Ok(response)` if the server answered with a decodable body,
    ///   whatever its `status`.
    /// - `Err(..)` on network failure or an undecodable answer. The flush
    ///   engine treats this as transient.
    async fn post_events(&self, url: &Url, request: &AddEventsRequest)
        -> Result<ApiResponse, BoxError>;
}
