#![allow(dead_code)]

use async_trait::async_trait;
use dataset_logger::constants::ApiStatus;
use dataset_logger::retry::RetryPolicy;
use dataset_logger::transport::{AddEventsRequest, ApiResponse, BoxError, Transport};
use dataset_logger::{FlushError, LoggerOptions};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use url::Url;

/// In-memory transport that records every request and answers from a
/// script, falling back to `default` once the script is used up.
pub struct RecordingTransport {
    requests: Mutex<Vec<AddEventsRequest>>,
    script: Mutex<VecDeque<Result<ApiResponse, String>>>,
    default: Result<ApiResponse, String>,
}

impl RecordingTransport {
    pub fn succeeding() -> Arc<Self> {
        Self::scripted(Vec::new(), Ok(ApiResponse::new(ApiStatus::Success)))
    }

    pub fn answering(status: ApiStatus) -> Arc<Self> {
        Self::scripted(Vec::new(), Ok(ApiResponse::new(status)))
    }

    pub fn scripted(
        script: Vec<Result<ApiResponse, String>>,
        default: Result<ApiResponse, String>,
    ) -> Arc<Self> {
        Arc::new(Self {
            requests: Mutex::new(Vec::new()),
            script: Mutex::new(script.into()),
            default,
        })
    }

    pub fn requests(&self) -> Vec<AddEventsRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn post_events(
        &self,
        _url: &Url,
        request: &AddEventsRequest,
    ) -> Result<ApiResponse, BoxError> {
        self.requests.lock().unwrap().push(request.clone());
        let answer = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.default.clone());
        answer.map_err(Into::into)
    }
}

/// Captures callback invocations.
#[derive(Clone, Default)]
pub struct Callbacks {
    pub errors: Arc<Mutex<Vec<FlushError>>>,
    pub successes: Arc<Mutex<Vec<ApiResponse>>>,
}

impl Callbacks {
    pub fn attach(&self, options: LoggerOptions) -> LoggerOptions {
        let errors = Arc::clone(&self.errors);
        let successes = Arc::clone(&self.successes);
        options
            .on_error(move |e| errors.lock().unwrap().push(e.clone()))
            .on_success(move |resp| successes.lock().unwrap().push(resp.clone()))
    }

    pub fn errors(&self) -> Vec<FlushError> {
        self.errors.lock().unwrap().clone()
    }

    pub fn success_count(&self) -> usize {
        self.successes.lock().unwrap().len()
    }
}

/// Default options for tests: no backoff between retries.
pub fn options() -> LoggerOptions {
    LoggerOptions::new("k").with_retry(RetryPolicy::immediate(5))
}
