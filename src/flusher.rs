use crate::config::{ErrorHandler, SuccessHandler};
use crate::metrics::LoggerMetrics;
use crate::record::Event;
use crate::retry::{send_with_retry, RetryPolicy};
use crate::session::SessionInfo;
use crate::transport::{AddEventsRequest, Transport};
use std::sync::Arc;
use tracing::{debug, error};
use url::Url;

/// Result of one flush.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushOutcome {
    /// The queue was empty; nothing was sent and no callback ran.
    Empty,
    /// The batch was accepted by the server.
    Delivered { events: usize },
    /// The batch was rejected or retries ran out; the error callback ran.
    Failed { events: usize },
}

impl FlushOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, FlushOutcome::Delivered { .. })
    }
}

/// Sends drained batches: builds the payload, retries, reports the outcome.
pub(crate) struct Flusher {
    transport: Arc<dyn Transport>,
    url: Url,
    api_key: String,
    session_id: String,
    session_info: Option<SessionInfo>,
    retry: RetryPolicy,
    on_success: Option<SuccessHandler>,
    on_error: Option<ErrorHandler>,
    metrics: Option<LoggerMetrics>,
}

pub(crate) struct FlusherConfig {
    pub transport: Arc<dyn Transport>,
    pub url: Url,
    pub api_key: String,
    pub session_id: String,
    pub session_info: Option<SessionInfo>,
    pub retry: RetryPolicy,
    pub on_success: Option<SuccessHandler>,
    pub on_error: Option<ErrorHandler>,
    pub metrics: Option<LoggerMetrics>,
}

impl Flusher {
    pub(crate) fn new(config: FlusherConfig) -> Self {
        Flusher {
            transport: config.transport,
            url: config.url,
            api_key: config.api_key,
            session_id: config.session_id,
            session_info: config.session_info,
            retry: config.retry,
            on_success: config.on_success,
            on_error: config.on_error,
            metrics: config.metrics,
        }
    }

    pub(crate) fn session_id(&self) -> &str {
        &self.session_id
    }

    pub(crate) fn metrics(&self) -> Option<&LoggerMetrics> {
        self.metrics.as_ref()
    }

    /// Ship one drained batch. Never fails: the outcome goes to the callbacks.
    pub(crate) async fn send_batch(&self, events: Vec<Event>) -> FlushOutcome {
        if events.is_empty() {
            return FlushOutcome::Empty;
        }

        let n_events = events.len();
        let request = AddEventsRequest {
            events,
            session: self.session_id.clone(),
            session_info: self.session_info.clone(),
            token: self.api_key.clone(),
        };

        debug!(events = n_events, url = %self.url, "flushing batch");

        let result = send_with_retry(&self.retry, |_| {
            self.transport.post_events(&self.url, &request)
        })
        .await;

        match result {
            Ok(resp) => {
                debug!(events = n_events, "batch delivered");
                if let Some(metrics) = &self.metrics {
                    metrics.success_requests.inc();
                }
                if let Some(on_success) = &self.on_success {
                    on_success(&resp);
                }
                FlushOutcome::Delivered { events: n_events }
            }
            Err(e) => {
                error!(events = n_events, attempts = e.attempts(), error = %e, "failed to deliver batch");
                if let Some(metrics) = &self.metrics {
                    metrics.failed_requests.inc();
                }
                if let Some(on_error) = &self.on_error {
                    on_error(&e);
                }
                FlushOutcome::Failed { events: n_events }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::ApiStatus;
    use crate::error::FlushError;
    use crate::record::Attributes;
    use crate::transport::{ApiResponse, BoxError};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Answers with a fixed script, then repeats the last entry.
    struct Scripted {
        answers: Mutex<Vec<Result<ApiResponse, String>>>,
        seen: Mutex<Vec<AddEventsRequest>>,
    }

    impl Scripted {
        fn new(answers: Vec<Result<ApiResponse, String>>) -> Arc<Self> {
            Arc::new(Self {
                answers: Mutex::new(answers),
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl Transport for Scripted {
        async fn post_events(
            &self,
            _url: &Url,
            request: &AddEventsRequest,
        ) -> Result<ApiResponse, BoxError> {
            self.seen.lock().unwrap().push(request.clone());
            let mut answers = self.answers.lock().unwrap();
            let next = if answers.len() > 1 {
                answers.remove(0)
            } else {
                answers[0].clone()
            };
            next.map_err(Into::into)
        }
    }

    fn flusher(
        transport: Arc<Scripted>,
        errors: Arc<Mutex<Vec<FlushError>>>,
        successes: Arc<Mutex<Vec<ApiResponse>>>,
    ) -> Flusher {
        Flusher::new(FlusherConfig {
            transport,
            url: Url::parse("https://api.scalyr.com/api/addEvents").unwrap(),
            api_key: "k".into(),
            session_id: "session-1".into(),
            session_info: None,
            retry: RetryPolicy::immediate(5),
            on_success: Some(Arc::new(move |resp: &ApiResponse| {
                successes.lock().unwrap().push(resp.clone())
            })),
            on_error: Some(Arc::new(move |e: &FlushError| errors.lock().unwrap().push(e.clone()))),
            metrics: Some(LoggerMetrics::new("flusher_test_", None).unwrap()),
        })
    }

    fn events(n: u64) -> Vec<Event> {
        (0..n)
            .map(|ts| Event {
                ts,
                sev: Some(3),
                attrs: Attributes::new(),
                thread: None,
            })
            .collect()
    }

    #[tokio::test]
    async fn empty_batch_is_a_noop() {
        let transport = Scripted::new(vec![Ok(ApiResponse::new(ApiStatus::Success))]);
        let errors = Arc::new(Mutex::new(Vec::new()));
        let successes = Arc::new(Mutex::new(Vec::new()));
        let flusher = flusher(transport.clone(), errors.clone(), successes.clone());

        assert_eq!(flusher.send_batch(Vec::new()).await, FlushOutcome::Empty);
        assert!(transport.seen.lock().unwrap().is_empty());
        assert!(errors.lock().unwrap().is_empty());
        assert!(successes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn success_builds_payload_and_calls_back() {
        let transport = Scripted::new(vec![Ok(ApiResponse::new(ApiStatus::Success))]);
        let errors = Arc::new(Mutex::new(Vec::new()));
        let successes = Arc::new(Mutex::new(Vec::new()));
        let flusher = flusher(transport.clone(), errors.clone(), successes.clone());

        let outcome = flusher.send_batch(events(3)).await;

        assert_eq!(outcome, FlushOutcome::Delivered { events: 3 });
        let seen = transport.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].session, "session-1");
        assert_eq!(seen[0].token, "k");
        assert_eq!(seen[0].events.iter().map(|e| e.ts).collect::<Vec<_>>(), vec![0, 1, 2]);
        assert_eq!(successes.lock().unwrap().len(), 1);
        assert!(errors.lock().unwrap().is_empty());
        assert_eq!(flusher.metrics().unwrap().success_requests.get(), 1);
    }

    #[tokio::test]
    async fn bad_param_fails_once_without_retry() {
        let transport = Scripted::new(vec![Ok(
            ApiResponse::new(ApiStatus::BadParam).with_message("missing session")
        )]);
        let errors = Arc::new(Mutex::new(Vec::new()));
        let successes = Arc::new(Mutex::new(Vec::new()));
        let flusher = flusher(transport.clone(), errors.clone(), successes.clone());

        let outcome = flusher.send_batch(events(1)).await;

        assert_eq!(outcome, FlushOutcome::Failed { events: 1 });
        assert_eq!(transport.seen.lock().unwrap().len(), 1);
        let errors = errors.lock().unwrap();
        assert_eq!(
            *errors,
            vec![FlushError::Rejected {
                message: "missing session".into(),
                attempts: 1
            }]
        );
        assert_eq!(flusher.metrics().unwrap().failed_requests.get(), 1);
    }

    #[tokio::test]
    async fn transport_errors_exhaust_retries() {
        let transport = Scripted::new(vec![Err("connection reset".to_string())]);
        let errors = Arc::new(Mutex::new(Vec::new()));
        let successes = Arc::new(Mutex::new(Vec::new()));
        let flusher = flusher(transport.clone(), errors.clone(), successes.clone());

        let outcome = flusher.send_batch(events(2)).await;

        assert_eq!(outcome, FlushOutcome::Failed { events: 2 });
        assert_eq!(transport.seen.lock().unwrap().len(), 6);
        let errors = errors.lock().unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0],
            FlushError::Exhausted {
                reason: "connection reset".into(),
                attempts: 6
            }
        );
        assert!(successes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn retry_then_success() {
        let transport = Scripted::new(vec![
            Ok(ApiResponse::new(ApiStatus::Other("error/server/backoff".into()))),
            Err("timeout".to_string()),
            Ok(ApiResponse::new(ApiStatus::Success)),
        ]);
        let errors = Arc::new(Mutex::new(Vec::new()));
        let successes = Arc::new(Mutex::new(Vec::new()));
        let flusher = flusher(transport.clone(), errors.clone(), successes.clone());

        assert!(flusher.send_batch(events(1)).await.is_success());
        assert_eq!(transport.seen.lock().unwrap().len(), 3);
        assert_eq!(successes.lock().unwrap().len(), 1);
        assert!(errors.lock().unwrap().is_empty());
    }
}
