use crate::transport::{AddEventsRequest, ApiResponse, BoxError, Transport};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Default per-request timeout of [`HttpTransport`].
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// `reqwest`-backed implementation of [`Transport`].
///
/// Sends the batch as a JSON body and decodes the JSON status answer. Any
/// response whose body is not a DataSet status document is reported as an
/// error so the flush engine retries it.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Construct a transport with rustls and [`DEFAULT_REQUEST_TIMEOUT`].
    ///
    /// **Returns**
    /// - `Err(..)` if the TLS backend could not be initialised.
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(DEFAULT_REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { client })
    }

    /// Wrap an existing client, e.g. one with custom proxies or timeouts.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post_events(
        &self,
        url: &Url,
        request: &AddEventsRequest,
    ) -> Result<ApiResponse, BoxError> {
        let resp = self
            .client
            .post(url.clone())
            .json(request)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;
        debug!(%url, %status, "addEvents answered");

        let mut body = serde_json::from_str::<ApiResponse>(&text).map_err(|e| {
            format!("unexpected addEvents response with HTTP status {status}: {e}: {text}")
        })?;
        body.http_status = Some(status.as_u16());
        Ok(body)
    }
}
