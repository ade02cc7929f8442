//! Plain-text log upload through `/api/uploadLogs`.
//!
//! Unlike [`DataSetLogger`](crate::logger::DataSetLogger) there is no
//! batching here: one call is one request (plus retries). Useful for
//! lightweight integrations and for uploading whole files from stateless
//! jobs.

use crate::constants::{ApiStatus, DEFAULT_DATASET_URL, ENDPOINT_UPLOAD_LOGS};
use crate::endpoint::create_url;
use crate::error::UploadError;
use crate::http::DEFAULT_REQUEST_TIMEOUT;
use crate::retry::{send_with_retry, RetryPolicy};
use crate::session::{convert_session_info_to_headers, SessionInfo};
use crate::transport::{ApiResponse, BoxError};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Body, Client};
use std::path::PathBuf;
use tokio_util::io::ReaderStream;
use tracing::debug;
use url::Url;

/// Parameters of a plain-text upload.
///
/// Exactly one of `body` and `file_path` is used; `body` wins when both
/// are set.
#[derive(Debug, Clone, Default)]
pub struct UploadLogsOptions {
    pub api_key: String,
    pub body: Option<String>,
    pub file_path: Option<PathBuf>,
    /// Sent as the `logfile` header.
    pub logfile: Option<String>,
    /// Sent as the `parser` header.
    pub parser: Option<String>,
    pub server_url: Option<String>,
    /// Sent as `server-*` headers.
    pub session_info: Option<SessionInfo>,
    pub retry: RetryPolicy,
}

impl UploadLogsOptions {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }
}

/// Outcome of an accepted upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadResponse {
    pub status: ApiStatus,
    pub message: Option<String>,
    pub status_code: Option<u16>,
}

enum Payload {
    Text(String),
    File(PathBuf),
}

/// Upload unstructured log text to DataSet.
///
/// **Returns**
/// - `Ok(UploadResponse)` once the server answers `success`.
/// - `Err(UploadError::FileNotFound(..))` before any request if
///   `file_path` does not exist.
/// - `Err(UploadError::Request(..))` if the server rejected the upload or
///   retries ran out.
pub async fn upload_logs(options: UploadLogsOptions) -> Result<UploadResponse, UploadError> {
    if options.api_key.is_empty() {
        return Err(UploadError::MissingApiKey);
    }

    let base = options.server_url.as_deref().unwrap_or(DEFAULT_DATASET_URL);
    let url = create_url(base, ENDPOINT_UPLOAD_LOGS)?;
    let headers = build_headers(&options)?;

    let payload = match (options.body, options.file_path) {
        (Some(body), _) if !body.is_empty() => Payload::Text(body),
        (_, Some(path)) => {
            if !tokio::fs::try_exists(&path).await? {
                return Err(UploadError::FileNotFound(path));
            }
            Payload::File(path)
        }
        _ => return Err(UploadError::MissingBody),
    };

    let client = Client::builder().timeout(DEFAULT_REQUEST_TIMEOUT).build()?;

    let resp = send_with_retry(&options.retry, |attempt| {
        send_once(&client, &url, &headers, &payload, attempt)
    })
    .await?;

    Ok(UploadResponse {
        status: resp.status,
        message: resp.message,
        status_code: resp.http_status,
    })
}

async fn send_once(
    client: &Client,
    url: &Url,
    headers: &HeaderMap,
    payload: &Payload,
    attempt: u32,
) -> Result<ApiResponse, BoxError> {
    // A file is re-opened on every attempt since a stream can't be replayed.
    let body = match payload {
        Payload::Text(text) => Body::from(text.clone()),
        Payload::File(path) => {
            let file = tokio::fs::File::open(path).await?;
            Body::wrap_stream(ReaderStream::new(file))
        }
    };

    debug!(%url, attempt, "uploading logs");
    let resp = client
        .post(url.clone())
        .headers(headers.clone())
        .body(body)
        .send()
        .await?;

    let status = resp.status();
    let text = resp.text().await?;
    let mut answer = serde_json::from_str::<ApiResponse>(&text).map_err(|e| {
        format!("unexpected uploadLogs response with HTTP status {status}: {e}: {text}")
    })?;
    answer.http_status = Some(status.as_u16());
    Ok(answer)
}

fn build_headers(options: &UploadLogsOptions) -> Result<HeaderMap, UploadError> {
    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        header_value("authorization", &format!("Bearer {}", options.api_key))?,
    );
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));

    if let Some(logfile) = &options.logfile {
        headers.insert("logfile", header_value("logfile", logfile)?);
    }
    if let Some(parser) = &options.parser {
        headers.insert("parser", header_value("parser", parser)?);
    }

    for (name, value) in convert_session_info_to_headers(options.session_info.as_ref()) {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| UploadError::InvalidHeader(name.clone()))?;
        headers.insert(header_name, header_value(&name, &value)?);
    }
    Ok(headers)
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue, UploadError> {
    HeaderValue::from_str(value).map_err(|_| UploadError::InvalidHeader(name.to_string()))
}
