use std::path::PathBuf;

/// Error returned by [`create_url`](crate::endpoint::create_url).
#[derive(thiserror::Error, Debug)]
#[error("could not build the URL from {base:?}: {source}")]
pub struct UrlError {
    pub base: String,
    #[source]
    pub source: url::ParseError,
}

/// Error type returned when constructing a [`DataSetLogger`](crate::logger::DataSetLogger).
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("apiKey is required")]
    MissingApiKey,

    #[error(transparent)]
    InvalidUrl(#[from] UrlError),

    #[error("a tokio runtime is required to drive background flushes")]
    NoRuntime,

    #[error("failed to register metrics: {0}")]
    Metrics(#[from] prometheus::Error),

    #[error("failed to build transport: {0}")]
    Transport(String),
}

/// Lifecycle misuse of a logger.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum LoggerError {
    #[error("DataSetLogger is already closed")]
    AlreadyClosed,
}

/// Terminal failure of one flush, handed to the error callback.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FlushError {
    /// The server answered with the client-error sentinel.
    #[error("request rejected by server: {message}")]
    Rejected { message: String, attempts: u32 },

    /// No definitive answer before the retry limit.
    #[error("request failed after {attempts} attempts: {reason}")]
    Exhausted { reason: String, attempts: u32 },
}

impl FlushError {
    /// Number of requests issued before giving up.
    pub fn attempts(&self) -> u32 {
        match self {
            FlushError::Rejected { attempts, .. } | FlushError::Exhausted { attempts, .. } => {
                *attempts
            }
        }
    }
}

/// Error type returned by [`upload_logs`](crate::upload::upload_logs).
#[derive(thiserror::Error, Debug)]
pub enum UploadError {
    #[error("apiKey is required")]
    MissingApiKey,

    #[error(transparent)]
    InvalidUrl(#[from] UrlError),

    #[error("File {} does not exist", .0.display())]
    FileNotFound(PathBuf),

    #[error("either a body or a file path must be provided")]
    MissingBody,

    #[error("invalid header value for {0}")]
    InvalidHeader(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "http")]
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error(transparent)]
    Request(#[from] FlushError),
}
