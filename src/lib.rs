pub mod config;
pub mod constants;
pub mod endpoint;
pub mod env;
pub mod error;
pub mod flatten;
pub mod flusher;
pub mod layer;
pub mod logger;
pub mod metrics;
pub mod noop_transport;
pub mod queue;
pub mod record;
pub mod retry;
pub mod session;
pub mod transport;

mod scheduler;

#[cfg(feature = "http")]
pub mod http;
#[cfg(feature = "http")]
pub mod upload;

pub mod init;

pub use config::LoggerOptions;
pub use error::{ConfigError, FlushError, LoggerError, UploadError};
pub use flusher::FlushOutcome;
pub use logger::DataSetLogger;
pub use record::{Event, NewEvent, Severity};
pub use session::{SessionInfo, SessionValue};
