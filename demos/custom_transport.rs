use std::sync::Arc;

use async_trait::async_trait;
use dataset_logger::constants::ApiStatus;
use dataset_logger::transport::{AddEventsRequest, ApiResponse, BoxError, Transport};
use dataset_logger::{DataSetLogger, LoggerOptions};
use url::Url;

/// Example of plugging in a completely custom transport by implementing
/// the `Transport` trait directly. Imagine this forwards batches through
/// an internal relay instead of talking to DataSet over HTTP.
struct StdoutTransport;

#[async_trait]
impl Transport for StdoutTransport {
    async fn post_events(&self, url: &Url, request: &AddEventsRequest) -> Result<ApiResponse, BoxError> {
        // For the sake of example we just print the batch.
        println!("[relay] {} events for {} (session {})", request.events.len(), url, request.session);
        Ok(ApiResponse::new(ApiStatus::Success))
    }
}

#[tokio::main]
async fn main() {
    let logger = DataSetLogger::with_transport(LoggerOptions::new("relay"), Arc::new(StdoutTransport))
        .expect("build logger");

    logger.log("custom transport example started");
    logger.log("simulated error sent via custom transport");

    logger.close().await.expect("close logger");
}
