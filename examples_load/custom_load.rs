use std::sync::Arc;
use std::time::Instant;
use tokio::time::Duration;
use tracing::{error, Level};

use dataset_logger::init::{init_tracing_with_config, LayerConfig};
use dataset_logger::noop_transport::NoopTransport;
use dataset_logger::{DataSetLogger, LoggerOptions};

#[tokio::main]
async fn main() {
    let options = LoggerOptions::new("load-test")
        .with_max_batch_size(1_000)
        .with_batching_interval(Duration::from_millis(200))
        .with_flattened_attributes(true)
        .with_metrics(None);

    let logger = DataSetLogger::with_transport(options, Arc::new(NoopTransport))
        .expect("build logger");

    let layer_config = LayerConfig {
        min_level: Level::WARN,
        enable_stdout: false,
    };
    init_tracing_with_config(logger.clone(), layer_config).expect("install subscriber");

    let n: u64 = 100_000;
    let start = Instant::now();

    for i in 0..n {
        error!(iteration = i, path = "/login", "custom load test error");
    }

    let elapsed = start.elapsed();
    println!("custom config: sent {} events in {:?} (~{:.0} ev/s)",
        n,
        elapsed,
        n as f64 / elapsed.as_secs_f64()
    );

    logger.close().await.expect("close logger");
    if let Some(metrics) = logger.metrics() {
        println!("successful flushes: {}", metrics.success_requests.get());
    }
}
