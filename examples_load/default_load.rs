use std::sync::Arc;
use std::time::Instant;

use dataset_logger::noop_transport::NoopTransport;
use dataset_logger::{DataSetLogger, LoggerOptions};

#[tokio::main]
async fn main() {
    let logger = DataSetLogger::with_transport(LoggerOptions::new("load-test"), Arc::new(NoopTransport))
        .expect("build logger");

    let n: u64 = 100_000;
    let start = Instant::now();

    for i in 0..n {
        logger.log(format!("default load test event {i}"));
    }

    let elapsed = start.elapsed();
    println!("default config: queued {} events in {:?} (~{:.0} ev/s)",
        n,
        elapsed,
        n as f64 / elapsed.as_secs_f64()
    );

    let outcome = logger.close().await.expect("close logger");
    println!("final flush: {:?}", outcome);
}
