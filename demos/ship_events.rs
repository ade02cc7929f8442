use dataset_logger::init::init_tracing;
use dataset_logger::{DataSetLogger, LoggerOptions, NewEvent, SessionInfo, Severity};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let mut session_info = SessionInfo::new();
    session_info.insert("serverHost".into(), "demo-host".into());
    session_info.insert("serviceName".into(), "auth".into());

    let options = LoggerOptions::from_env()
        .unwrap_or_else(|_| LoggerOptions::new("replace-me"))
        .with_session_info(session_info)
        .on_error(|e| eprintln!("[dataset] flush failed: {e}"))
        .on_success(|resp| println!("[dataset] flush ok: {}", resp.status));

    let logger = DataSetLogger::new(options).expect("build logger");
    init_tracing(logger.clone()).expect("install subscriber");

    info!("starting service");

    logger.log("plain message");
    logger.log(
        NewEvent::message("payment declined")
            .with_severity(Severity::Warn)
            .with_attr("amount", 42),
    );

    error!(
        user_id = 42,
        reason = "invalid password",
        "authentication failed"
    );

    match logger.close().await {
        Ok(outcome) => println!("final flush: {outcome:?}"),
        Err(e) => eprintln!("close failed: {e}"),
    }
}
