use dataset_logger::upload::{upload_logs, UploadLogsOptions};
use dataset_logger::SessionInfo;

#[tokio::main]
async fn main() {
    let path = std::env::args().nth(1).unwrap_or_else(|| "app.log".to_string());
    let api_key = dataset_logger::env::env_or(dataset_logger::env::DATASET_API_KEY_ENV, "");

    let mut session_info = SessionInfo::new();
    session_info.insert("serverHost".into(), "batch-job".into());

    let result = upload_logs(UploadLogsOptions {
        file_path: Some(path.into()),
        logfile: Some("app.log".into()),
        parser: Some("json".into()),
        session_info: Some(session_info),
        ..UploadLogsOptions::new(api_key)
    })
    .await;

    match result {
        Ok(resp) => println!("uploaded: {} ({:?})", resp.status, resp.status_code),
        Err(e) => eprintln!("upload failed: {e}"),
    }
}
