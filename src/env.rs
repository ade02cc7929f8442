//! Environment variable names used by this crate for convenient
//! configuration of loggers from services.
//!
//! These are purely helpers; [`DataSetLogger`](crate::logger::DataSetLogger)
//! itself never reads the environment.

/// API key with write access (`token` in `addEvents`).
pub const DATASET_API_KEY_ENV: &str = "DATASET_API_KEY";

/// Server URL, e.g. `https://app.eu.scalyr.com`.
pub const DATASET_SERVER_URL_ENV: &str = "DATASET_SERVER_URL";

/// `true`/`1` to flatten nested attributes.
pub const DATASET_FLATTEN_ATTRIBUTES_ENV: &str = "DATASET_FLATTEN_ATTRIBUTES";

/// `true`/`1` to register Prometheus metrics.
pub const DATASET_ENABLE_METRICS_ENV: &str = "DATASET_ENABLE_METRICS";

/// Prefix of the Prometheus metric names.
pub const DATASET_METRICS_PREFIX_ENV: &str = "DATASET_METRICS_PREFIX";

/// Read an environment variable or fall back to a provided default.
pub fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Lenient boolean parsing for flag variables.
pub fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
