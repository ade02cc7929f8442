use crate::layer::DataSetLayer;
use crate::logger::DataSetLogger;
use tracing::subscriber::SetGlobalDefaultError;
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

/// Configuration of the `tracing` bridge.
///
/// **Fields**
/// - `min_level`: least severe level forwarded to DataSet.
/// - `enable_stdout`: if `true`, a `tracing_subscriber::fmt::Layer` is
///   installed next to [`DataSetLayer`] so events also reach the console.
#[derive(Clone, Debug)]
pub struct LayerConfig {
    pub min_level: Level,
    pub enable_stdout: bool,
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            min_level: Level::ERROR,
            enable_stdout: true,
        }
    }
}

/// Install a global `tracing` subscriber that forwards events to `logger`.
///
/// **Parameters**
/// - `logger`: destination of the forwarded events. Keep a clone around
///   to [`close`](DataSetLogger::close) it on shutdown.
/// - `config`: [`LayerConfig`] controlling filtering and console output.
///
/// **Returns**
/// - `Err(..)` if a global subscriber was already installed.
pub fn init_tracing_with_config(
    logger: DataSetLogger,
    config: LayerConfig,
) -> Result<(), SetGlobalDefaultError> {
    let layer = DataSetLayer::with_min_level(logger, config.min_level);

    // Registry is typed by its layers, so the two variants are built separately.
    if config.enable_stdout {
        let fmt_layer = tracing_subscriber::fmt::layer();
        let subscriber = Registry::default().with(layer).with(fmt_layer);
        tracing::subscriber::set_global_default(subscriber)
    } else {
        let subscriber = Registry::default().with(layer);
        tracing::subscriber::set_global_default(subscriber)
    }
}

/// Equivalent to [`init_tracing_with_config`] with [`LayerConfig::default`].
pub fn init_tracing(logger: DataSetLogger) -> Result<(), SetGlobalDefaultError> {
    init_tracing_with_config(logger, LayerConfig::default())
}
