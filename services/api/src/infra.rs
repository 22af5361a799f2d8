use metrics_exporter_prometheus::PrometheusHandle;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use storm_exposure::config::{AppConfig, DataConfig};
use storm_exposure::error::AppError;
use storm_exposure::exposure::CsvDataSource;
use storm_exposure::telemetry;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// CLI overrides for the two CSV inputs; unset flags fall back to the environment.
#[derive(clap::Args, Debug, Default, Clone)]
pub(crate) struct DataArgs {
    /// Storm track CSV (defaults to STORM_DATA_PATH)
    #[arg(long)]
    pub(crate) storm_data: Option<PathBuf>,
    /// Property policy CSV (defaults to PROPERTY_DATA_PATH)
    #[arg(long)]
    pub(crate) property_data: Option<PathBuf>,
}

impl DataArgs {
    pub(crate) fn apply(self, config: &mut DataConfig) {
        if let Some(path) = self.storm_data {
            config.storm_path = path;
        }
        if let Some(path) = self.property_data {
            config.property_path = path;
        }
    }
}

/// Shared start-up for the one-shot CLI commands: config, logging, then the CSV source.
pub(crate) fn cli_data_source(data: DataArgs) -> Result<CsvDataSource, AppError> {
    let mut config = AppConfig::load()?;
    data.apply(&mut config.data);
    telemetry::init(&config.telemetry)?;
    Ok(CsvDataSource::from_config(&config.data))
}
