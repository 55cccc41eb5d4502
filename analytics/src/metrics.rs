use crate::config::MetricsConfig;
use metrics_exporter_statsd::{StatsdBuilder, StatsdError};
use shared::metrics_defs::describe_all;

const METRICS_PREFIX: &str = "analytics";

#[derive(thiserror::Error, Debug)]
pub enum MetricsError {
    #[error("could not build statsd recorder: {0}")]
    Statsd(#[from] StatsdError),
    #[error("a metrics recorder is already installed")]
    RecorderAlreadySet,
}

/// Installs the statsd recorder and describes every metric the service emits.
pub fn init(config: &MetricsConfig) -> Result<(), MetricsError> {
    let recorder = StatsdBuilder::from(config.statsd_host.as_str(), config.statsd_port)
        .build(Some(METRICS_PREFIX))?;
    metrics::set_global_recorder(recorder).map_err(|_| MetricsError::RecorderAlreadySet)?;

    describe_all(analytics_api::metrics_defs::ALL_METRICS);
    describe_all(request_store::metrics_defs::ALL_METRICS);

    tracing::info!(
        host = %config.statsd_host,
        port = config.statsd_port,
        "Sending metrics to statsd"
    );
    Ok(())
}
