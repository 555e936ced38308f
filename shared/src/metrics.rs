use metrics_exporter_statsd::{StatsdBuilder, StatsdError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MetricsError {
    #[error("could not build statsd recorder: {0}")]
    Build(#[from] StatsdError),
    #[error("a metrics recorder is already installed")]
    AlreadyInstalled,
}

/// Installs the process-wide statsd recorder. Call once at startup, before
/// any metric is emitted; metrics recorded earlier are dropped silently.
pub fn init_statsd(host: &str, port: u16, prefix: &str) -> Result<(), MetricsError> {
    let recorder = StatsdBuilder::from(host, port).build(Some(prefix))?;
    metrics::set_global_recorder(recorder).map_err(|_| MetricsError::AlreadyInstalled)?;
    Ok(())
}
