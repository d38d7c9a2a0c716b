// metrics/mod.rs
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use std::net::SocketAddr;

/// Starts the Prometheus scrape listener and installs the global recorder.
pub fn setup_metrics(port: u16) -> Result<(), BuildError> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;

    metrics::describe_counter!(
        "mihome_device_commands_total",
        "Per-device command outcomes, labelled ok or error"
    );
    metrics::describe_histogram!(
        "mihome_dispatch_seconds",
        metrics::Unit::Seconds,
        "Wall time of one fan-out batch"
    );

    Ok(())
}
