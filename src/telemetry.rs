//! Prometheus exporter wiring.

use anyhow::Context;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Install the Prometheus recorder with its own `/metrics` HTTP listener.
/// Must run inside the tokio runtime.
pub fn install(addr: SocketAddr) -> anyhow::Result<()> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .context("prometheus: install recorder")?;
    crate::ingest::ensure_metrics_described();
    tracing::info!(%addr, "metrics listener started");
    Ok(())
}
