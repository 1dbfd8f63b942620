//! Prometheus metrics for the sweeper.
//!
//! Provides counters for:
//! - Cleanup runs by outcome
//! - Deletions and delete failures
//! - Catalog pages fetched
//!
//! Every recording function is a no-op unless the `prometheus` feature is
//! compiled in and [`init_metrics`] installed a recorder.

#[cfg(feature = "prometheus")]
use metrics::counter;
#[cfg(feature = "prometheus")]
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::config::MetricsConfig;

/// Install the Prometheus recorder and start its scrape endpoint.
///
/// Must be called from within a tokio runtime.
#[cfg(feature = "prometheus")]
pub fn init_metrics(config: &MetricsConfig) -> Result<(), MetricsError> {
    if !config.enabled {
        return Ok(());
    }

    let addr = config.socket_addr().map_err(MetricsError::Setup)?;

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(MetricsError::Install)?;

    tracing::info!(listen_addr = %addr, "Prometheus metrics endpoint started");
    Ok(())
}

/// Initialize the metrics system (no-op without prometheus feature).
#[cfg(not(feature = "prometheus"))]
pub fn init_metrics(config: &MetricsConfig) -> Result<(), MetricsError> {
    if config.enabled {
        tracing::warn!(
            "Metrics are enabled in config but the 'prometheus' feature is not compiled. \
             Rebuild with: cargo build --features prometheus"
        );
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Metric Recording Functions
// ─────────────────────────────────────────────────────────────────────────────

/// Record the end of a cleanup run.
///
/// # Arguments
/// * `outcome` - "success", "partial", "enumeration_error" or "config_error"
pub fn record_run(outcome: &str) {
    #[cfg(feature = "prometheus")]
    {
        counter!(
            "catalog_sweeper_runs_total",
            "outcome" => outcome.to_string()
        )
        .increment(1);
    }
    #[cfg(not(feature = "prometheus"))]
    {
        let _ = outcome;
    }
}

/// Record one deleted item.
pub fn record_deletion() {
    #[cfg(feature = "prometheus")]
    {
        counter!("catalog_sweeper_deletions_total").increment(1);
    }
}

/// Record one item that could not be deleted.
pub fn record_delete_failure() {
    #[cfg(feature = "prometheus")]
    {
        counter!("catalog_sweeper_delete_failures_total").increment(1);
    }
}

/// Record one catalog page fetched.
pub fn record_page_fetched() {
    #[cfg(feature = "prometheus")]
    {
        counter!("catalog_sweeper_pages_total").increment(1);
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    #[error("Failed to set up metrics: {0}")]
    Setup(String),

    #[cfg(feature = "prometheus")]
    #[error("Failed to install metrics recorder: {0}")]
    Install(#[from] metrics_exporter_prometheus::BuildError),
}
