//! Prometheus metrics helpers for playback.
//!
//! # Usage
//!
//! ```rust,ignore
//! use perma_core::metrics::{init_metrics, start_metrics_server};
//!
//! #[tokio::main]
//! async fn main() {
//!     let handle = init_metrics();
//!     start_metrics_server(9092, handle).await.unwrap();
//!
//!     perma_core::metrics::record_playback("active");
//! }
//! ```
//!
//! # Metric Naming Conventions
//!
//! - Prefix: component name (`playback_`, `proxy_chain_`)
//! - Suffix: unit or type (`_total`)
//! - Labels: small fixed sets only (`outcome`, `reason`)

use axum::{Router, routing::get};
use metrics::describe_counter;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::net::SocketAddr;

/// Counter of playback requests by outcome.
pub const PLAYBACK_REQUESTS_TOTAL: &str = "playback_requests_total";

/// Counter of requests rejected by the proxy chain validator.
pub const PROXY_CHAIN_REJECTIONS_TOTAL: &str = "proxy_chain_rejections_total";

/// Initialize the Prometheus metrics recorder.
///
/// # Panics
///
/// Panics if called more than once (the recorder can only be installed once).
pub fn init_metrics() -> PrometheusHandle {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus recorder");

    register_playback_metrics();

    handle
}

/// Try to initialize the Prometheus metrics recorder.
///
/// Like [`init_metrics`] but returns `None` if the recorder is already installed.
pub fn try_init_metrics() -> Option<PrometheusHandle> {
    let handle = PrometheusBuilder::new().install_recorder().ok()?;
    register_playback_metrics();
    Some(handle)
}

/// Start the Prometheus metrics HTTP server.
///
/// Serves `/metrics` on the given port from a background task.
pub async fn start_metrics_server(
    port: u16,
    handle: PrometheusHandle,
) -> Result<(), std::io::Error> {
    let app = Router::new().route(
        "/metrics",
        get(move || {
            let handle = handle.clone();
            async move { handle.render() }
        }),
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Metrics server listening on http://{}/metrics", addr);

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!(error = %e, "metrics server stopped");
        }
    });

    Ok(())
}

fn register_playback_metrics() {
    describe_counter!(
        PLAYBACK_REQUESTS_TOTAL,
        "Playback requests by outcome (label: outcome)"
    );
    describe_counter!(
        PROXY_CHAIN_REJECTIONS_TOTAL,
        "Requests rejected for an invalid X-Forwarded-For chain (label: reason)"
    );
}

/// Count one playback request with the given outcome label.
#[inline]
pub fn record_playback(outcome: &'static str) {
    metrics::counter!(PLAYBACK_REQUESTS_TOTAL, "outcome" => outcome).increment(1);
}

/// Count one request rejected by the proxy chain validator.
#[inline]
pub fn record_proxy_rejection(reason: &'static str) {
    metrics::counter!(PROXY_CHAIN_REJECTIONS_TOTAL, "reason" => reason).increment(1);
}
