use axum::http::StatusCode;
use prometheus::{Encoder, TextEncoder};

use crate::services::{metrics, schedule::REJECTION_LABELS};

/// GET /metrics — Prometheus scrape endpoint.
pub async fn metrics_handler() -> Result<String, StatusCode> {
    metrics::register(&REJECTION_LABELS);

    let mut buffer = Vec::new();
    TextEncoder::new()
        .encode(&prometheus::gather(), &mut buffer)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    String::from_utf8(buffer).map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}
