//! Metrics collection and exposition.
//!
//! # Metrics
//! - `sidecar_requests_total` (counter): requests by outcome and method
//! - `sidecar_request_duration_seconds` (histogram): latency by outcome
//!
//! # Design Decisions
//! - Recording is a no-op until an exporter is installed
//! - Outcome and method labels are closed sets, so cardinality stays bounded
//! - Extension methods are folded into `OTHER`

use axum::http::Method;
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use std::net::SocketAddr;
use std::time::Instant;

/// How a request left the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Rejected,
    Forwarded,
    ServerError,
    Unreachable,
}

impl Outcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Rejected => "rejected",
            Outcome::Forwarded => "forwarded",
            Outcome::ServerError => "server_error",
            Outcome::Unreachable => "unreachable",
        }
    }
}

/// Label value for a request method.
pub fn method_label(method: &Method) -> &'static str {
    match *method {
        Method::GET => "GET",
        Method::HEAD => "HEAD",
        Method::POST => "POST",
        Method::PUT => "PUT",
        Method::DELETE => "DELETE",
        Method::PATCH => "PATCH",
        Method::OPTIONS => "OPTIONS",
        Method::CONNECT => "CONNECT",
        Method::TRACE => "TRACE",
        _ => "OTHER",
    }
}

/// Install the Prometheus exporter with its own HTTP listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

/// Record one finished request.
pub fn record_request(method: &Method, outcome: Outcome, start: Instant) {
    metrics::counter!(
        "sidecar_requests_total",
        "outcome" => outcome.as_str(),
        "method" => method_label(method)
    )
    .increment(1);
    metrics::histogram!(
        "sidecar_request_duration_seconds",
        "outcome" => outcome.as_str()
    )
    .record(start.elapsed().as_secs_f64());
}
