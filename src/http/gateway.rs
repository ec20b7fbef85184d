//! Forwarding gateway: admit → forward → observe → record.
//!
//! # Request Lifecycle
//! ```text
//! Received
//!     → Matched{rejected} → RejectedResponse (404 "Not found!", downstream untouched)
//!     → Matched{admitted} → Forwarding
//!         → Responded        → ForwardedResponse (relayed verbatim)
//!         → TransportFailed  → GatewayErrorResponse (500, error text)
//! ```
//!
//! # Design Decisions
//! - At most one downstream attempt per request, no retries
//! - Downstream 5xx is relayed, only tallied in `failed_requests`
//! - Transport failures are tallied separately in `unreachable_requests`
//! - Dropping the `handle` future (client went away) drops the downstream call

use axum::body::Body;
use axum::http::{Method, Request, Response};
use std::error::Error;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;

use crate::config::SidecarConfig;
use crate::http::rewrite::{self, RequestRewrite};
use crate::http::{request, response};
use crate::net::{build_client, DownstreamClient, DownstreamError, DownstreamTarget};
use crate::observability::metrics::{self, Outcome};
use crate::observability::{AccessLog, ErrorLog, GatewayStats, LogSink};
use crate::routing::{Allowlist, PatternError};

/// Construction-time gateway errors. Always fatal.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error(transparent)]
    Downstream(#[from] DownstreamError),

    #[error("invalid allowlist: {0}")]
    Pattern(#[from] PatternError),

    #[error("cannot open log file {path}: {source}")]
    LogSink {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// The request-admission and forwarding engine.
#[derive(Debug)]
pub struct Gateway {
    service_name: String,
    target: DownstreamTarget,
    allowlist: Allowlist,
    timeout: Option<Duration>,
    client: DownstreamClient,
    rewrites: Vec<Arc<dyn RequestRewrite>>,
    access_log: AccessLog,
    error_log: ErrorLog,
    stats: GatewayStats,
}

/// Builder for [`Gateway`].
#[derive(Debug)]
pub struct GatewayBuilder {
    downstream_url: String,
    allowlist: Allowlist,
    service_name: String,
    timeout: Option<Duration>,
    log_prefix: String,
    access_sink: Option<LogSink>,
    error_sink: Option<LogSink>,
    rewrites: Vec<Arc<dyn RequestRewrite>>,
}

impl GatewayBuilder {
    pub fn service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = name.into();
        self
    }

    /// Dial timeout for downstream connections.
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn log_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.log_prefix = prefix.into();
        self
    }

    pub fn access_log(mut self, sink: LogSink) -> Self {
        self.access_sink = Some(sink);
        self
    }

    pub fn error_log(mut self, sink: LogSink) -> Self {
        self.error_sink = Some(sink);
        self
    }

    pub fn rewrite(mut self, rewrite: Arc<dyn RequestRewrite>) -> Self {
        self.rewrites.push(rewrite);
        self
    }

    /// Fails if the downstream address is not a usable URL.
    pub fn build(self) -> Result<Gateway, GatewayError> {
        let target = DownstreamTarget::parse(&self.downstream_url)?;

        tracing::info!(
            service = %self.service_name,
            downstream = %target.address(),
            patterns = self.allowlist.len(),
            timeout = ?self.timeout,
            rewrites = self.rewrites.len(),
            "Gateway initialized"
        );
        if self.allowlist.is_empty() {
            tracing::warn!("Allowlist is empty, every request will be rejected");
        }

        Ok(Gateway {
            client: build_client(self.timeout),
            service_name: self.service_name,
            target,
            allowlist: self.allowlist,
            timeout: self.timeout,
            rewrites: self.rewrites,
            access_log: AccessLog::new(self.log_prefix.clone(), self.access_sink),
            error_log: ErrorLog::new(self.log_prefix, self.error_sink),
            stats: GatewayStats::new(),
        })
    }
}

fn open_sink(path: Option<&str>) -> Result<Option<LogSink>, GatewayError> {
    match path.filter(|p| !p.is_empty()) {
        Some(path) => LogSink::open(Path::new(path))
            .map(Some)
            .map_err(|source| GatewayError::LogSink {
                path: path.to_string(),
                source,
            }),
        None => Ok(None),
    }
}

impl Gateway {
    pub fn builder(downstream_url: impl Into<String>, allowlist: Allowlist) -> GatewayBuilder {
        GatewayBuilder {
            downstream_url: downstream_url.into(),
            allowlist,
            service_name: String::new(),
            timeout: None,
            log_prefix: String::new(),
            access_sink: None,
            error_sink: None,
            rewrites: Vec::new(),
        }
    }

    /// Compile the allowlist, open log files and build the gateway.
    pub fn from_config(config: &SidecarConfig) -> Result<Self, GatewayError> {
        let allowlist = Allowlist::compile(&config.allowlist)?;
        let access_sink = open_sink(config.access_file.as_deref())?;
        let error_sink = open_sink(config.error_file.as_deref())?;

        let mut builder = Gateway::builder(config.downstream_url.clone(), allowlist)
            .service_name(config.service_name.clone())
            .timeout(config.proxy_timeout())
            .log_prefix(config.log_prefix.clone());
        if let Some(sink) = access_sink {
            builder = builder.access_log(sink);
        }
        if let Some(sink) = error_sink {
            builder = builder.error_log(sink);
        }
        for rewrite in rewrite::from_config(&config.rewrite) {
            builder = builder.rewrite(rewrite);
        }
        builder.build()
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    pub fn target(&self) -> &DownstreamTarget {
        &self.target
    }

    pub fn allowlist(&self) -> &Allowlist {
        &self.allowlist
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn stats(&self) -> &GatewayStats {
        &self.stats
    }

    /// Handle one inbound request end to end.
    pub async fn handle(&self, client: SocketAddr, request: Request<Body>) -> Response<Body> {
        let start = Instant::now();
        self.stats.record_received();

        let method = request.method().clone();
        let raw_target = request::raw_target(request.uri()).to_string();

        if !self.allowlist.admits(&raw_target) {
            self.stats.record_rejected();
            self.access_log.rejected(client, &method, &raw_target);
            tracing::debug!(client = %client, method = %method, path = %raw_target, "Path not allowed");
            metrics::record_request(&method, Outcome::Rejected, start);
            return response::not_found();
        }
        self.stats.record_admitted();

        let outbound = match request::prepare(request, client, &self.target, &self.rewrites) {
            Ok(req) => req,
            Err(e) => return self.transport_failed(client, &method, &raw_target, &e, start),
        };

        match self.client.request(outbound).await {
            Ok(res) => {
                let status = res.status();
                self.access_log.forwarded(client, &method, &raw_target, status);

                let outcome = if status.as_u16() >= 500 {
                    self.stats.record_server_error();
                    Outcome::ServerError
                } else {
                    Outcome::Forwarded
                };
                tracing::debug!(
                    client = %client,
                    method = %method,
                    path = %raw_target,
                    status = status.as_u16(),
                    "Forwarded"
                );
                metrics::record_request(&method, outcome, start);
                response::relay(res)
            }
            Err(e) => self.transport_failed(client, &method, &raw_target, &e, start),
        }
    }

    fn transport_failed(
        &self,
        client: SocketAddr,
        method: &Method,
        raw_target: &str,
        err: &(dyn Error + 'static),
        start: Instant,
    ) -> Response<Body> {
        let text = response::error_text(err);
        self.stats.record_unreachable();
        self.error_log.transport_failure(client, method, raw_target, &text);
        tracing::error!(
            client = %client,
            method = %method,
            path = %raw_target,
            downstream = %self.target.address(),
            error = %text,
            "Downstream request failed"
        );
        metrics::record_request(method, Outcome::Unreachable, start);
        response::gateway_error(text)
    }
}
