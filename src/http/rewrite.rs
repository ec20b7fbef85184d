//! Optional request rewriting before forwarding.
//!
//! Rewrites run on the outbound request parts after admission and before
//! the downstream URI is computed, in configuration order. None are enabled
//! by default: without configuration the request is forwarded as received.

use axum::http::header::HOST;
use axum::http::request::Parts;
use axum::http::{HeaderName, HeaderValue, Uri};
use std::fmt;
use std::sync::Arc;

use crate::config::RewriteConfig;
use crate::net::DownstreamTarget;

pub const X_FORWARDED_HOST: HeaderName = HeaderName::from_static("x-forwarded-host");
pub const X_ORIGIN_HOST: HeaderName = HeaderName::from_static("x-origin-host");

/// Hook applied to every admitted request before it is forwarded.
pub trait RequestRewrite: Send + Sync + fmt::Debug {
    fn rewrite(&self, parts: &mut Parts, target: &DownstreamTarget);
}

/// Adds `X-Forwarded-Host` (inbound host) and `X-Origin-Host` (downstream address).
#[derive(Debug, Default, Clone, Copy)]
pub struct ForwardedHostHeaders;

impl RequestRewrite for ForwardedHostHeaders {
    fn rewrite(&self, parts: &mut Parts, target: &DownstreamTarget) {
        if let Some(host) = parts.headers.get(HOST).cloned() {
            parts.headers.append(X_FORWARDED_HOST.clone(), host);
        }
        if let Ok(origin) = HeaderValue::from_str(target.address()) {
            parts.headers.append(X_ORIGIN_HOST.clone(), origin);
        }
    }
}

/// Prepends a fixed prefix to the forwarded path. The query is kept.
#[derive(Debug, Clone)]
pub struct PathPrefix {
    prefix: String,
}

impl PathPrefix {
    pub fn new(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        let prefix = prefix.trim_end_matches('/');
        let prefix = if prefix.starts_with('/') {
            prefix.to_string()
        } else {
            format!("/{}", prefix)
        };
        Self { prefix }
    }
}

impl RequestRewrite for PathPrefix {
    fn rewrite(&self, parts: &mut Parts, _target: &DownstreamTarget) {
        let mut path_and_query = format!("{}{}", self.prefix, parts.uri.path());
        if let Some(q) = parts.uri.query() {
            path_and_query.push('?');
            path_and_query.push_str(q);
        }

        let mut uri_parts = parts.uri.clone().into_parts();
        match path_and_query.parse() {
            Ok(pq) => uri_parts.path_and_query = Some(pq),
            Err(e) => {
                tracing::warn!(prefix = %self.prefix, error = %e, "Path prefix produced an invalid path, skipping");
                return;
            }
        }
        match Uri::from_parts(uri_parts) {
            Ok(uri) => parts.uri = uri,
            Err(e) => tracing::warn!(prefix = %self.prefix, error = %e, "Path prefix rewrite failed"),
        }
    }
}

/// Build the configured rewrite chain.
pub fn from_config(config: &RewriteConfig) -> Vec<Arc<dyn RequestRewrite>> {
    let mut chain: Vec<Arc<dyn RequestRewrite>> = Vec::new();
    if config.forwarded_host_headers {
        chain.push(Arc::new(ForwardedHostHeaders));
    }
    if let Some(prefix) = config.path_prefix.as_deref().filter(|p| !p.trim_matches('/').is_empty()) {
        chain.push(Arc::new(PathPrefix::new(prefix)));
    }
    chain
}
