//! Outbound request preparation.
//!
//! # Responsibilities
//! - Extract the raw request target used for admission and logging
//! - Apply configured rewrites
//! - Point the request at the downstream target (path and query preserved)
//! - Strip hop-by-hop headers, append `X-Forwarded-For`
//!
//! # Design Decisions
//! - The inbound target is never altered before matching, only before forwarding
//! - Method, end-to-end headers and body are passed through untouched
//! - The inbound `Host` is kept; the transport fills it in only when absent

use axum::body::Body;
use axum::http::header::{self, HeaderMap, HeaderName, HeaderValue};
use axum::http::{Request, Uri, Version};
use std::net::SocketAddr;
use std::sync::Arc;

use crate::http::rewrite::RequestRewrite;
use crate::net::DownstreamTarget;

pub const X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");

const HOP_BY_HOP: [HeaderName; 8] = [
    header::CONNECTION,
    HeaderName::from_static("proxy-connection"),
    HeaderName::from_static("keep-alive"),
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
];

/// Raw request target: path plus query exactly as received.
pub fn raw_target(uri: &Uri) -> &str {
    uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/")
}

/// Remove hop-by-hop headers, including any named by `Connection`.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let named: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();
    for name in named {
        headers.remove(name);
    }
    for name in HOP_BY_HOP.iter() {
        headers.remove(name);
    }
    headers.remove(header::UPGRADE);
}

/// Append the client IP to `X-Forwarded-For`, keeping prior hops.
pub fn append_forwarded_for(headers: &mut HeaderMap, client: SocketAddr) {
    let ip = client.ip().to_string();
    let prior: Vec<&str> = headers
        .get_all(&X_FORWARDED_FOR)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .collect();

    let value = if prior.is_empty() {
        ip
    } else {
        format!("{}, {}", prior.join(", "), ip)
    };
    if let Ok(value) = HeaderValue::from_str(&value) {
        headers.insert(X_FORWARDED_FOR, value);
    }
}

/// Turn an admitted inbound request into the downstream request.
pub fn prepare(
    request: Request<Body>,
    client: SocketAddr,
    target: &DownstreamTarget,
    rewrites: &[Arc<dyn RequestRewrite>],
) -> Result<Request<Body>, axum::http::Error> {
    let (mut parts, body) = request.into_parts();

    for rewrite in rewrites {
        rewrite.rewrite(&mut parts, target);
    }

    parts.uri = target.target_uri(parts.uri.path(), parts.uri.query())?;
    parts.version = Version::HTTP_11;

    strip_hop_by_hop(&mut parts.headers);
    append_forwarded_for(&mut parts.headers, client);

    Ok(Request::from_parts(parts, body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::rewrite::{ForwardedHostHeaders, X_FORWARDED_HOST};

    fn client() -> SocketAddr {
        "192.168.1.20:40000".parse().unwrap()
    }

    fn target() -> DownstreamTarget {
        DownstreamTarget::parse("http://127.0.0.1:9000").unwrap()
    }

    #[test]
    fn test_raw_target() {
        let uri: Uri = "/account/acc1?foo=bar&x=y".parse().unwrap();
        assert_eq!(raw_target(&uri), "/account/acc1?foo=bar&x=y");
        let uri: Uri = "http://example.com".parse().unwrap();
        assert_eq!(raw_target(&uri), "/");
    }

    #[test]
    fn test_prepare_preserves_request() {
        let request = Request::builder()
            .method("PUT")
            .uri("/Company/abc85033?x=1")
            .header(header::HOST, "sidecar:8080")
            .header("x-custom", "kept")
            .header(header::COOKIE, "a=b")
            .body(Body::from("payload"))
            .unwrap();

        let out = prepare(request, client(), &target(), &[]).unwrap();
        assert_eq!(out.method(), "PUT");
        assert_eq!(out.uri().to_string(), "http://127.0.0.1:9000/Company/abc85033?x=1");
        assert_eq!(out.headers().get("x-custom").unwrap(), "kept");
        assert_eq!(out.headers().get(header::COOKIE).unwrap(), "a=b");
        assert_eq!(out.headers().get(header::HOST).unwrap(), "sidecar:8080");
        assert_eq!(out.headers().get(&X_FORWARDED_FOR).unwrap(), "192.168.1.20");
        assert!(out.headers().get(&X_FORWARDED_HOST).is_none());
    }

    #[test]
    fn test_prepare_applies_rewrites() {
        let request = Request::builder()
            .uri("/company")
            .header(header::HOST, "sidecar:8080")
            .body(Body::empty())
            .unwrap();
        let rewrites: Vec<Arc<dyn RequestRewrite>> = vec![Arc::new(ForwardedHostHeaders)];

        let out = prepare(request, client(), &target(), &rewrites).unwrap();
        assert_eq!(out.headers().get(&X_FORWARDED_HOST).unwrap(), "sidecar:8080");
    }

    #[test]
    fn test_strip_hop_by_hop() {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONNECTION, HeaderValue::from_static("close, x-session-hop"));
        headers.insert("x-session-hop", HeaderValue::from_static("1"));
        headers.insert("keep-alive", HeaderValue::from_static("timeout=5"));
        headers.insert(header::TRANSFER_ENCODING, HeaderValue::from_static("chunked"));
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/plain"));

        strip_hop_by_hop(&mut headers);
        assert_eq!(headers.len(), 1);
        assert!(headers.contains_key(header::CONTENT_TYPE));
    }

    #[test]
    fn test_forwarded_for_appends() {
        let mut headers = HeaderMap::new();
        headers.insert(&X_FORWARDED_FOR, HeaderValue::from_static("10.0.0.1"));
        append_forwarded_for(&mut headers, client());
        assert_eq!(headers.get(&X_FORWARDED_FOR).unwrap(), "10.0.0.1, 192.168.1.20");
    }
}
