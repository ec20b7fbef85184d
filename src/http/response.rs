//! Responses produced or relayed by the gateway.
//!
//! # Responsibilities
//! - Fixed rejection response (404, constant body, no extra headers)
//! - Gateway error response for transport failures (500, error text body)
//! - Relay downstream responses, stripping hop-by-hop headers only

use axum::body::Body;
use axum::http::{Response, StatusCode};
use hyper::body::Incoming;
use std::error::Error;

use crate::http::request::strip_hop_by_hop;

/// Body returned for paths not on the allowlist.
pub const PATH_NOT_FOUND: &str = "Not found!";

/// Fixed response for rejected requests.
pub fn not_found() -> Response<Body> {
    let mut response = Response::new(Body::from(PATH_NOT_FOUND));
    *response.status_mut() = StatusCode::NOT_FOUND;
    response
}

/// Response for a downstream that could not be reached.
pub fn gateway_error(text: String) -> Response<Body> {
    let mut response = Response::new(Body::from(text));
    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    response
}

/// Relay a downstream response: status, end-to-end headers (cookies included), body.
pub fn relay(response: Response<Incoming>) -> Response<Body> {
    let (mut parts, body) = response.into_parts();
    strip_hop_by_hop(&mut parts.headers);
    Response::from_parts(parts, Body::new(body))
}

/// Error text including its source chain, e.g.
/// `client error (Connect): tcp connect error: Connection refused`.
pub fn error_text(err: &(dyn Error + 'static)) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(e) = source {
        text.push_str(": ");
        text.push_str(&e.to_string());
        source = e.source();
    }
    text
}
