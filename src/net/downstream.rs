//! The single downstream target and the transport that reaches it.

use axum::body::Body;
use axum::http::uri::{Authority, Scheme};
use axum::http::Uri;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// HTTP client used for all forwarded requests.
pub type DownstreamClient = Client<HttpConnector, Body>;

/// Error parsing the downstream base address.
#[derive(Debug, Error)]
pub enum DownstreamError {
    #[error("invalid downstream url `{address}`: {source}")]
    InvalidUrl {
        address: String,
        #[source]
        source: url::ParseError,
    },

    #[error("unsupported downstream scheme `{0}` (only http is supported)")]
    UnsupportedScheme(String),

    #[error("downstream url `{0}` has no host")]
    MissingHost(String),

    #[error("downstream url `{0}` has an invalid authority")]
    InvalidAuthority(String),
}

/// Base address all admitted requests are forwarded to.
#[derive(Debug, Clone)]
pub struct DownstreamTarget {
    address: String,
    authority: Authority,
    base_path: String,
    base_query: Option<String>,
}

impl DownstreamTarget {
    /// Parse a base address such as `http://127.0.0.1:9000/api`.
    pub fn parse(address: &str) -> Result<Self, DownstreamError> {
        let url = Url::parse(address).map_err(|source| DownstreamError::InvalidUrl {
            address: address.to_string(),
            source,
        })?;

        if url.scheme() != "http" {
            return Err(DownstreamError::UnsupportedScheme(url.scheme().to_string()));
        }

        let host = url
            .host_str()
            .ok_or_else(|| DownstreamError::MissingHost(address.to_string()))?;
        let authority = match url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };
        let authority = Authority::from_str(&authority)
            .map_err(|_| DownstreamError::InvalidAuthority(address.to_string()))?;

        Ok(Self {
            base_path: url.path().to_string(),
            base_query: url.query().filter(|q| !q.is_empty()).map(str::to_string),
            authority,
            address: address.to_string(),
        })
    }

    /// The address exactly as configured.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Build the outbound URI for an inbound path and query.
    ///
    /// The path is joined to the base path with exactly one slash between
    /// them; base and inbound queries are joined with `&`.
    pub fn target_uri(&self, path: &str, query: Option<&str>) -> Result<Uri, axum::http::Error> {
        let mut path_and_query = join_paths(&self.base_path, path);

        let query = match (self.base_query.as_deref(), query.filter(|q| !q.is_empty())) {
            (Some(base), Some(q)) => Some(format!("{}&{}", base, q)),
            (Some(base), None) => Some(base.to_string()),
            (None, Some(q)) => Some(q.to_string()),
            (None, None) => None,
        };
        if let Some(q) = query {
            path_and_query.push('?');
            path_and_query.push_str(&q);
        }

        Uri::builder()
            .scheme(Scheme::HTTP)
            .authority(self.authority.clone())
            .path_and_query(path_and_query)
            .build()
    }
}

fn join_paths(base: &str, path: &str) -> String {
    match (base.ends_with('/'), path.starts_with('/')) {
        (true, true) => format!("{}{}", base, &path[1..]),
        (false, false) => format!("{}/{}", base, path),
        _ => format!("{}{}", base, path),
    }
}

/// Build the downstream client. `connect_timeout` bounds the dial only.
pub fn build_client(connect_timeout: Option<Duration>) -> DownstreamClient {
    let mut connector = HttpConnector::new();
    connector.set_connect_timeout(connect_timeout);
    connector.set_nodelay(true);

    Client::builder(TokioExecutor::new()).build(connector)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_host() {
        let t = DownstreamTarget::parse("http://127.0.0.1:9000").unwrap();
        assert_eq!(t.authority.as_str(), "127.0.0.1:9000");
        assert_eq!(t.address(), "http://127.0.0.1:9000");
        let uri = t.target_uri("/company", None).unwrap();
        assert_eq!(uri.to_string(), "http://127.0.0.1:9000/company");
    }

    #[test]
    fn test_base_path_join() {
        let t = DownstreamTarget::parse("http://backend/api/").unwrap();
        assert_eq!(t.target_uri("/company", None).unwrap().path(), "/api/company");

        let t = DownstreamTarget::parse("http://backend/api").unwrap();
        assert_eq!(t.target_uri("/company", None).unwrap().path(), "/api/company");
    }

    #[test]
    fn test_query_merge() {
        let t = DownstreamTarget::parse("http://backend/?key=1").unwrap();
        let uri = t.target_uri("/company", Some("foo=bar")).unwrap();
        assert_eq!(uri.query(), Some("key=1&foo=bar"));

        let t = DownstreamTarget::parse("http://backend").unwrap();
        let uri = t.target_uri("/company", Some("foo=bar&x=y")).unwrap();
        assert_eq!(uri.query(), Some("foo=bar&x=y"));
        assert_eq!(t.target_uri("/company", Some("")).unwrap().query(), None);
    }

    #[test]
    fn test_invalid_urls() {
        assert!(matches!(
            DownstreamTarget::parse("::not a url::"),
            Err(DownstreamError::InvalidUrl { .. })
        ));
        assert!(matches!(
            DownstreamTarget::parse("https://secure.example"),
            Err(DownstreamError::UnsupportedScheme(_))
        ));
        assert!(DownstreamTarget::parse("").is_err());
    }

    #[test]
    fn test_ipv6_authority() {
        let t = DownstreamTarget::parse("http://[::1]:8080").unwrap();
        assert_eq!(t.authority.as_str(), "[::1]:8080");
    }
}
