//! Shared utilities for integration testing.

#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{HeaderMap, Method, Request, Response, StatusCode},
    Router,
};
use parking_lot::Mutex;
use sidecar_proxy::{Allowlist, Gateway, HttpServer, Shutdown};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

/// What the downstream saw for one request.
#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub method: Method,
    pub uri: String,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

/// Canned downstream reply.
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: StatusCode,
    pub body: &'static str,
    pub cookie: Option<&'static str>,
    pub delay: Option<Duration>,
}

impl Reply {
    pub fn new(status: u16, body: &'static str) -> Self {
        Self {
            status: StatusCode::from_u16(status).unwrap(),
            body,
            cookie: None,
            delay: None,
        }
    }

    pub fn with_cookie(mut self, cookie: &'static str) -> Self {
        self.cookie = Some(cookie);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

/// Programmable downstream recording every request it receives.
#[derive(Clone, Default)]
pub struct Downstream {
    seen: Arc<Mutex<Vec<SeenRequest>>>,
}

impl Downstream {
    pub fn hits(&self) -> usize {
        self.seen.lock().len()
    }

    pub fn last(&self) -> Option<SeenRequest> {
        self.seen.lock().last().cloned()
    }
}

/// Start a downstream answering via `reply(path)` on an ephemeral port.
pub async fn start_downstream<F>(reply: F) -> (SocketAddr, Downstream)
where
    F: Fn(&str) -> Reply + Clone + Send + Sync + 'static,
{
    let downstream = Downstream::default();
    let seen = downstream.seen.clone();

    let app = Router::new().fallback(move |request: Request<Body>| {
        let seen = seen.clone();
        let reply = reply.clone();
        async move {
            let (parts, body) = request.into_parts();
            let body = to_bytes(body, 1024 * 1024).await.unwrap_or_default();
            seen.lock().push(SeenRequest {
                method: parts.method.clone(),
                uri: parts.uri.to_string(),
                headers: parts.headers.clone(),
                body: body.to_vec(),
            });

            let r = reply(parts.uri.path());
            if let Some(delay) = r.delay {
                tokio::time::sleep(delay).await;
            }
            let mut builder = Response::builder().status(r.status);
            if let Some(cookie) = r.cookie {
                builder = builder.header("set-cookie", cookie);
            }
            builder.body(Body::from(r.body)).unwrap()
        }
    });

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (addr, downstream)
}

/// Start the sidecar in front of `gateway` on an ephemeral port.
pub async fn start_sidecar(gateway: Arc<Gateway>) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = HttpServer::new(gateway).run(listener, rx).await;
    });
    (addr, shutdown)
}

/// An address nothing listens on.
pub async fn closed_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

pub fn sample_allowlist() -> Allowlist {
    Allowlist::compile([
        "/company",
        "/company/{id}",
        "/company/account",
        "/tenant/account/blocked",
    ])
    .unwrap()
}

pub fn client() -> reqwest::Client {
    client_builder().build().unwrap()
}

pub fn client_builder() -> reqwest::ClientBuilder {
    reqwest::Client::builder().no_proxy().pool_max_idle_per_host(0)
}

/// A non-routable address: connects hang until the dial timeout fires.
pub const BLACKHOLE_ADDR: &str = "10.255.255.1:81";
