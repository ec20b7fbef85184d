//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the axum Router sending every request to the gateway
//! - Wire up middleware (tracing)
//! - Provide client addresses to the handler
//! - Serve until shutdown is signalled
//!
//! No request timeout layer is installed: the only bound on forwarding is
//! the downstream dial timeout.

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{Request, Response},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

use crate::http::Gateway;
use crate::lifecycle::shutdown;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<Gateway>,
}

/// HTTP server for the sidecar.
pub struct HttpServer {
    router: Router,
    gateway: Arc<Gateway>,
}

impl HttpServer {
    pub fn new(gateway: Arc<Gateway>) -> Self {
        let state = AppState {
            gateway: gateway.clone(),
        };
        Self {
            router: Self::build_router(state),
            gateway,
        }
    }

    /// Every method and path goes to the proxy handler; admission happens there.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .fallback(proxy_handler)
            .with_state(state)
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server until the shutdown signal fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown_rx: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            service = %self.gateway.service_name(),
            downstream = %self.gateway.target().address(),
            "HTTP server starting"
        );

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown::wait(shutdown_rx))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn proxy_handler(
    State(state): State<AppState>,
    ConnectInfo(client): ConnectInfo<SocketAddr>,
    request: Request<Body>,
) -> Response<Body> {
    state.gateway.handle(client, request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::Allowlist;
    use axum::extract::connect_info::MockConnectInfo;
    use axum::http::StatusCode;
    use tower::ServiceExt;

    fn router() -> (Router, Arc<Gateway>) {
        let allowlist = Allowlist::compile(["/company"]).unwrap();
        let gateway = Arc::new(Gateway::builder("http://127.0.0.1:9", allowlist).build().unwrap());
        let state = AppState {
            gateway: gateway.clone(),
        };
        let router = HttpServer::build_router(state)
            .layer(MockConnectInfo(SocketAddr::from(([10, 1, 2, 3], 4567))));
        (router, gateway)
    }

    #[tokio::test]
    async fn test_any_method_and_path_reaches_gateway() {
        let (router, gateway) = router();

        for (method, uri) in [("GET", "/"), ("DELETE", "/a/b/c"), ("PATCH", "/x?y=z"), ("OPTIONS", "/company/1")] {
            let req = Request::builder().method(method).uri(uri).body(Body::empty()).unwrap();
            let res = router.clone().oneshot(req).await.unwrap();
            assert_eq!(res.status(), StatusCode::NOT_FOUND, "{} {}", method, uri);
        }

        assert_eq!(gateway.stats().rejected_requests(), 4);
    }
}
