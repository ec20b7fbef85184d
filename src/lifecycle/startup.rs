//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the gateway from validated configuration
//! - Install the metrics exporter and admin API when enabled
//! - Bind the listener last and serve until shutdown

use metrics_exporter_prometheus::BuildError;
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;

use crate::admin::{self, AdminState};
use crate::config::SidecarConfig;
use crate::http::{Gateway, GatewayError, HttpServer};
use crate::lifecycle::Shutdown;
use crate::net::{self, ListenerError};
use crate::observability::metrics;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Listener(#[from] ListenerError),

    #[error("invalid metrics address `{0}`")]
    MetricsAddress(String),

    #[error("failed to install metrics exporter: {0}")]
    Metrics(#[from] BuildError),

    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

/// Run the sidecar until `shutdown` is triggered.
pub async fn run(config: SidecarConfig, shutdown: Shutdown) -> Result<(), StartupError> {
    let gateway = Arc::new(Gateway::from_config(&config)?);

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config
            .observability
            .metrics_address
            .parse()
            .map_err(|_| StartupError::MetricsAddress(config.observability.metrics_address.clone()))?;
        metrics::init_metrics(addr)?;
    }

    let admin_task = if config.admin.enabled {
        let listener = net::bind(&config.admin.bind_address).await?;
        let state = AdminState::new(gateway.clone(), config.admin.api_key.clone());
        let rx = shutdown.subscribe();
        Some(tokio::spawn(async move {
            if let Err(e) = admin::serve(listener, state, rx).await {
                tracing::error!(error = %e, "Admin server failed");
            }
        }))
    } else {
        None
    };

    let listener = net::bind(&config.listener.bind_address).await?;
    HttpServer::new(gateway).run(listener, shutdown.subscribe()).await?;

    if let Some(task) = admin_task {
        let _ = task.await;
    }
    Ok(())
}
