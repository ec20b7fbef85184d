//! Allowlisting sidecar proxy.
//!
//! # Architecture Overview
//!
//! ```text
//!                         ┌──────────────────────────────────────────────┐
//!                         │                   SIDECAR                     │
//!     Client Request      │  ┌─────────┐   ┌─────────┐   ┌───────────┐   │
//!     ────────────────────┼─▶│   net   │──▶│  http   │──▶│  routing  │   │
//!                         │  │listener │   │ gateway │   │ allowlist │   │
//!                         │  └─────────┘   └────┬────┘   └───────────┘   │
//!                         │          rejected ◀─┤ admitted                │
//!     404 "Not found!"    │                     ▼                         │
//!     ◀───────────────────┼──────────── ┌──────────────┐                │
//!                         │             │ net          │────────────────┼──▶ Downstream
//!     Relayed response    │             │ downstream   │◀───────────────┼─── Service
//!     ◀───────────────────┼──────────── └──────────────┘                │
//!                         │                                              │
//!                         │  observability: access/error logs, stats,    │
//!                         │  metrics · admin API · lifecycle             │
//!                         └──────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::{Path, PathBuf};

use sidecar_proxy::config::{load_config, load_env_file, resolve_config_path};
use sidecar_proxy::lifecycle::{self, signals, Shutdown};
use sidecar_proxy::observability::logging;

#[derive(Parser)]
#[command(name = "sidecar-proxy")]
#[command(about = "Allowlisting HTTP sidecar proxy", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, env = "CONFIG_PATH")]
    config: Option<PathBuf>,

    /// Log level override (trace, debug, info, warn, error).
    #[arg(long, env = "SIDECAR_LOG_LEVEL")]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let env_file = load_env_file(Path::new(".env"));

    let cli = Cli::parse();
    let path = resolve_config_path(cli.config)?;
    let config = match load_config(&path) {
        Ok(config) => config,
        Err(e) => {
            logging::init_tracing(cli.log_level.as_deref().unwrap_or("info"));
            report_env_file(&env_file);
            tracing::error!(path = %path.display(), error = %e, "Failed to load configuration");
            return Err(e.into());
        }
    };

    logging::init_tracing(cli.log_level.as_deref().unwrap_or(&config.observability.log_level));
    report_env_file(&env_file);

    tracing::info!(
        path = %path.display(),
        service = %config.service_name,
        bind_address = %config.listener.bind_address,
        downstream = %config.downstream_url,
        patterns = config.allowlist.len(),
        "Configuration loaded"
    );

    let shutdown = Shutdown::new();
    signals::spawn_signal_listener(shutdown.clone());

    if let Err(e) = lifecycle::run(config, shutdown).await {
        tracing::error!(error = %e, "Sidecar failed");
        return Err(e.into());
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

fn report_env_file(result: &Result<bool, dotenvy::Error>) {
    if let Err(e) = result {
        tracing::warn!(error = %e, "Failed to parse .env file, continuing with the process environment");
    }
}
