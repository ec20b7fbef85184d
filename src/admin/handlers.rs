use axum::{extract::State, Json};
use serde::Serialize;

use crate::admin::AdminState;
use crate::observability::StatsSnapshot;

#[derive(Debug, Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub service_name: String,
    pub downstream: String,
    pub timeout_ms: Option<u128>,
}

#[derive(Debug, Serialize)]
pub struct AllowlistEntry {
    pub pattern: String,
    pub wildcard: bool,
}

pub async fn get_status(State(state): State<AdminState>) -> Json<SystemStatus> {
    let gateway = &state.gateway;
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
        service_name: gateway.service_name().to_string(),
        downstream: gateway.target().address().to_string(),
        timeout_ms: gateway.timeout().map(|t| t.as_millis()),
    })
}

pub async fn get_stats(State(state): State<AdminState>) -> Json<StatsSnapshot> {
    Json(state.gateway.stats().snapshot())
}

pub async fn get_allowlist(State(state): State<AdminState>) -> Json<Vec<AllowlistEntry>> {
    Json(
        state
            .gateway
            .allowlist()
            .iter()
            .map(|p| AllowlistEntry {
                pattern: p.source().to_string(),
                wildcard: p.has_wildcard(),
            })
            .collect(),
    )
}
