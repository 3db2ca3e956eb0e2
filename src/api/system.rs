//! System/health API handlers.
//!
//! # Purpose
//! Lightweight endpoints for probes and operators: liveness plus a summary
//! of the relay's in-memory state.
use crate::api::types::{HealthStatus, SystemInfo};
use crate::app::AppState;
use axum::extract::State;
use axum::Json;

#[utoipa::path(
    get,
    path = "/v1/system/info",
    tag = "system",
    responses(
        (status = 200, description = "Relay identity and live counters", body = SystemInfo)
    )
)]
/// Return relay identity and live channel counters.
pub(crate) async fn system_info(State(state): State<AppState>) -> Json<SystemInfo> {
    let stats = state.registry.stats();
    Json(SystemInfo {
        api_version: state.api_version.clone(),
        flights: stats.flights,
        subscribers: stats.subscribers,
        route_proxy_enabled: state.routes.is_some(),
    })
}

#[utoipa::path(
    get,
    path = "/v1/system/health",
    tag = "system",
    responses(
        (status = 200, description = "Relay health", body = HealthStatus)
    )
)]
/// Return relay health status.
///
/// The relay has no external dependencies on the hot path, so health is a
/// constant `ok` while the process serves requests.
pub(crate) async fn system_health() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok".to_string(),
    })
}
