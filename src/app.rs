//! Relay HTTP application wiring.
//!
//! # Purpose
//! Builds the Axum router, configures middleware, and defines the shared
//! application state injected into handlers.
//!
//! # Notes
//! Route composition lives here to keep `main` small and testable. The
//! registry is the only stateful collaborator on the telemetry path; the
//! route cache is optional and absent when no planning upstream is
//! configured.
use crate::api;
use crate::planning::RouteCache;
use crate::registry::FlightRegistry;
use axum::Router;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub api_version: String,
    pub registry: Arc<FlightRegistry>,
    pub routes: Option<Arc<RouteCache>>,
    pub ingest_token: String,
    /// Keepalive interval for subscriber streams.
    pub keepalive: Duration,
    /// Viewer assets directory, served as the router fallback when set.
    pub static_dir: Option<PathBuf>,
}

pub fn build_router(state: AppState) -> Router {
    let mut router = Router::new()
        .route(
            "/v1/telemetry",
            axum::routing::post(api::ingest::ingest_sample),
        )
        .route("/v1/stream", axum::routing::get(api::stream::stream_flight))
        .route("/v1/route", axum::routing::get(api::route::route_plan))
        .route(
            "/v1/system/info",
            axum::routing::get(api::system::system_info),
        )
        .route(
            "/v1/system/health",
            axum::routing::get(api::system::system_health),
        )
        .route(
            "/v1/openapi.json",
            axum::routing::get(api::openapi::openapi_json),
        );

    if let Some(dir) = &state.static_dir {
        router = router.fallback_service(ServeDir::new(dir));
    }

    // Browser viewers are served from arbitrary origins in practice; the only
    // write surface is already gated by the ingest token.
    router
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
