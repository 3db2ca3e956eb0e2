//! OpenAPI schema aggregation for the relay API.
//!
//! # Purpose
//! Collects all routes and schema types into a single OpenAPI document,
//! served at `/v1/openapi.json`.
use crate::api::types::{ErrorResponse, HealthStatus, SystemInfo};
use crate::api::{ingest, route, stream, system};
use crate::model::TelemetrySample;
use axum::Json;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "skyfeed",
        version = "v1",
        description = "Live flight telemetry relay HTTP API"
    ),
    paths(
        system::system_info,
        system::system_health,
        ingest::ingest_sample,
        stream::stream_flight,
        route::route_plan
    ),
    components(schemas(TelemetrySample, ErrorResponse, HealthStatus, SystemInfo)),
    tags(
        (name = "system", description = "Health and discovery endpoints"),
        (name = "telemetry", description = "Telemetry ingest and live streaming"),
        (name = "route", description = "Planning-API proxy")
    )
)]
pub struct ApiDoc;

/// Serve the generated OpenAPI document.
pub(crate) async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
