//! Planned-route proxy handler.
//!
//! # Purpose
//! Exposes the cached planning-API document for a flight so the viewer can
//! draw the filed route alongside live telemetry.
use crate::api::error::{api_bad_gateway, api_not_enabled, ApiError};
use crate::api::types::FlightQuery;
use crate::app::AppState;
use crate::model::resolve_flight_id;
use axum::extract::{Query, State};
use axum::Json;
use serde_json::Value;

#[utoipa::path(
    get,
    path = "/v1/route",
    tag = "route",
    params(FlightQuery),
    responses(
        (status = 200, description = "Planning document for the flight (upstream shape, passed through)"),
        (status = 404, description = "Route proxy not configured", body = crate::api::types::ErrorResponse),
        (status = 502, description = "Planning upstream failed", body = crate::api::types::ErrorResponse)
    )
)]
/// Fetch the planned route for a flight, served from cache within its TTL.
///
/// # Errors
/// - `404 not_enabled` when no planning upstream is configured.
/// - `502` when the upstream request fails on a cache miss.
pub(crate) async fn route_plan(
    Query(params): Query<FlightQuery>,
    State(state): State<AppState>,
) -> Result<Json<Value>, ApiError> {
    let Some(routes) = state.routes.as_ref() else {
        return Err(api_not_enabled("route proxy not configured"));
    };
    let flight_id = resolve_flight_id(params.flight.as_deref(), &Value::Null);
    let plan = routes
        .plan_for(&flight_id)
        .await
        .map_err(|err| api_bad_gateway("planning API unavailable", &err))?;
    Ok(Json(plan))
}
