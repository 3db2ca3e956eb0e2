//! Telemetry ingest handler.
//!
//! # Purpose
//! Accepts position updates from the single authenticated simulator-side
//! sender, validates them, and publishes them through the flight registry.
//!
//! # Notes
//! Authorization is checked before the body is parsed, so a bad token is
//! reported as `401` even when the payload is also malformed. The body is
//! read as raw bytes rather than through the JSON extractor to keep that
//! precedence.
use crate::api::ensure_ingest_authorized;
use crate::api::error::{api_validation_error, ApiError};
use crate::api::types::FlightQuery;
use crate::app::AppState;
use crate::model::{resolve_flight_id, TelemetrySample};
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use serde_json::Value;

#[utoipa::path(
    post,
    path = "/v1/telemetry",
    tag = "telemetry",
    params(FlightQuery),
    request_body = Object,
    responses(
        (status = 204, description = "Sample accepted and broadcast"),
        (status = 400, description = "Malformed payload", body = crate::api::types::ErrorResponse),
        (status = 401, description = "Missing or invalid ingest token", body = crate::api::types::ErrorResponse)
    )
)]
/// Ingest one telemetry sample.
///
/// On success the sample replaces the flight's last-known state and is
/// broadcast to every open stream for that flight. Subscriber health never
/// affects the response: once validation passes the ingest succeeds.
///
/// # Errors
/// - `401` when the shared-secret token is missing or wrong (no side effects).
/// - `400` when the body is not JSON or `lat`/`lon` are missing/non-finite
///   (no side effects).
pub(crate) async fn ingest_sample(
    Query(params): Query<FlightQuery>,
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    ensure_ingest_authorized(&state, &headers)?;

    let payload: Value = serde_json::from_slice(&body)
        .map_err(|_| api_validation_error("body must be a JSON object"))?;
    let flight_id = resolve_flight_id(params.flight.as_deref(), &payload);
    let sample = TelemetrySample::from_payload(&flight_id, &payload)
        .map_err(|err| api_validation_error(&err.to_string()))?;

    tracing::debug!(flight = %flight_id, lat = sample.lat, lon = sample.lon, "sample ingested");
    state.registry.publish(sample);
    Ok(StatusCode::NO_CONTENT)
}
