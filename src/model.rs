//! Telemetry domain types.
//!
//! # Purpose
//! Defines the immutable telemetry sample relayed from the simulator to
//! stream subscribers, and the coercion rules for building one from a raw
//! ingest payload.
//!
//! # Notes
//! Coercion is deliberately lenient for the optional fields (absent or
//! non-numeric values become `0`) and strict for coordinates, matching the
//! contract the simulator-side sender was written against.
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use utoipa::ToSchema;

/// Sentinel flight identifier used when the caller supplies none.
pub const DEFAULT_FLIGHT_ID: &str = "default";

#[derive(Debug, Error)]
pub enum SampleError {
    #[error("{0} must be a finite number")]
    InvalidCoordinate(&'static str),
}

/// One instantaneous aircraft state.
///
/// Immutable once constructed; each ingested sample fully replaces the
/// flight's previous state, there is no field-level merging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TelemetrySample {
    /// Flight identifier this sample belongs to.
    pub flight: String,
    /// Latitude in decimal degrees.
    pub lat: f64,
    /// Longitude in decimal degrees.
    pub lon: f64,
    pub alt_ft: f64,
    pub hdg_deg: f64,
    pub gs_kts: f64,
    pub vs_fpm: f64,
    pub tas_kts: f64,
    /// Receipt timestamp in epoch milliseconds. Server-assigned unless the
    /// sender supplied its own.
    #[serde(rename = "serverTs")]
    pub server_ts: i64,
}

impl TelemetrySample {
    /// Build a sample from a raw ingest payload.
    ///
    /// `lat` and `lon` must be present, numeric, and finite. The remaining
    /// telemetry fields coerce to `0` when absent or non-numeric. `serverTs`
    /// is preserved when the sender provided a numeric value, otherwise it is
    /// assigned from the server clock.
    ///
    /// # Errors
    /// - `SampleError::InvalidCoordinate` when `lat` or `lon` is missing or
    ///   not a finite number.
    pub fn from_payload(flight_id: &str, payload: &Value) -> Result<Self, SampleError> {
        let lat = finite_field(payload, "lat").ok_or(SampleError::InvalidCoordinate("lat"))?;
        let lon = finite_field(payload, "lon").ok_or(SampleError::InvalidCoordinate("lon"))?;
        Ok(Self {
            flight: flight_id.to_string(),
            lat,
            lon,
            alt_ft: numeric_or_zero(payload, "alt_ft"),
            hdg_deg: numeric_or_zero(payload, "hdg_deg"),
            gs_kts: numeric_or_zero(payload, "gs_kts"),
            vs_fpm: numeric_or_zero(payload, "vs_fpm"),
            tas_kts: numeric_or_zero(payload, "tas_kts"),
            server_ts: finite_field(payload, "serverTs")
                .map(|ts| ts as i64)
                .unwrap_or_else(now_millis),
        })
    }
}

/// Resolve the flight identifier for a request: query parameter first, then
/// the payload's `flight` field, then the default sentinel. Blank values fall
/// through to the next source.
pub fn resolve_flight_id(query: Option<&str>, payload: &Value) -> String {
    let from_query = query.map(str::trim).filter(|id| !id.is_empty());
    let from_body = payload
        .get("flight")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|id| !id.is_empty());
    from_query
        .or(from_body)
        .unwrap_or(DEFAULT_FLIGHT_ID)
        .to_string()
}

fn finite_field(payload: &Value, field: &str) -> Option<f64> {
    payload
        .get(field)
        .and_then(Value::as_f64)
        .filter(|value| value.is_finite())
}

fn numeric_or_zero(payload: &Value, field: &str) -> f64 {
    finite_field(payload, field).unwrap_or(0.0)
}

fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn from_payload_coerces_optional_fields_to_zero() {
        let payload = json!({
            "lat": 33.1,
            "lon": -97.2,
            "alt_ft": 10000,
            "hdg_deg": "not a number",
            "gs_kts": null
        });
        let sample = TelemetrySample::from_payload("W735", &payload).expect("sample");
        assert_eq!(sample.flight, "W735");
        assert_eq!(sample.lat, 33.1);
        assert_eq!(sample.lon, -97.2);
        assert_eq!(sample.alt_ft, 10000.0);
        assert_eq!(sample.hdg_deg, 0.0);
        assert_eq!(sample.gs_kts, 0.0);
        assert_eq!(sample.vs_fpm, 0.0);
        assert_eq!(sample.tas_kts, 0.0);
        assert!(sample.server_ts > 0);
    }

    #[test]
    fn from_payload_rejects_missing_or_non_numeric_coordinates() {
        let missing = json!({ "lon": -97.2 });
        let err = TelemetrySample::from_payload("W735", &missing).expect_err("missing lat");
        assert_eq!(err.to_string(), "lat must be a finite number");

        let non_numeric = json!({ "lat": "not a number", "lon": -97.2 });
        assert!(TelemetrySample::from_payload("W735", &non_numeric).is_err());

        let bad_lon = json!({ "lat": 33.1, "lon": null });
        let err = TelemetrySample::from_payload("W735", &bad_lon).expect_err("bad lon");
        assert_eq!(err.to_string(), "lon must be a finite number");
    }

    #[test]
    fn from_payload_preserves_supplied_server_ts() {
        let payload = json!({ "lat": 1.0, "lon": 2.0, "serverTs": 1700000000123i64 });
        let sample = TelemetrySample::from_payload("default", &payload).expect("sample");
        assert_eq!(sample.server_ts, 1700000000123);
    }

    #[test]
    fn from_payload_assigns_server_ts_for_non_numeric_value() {
        let payload = json!({ "lat": 1.0, "lon": 2.0, "serverTs": "yesterday" });
        let sample = TelemetrySample::from_payload("default", &payload).expect("sample");
        assert!(sample.server_ts > 1_000_000_000_000);
    }

    #[test]
    fn resolve_flight_id_prefers_query_then_body_then_default() {
        let payload = json!({ "flight": "BODY1" });
        assert_eq!(resolve_flight_id(Some("Q1"), &payload), "Q1");
        assert_eq!(resolve_flight_id(None, &payload), "BODY1");
        assert_eq!(resolve_flight_id(Some("  "), &json!({})), "default");
        assert_eq!(resolve_flight_id(None, &json!({ "flight": "" })), "default");
    }

    #[test]
    fn sample_serializes_with_wire_field_names() {
        let payload = json!({ "lat": 1.5, "lon": 2.5, "serverTs": 42 });
        let sample = TelemetrySample::from_payload("W735", &payload).expect("sample");
        let value = serde_json::to_value(&sample).expect("serialize");
        assert_eq!(value["serverTs"], 42);
        assert_eq!(value["lat"], 1.5);
        assert!(value.get("server_ts").is_none());
    }
}
