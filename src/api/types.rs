//! HTTP API request/response types.
//!
//! # Purpose
//! Shared payload shapes for the relay's REST surface and OpenAPI schema
//! generation. The telemetry sample itself lives in [`crate::model`].
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    pub request_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct HealthStatus {
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct SystemInfo {
    pub api_version: String,
    /// Flight channels created since startup.
    pub flights: usize,
    /// Currently connected stream subscribers.
    pub subscribers: usize,
    /// Whether the planning-API proxy is configured.
    pub route_proxy_enabled: bool,
}

/// Query selector shared by the ingest, stream, and route endpoints.
#[derive(Debug, Deserialize, IntoParams)]
pub struct FlightQuery {
    /// Flight identifier; defaults to `default` when absent.
    pub flight: Option<String>,
}
