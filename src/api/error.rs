//! API error types and helpers.
//!
//! # Purpose
//! Centralizes HTTP error response construction so every endpoint returns the
//! same `{code, message}` shape.
//!
//! # Notes
//! Subscriber write failures are deliberately *not* represented here: they
//! are internal to the broadcast path and never surface to any HTTP caller.
use crate::api::types::ErrorResponse;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

/// Structured API error returned by handlers.
///
/// Couples an HTTP status code with a JSON error body; `status` must match
/// the semantics of `body.code`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorResponse,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status, Json(self.body)).into_response()
    }
}

fn api_error(status: StatusCode, code: &str, message: &str) -> ApiError {
    ApiError {
        status,
        body: ErrorResponse {
            code: code.to_string(),
            message: message.to_string(),
            request_id: None,
        },
    }
}

/// Build a 401 Unauthorized error (missing or mismatched ingest token).
pub fn api_unauthorized(message: &str) -> ApiError {
    api_error(StatusCode::UNAUTHORIZED, "unauthorized", message)
}

/// Build a 400 Bad Request validation error (malformed telemetry payload).
pub fn api_validation_error(message: &str) -> ApiError {
    api_error(StatusCode::BAD_REQUEST, "validation_error", message)
}

/// Build a 404 error for endpoints that are disabled by configuration.
pub fn api_not_enabled(message: &str) -> ApiError {
    // NOT_FOUND rather than a dedicated status, so the disabled surface is
    // indistinguishable from an absent one.
    api_error(StatusCode::NOT_FOUND, "not_enabled", message)
}

/// Build a 502 Bad Gateway error from an upstream proxy failure.
///
/// Logs the upstream detail server-side and returns a generic message.
pub fn api_bad_gateway(message: &str, err: &crate::planning::RouteError) -> ApiError {
    tracing::warn!(error = %err, "planning upstream failure");
    api_error(StatusCode::BAD_GATEWAY, "bad_gateway", message)
}
