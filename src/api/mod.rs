//! Relay HTTP API module.
//!
//! # Purpose
//! Exposes route handler modules and the shared ingest authorization gate.
pub mod error;
pub mod ingest;
pub mod openapi;
pub mod route;
pub mod stream;
pub mod system;
pub mod types;

use crate::api::error::{api_unauthorized, ApiError};
use crate::app::AppState;
use axum::http::HeaderMap;

/// Header carrying the shared-secret ingest token.
pub const INGEST_TOKEN_HEADER: &str = "x-skyfeed-token";

/// Verify the shared-secret token on an ingest request.
///
/// This is an anti-accident gate for a single trusted sender, not a
/// cryptographic boundary; the comparison is constant-time anyway since it
/// costs nothing.
pub(crate) fn ensure_ingest_authorized(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<(), ApiError> {
    let token = match headers.get(INGEST_TOKEN_HEADER) {
        Some(value) => value
            .to_str()
            .map_err(|_| api_unauthorized("invalid ingest token"))?,
        None => return Err(api_unauthorized("missing ingest token")),
    };

    if !constant_time_eq(token.as_bytes(), state.ingest_token.as_bytes()) {
        return Err(api_unauthorized("invalid ingest token"));
    }
    Ok(())
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (left, right) in a.iter().zip(b.iter()) {
        diff |= left ^ right;
    }
    diff == 0
}
