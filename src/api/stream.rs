//! Subscriber stream handler.
//!
//! # Purpose
//! Serves the long-lived Server-Sent Events connection a viewer holds open
//! for one flight: replay of the last-known sample on join, one event per
//! broadcast afterwards, and periodic keepalive comments so intermediaries
//! do not reclaim an idle connection.
//!
//! # Lifecycle
//! All cleanup rides on drop order: when the client disconnects, Axum drops
//! the response body, which drops the keepalive timer and the registry
//! [`Subscription`] in one step. Unsubscription is idempotent, so a broadcast
//! racing the teardown is swallowed by the registry rather than surfaced.
use crate::api::types::FlightQuery;
use crate::app::AppState;
use crate::model::{resolve_flight_id, TelemetrySample};
use axum::extract::{Query, State};
use axum::http::header;
use axum::http::HeaderName;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::IntoResponse;
use futures::{stream, StreamExt};
use serde_json::Value;
use std::sync::Arc;

#[utoipa::path(
    get,
    path = "/v1/stream",
    tag = "telemetry",
    params(FlightQuery),
    responses(
        (status = 200, description = "SSE stream of telemetry samples", content_type = "text/event-stream")
    )
)]
/// Open a telemetry stream for one flight.
///
/// The connection stays open until the client disconnects. Late joiners see
/// the flight's current state immediately when one has been ingested.
pub(crate) async fn stream_flight(
    Query(params): Query<FlightQuery>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let flight_id = resolve_flight_id(params.flight.as_deref(), &Value::Null);
    let mut subscription = state.registry.subscribe(&flight_id);
    let replay = subscription.take_replay();
    tracing::debug!(flight = %flight_id, replay = replay.is_some(), "stream opened");

    let events = stream::iter(replay)
        .map(sample_event)
        .chain(subscription.map(sample_event));
    let sse = Sse::new(events).keep_alive(
        KeepAlive::new()
            .interval(state.keepalive)
            .text("keepalive"),
    );

    // Proxies must neither cache nor buffer the event stream.
    (
        [
            (header::CACHE_CONTROL, "no-cache"),
            (HeaderName::from_static("x-accel-buffering"), "no"),
        ],
        sse,
    )
}

fn sample_event(sample: Arc<TelemetrySample>) -> Result<Event, axum::Error> {
    Event::default().json_data(sample.as_ref())
}
