//! End-to-end stream behavior over a real listener.
//!
//! `oneshot` cannot exercise a long-lived response body, so these tests bind
//! an ephemeral port and read the SSE stream with a real HTTP client.
use serde_json::json;
use skyfeed::app::{build_router, AppState};
use skyfeed::model::TelemetrySample;
use skyfeed::registry::FlightRegistry;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

const TOKEN: &str = "test-token";

fn sample(flight: &str, lat: f64) -> TelemetrySample {
    TelemetrySample::from_payload(flight, &json!({ "lat": lat, "lon": -97.2, "serverTs": 1 }))
        .expect("sample")
}

fn relay_state(keepalive: Duration) -> AppState {
    AppState {
        api_version: "v1".to_string(),
        registry: Arc::new(FlightRegistry::new()),
        routes: None,
        ingest_token: TOKEN.to_string(),
        keepalive,
        static_dir: None,
    }
}

async fn spawn_relay(state: AppState) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let app = build_router(state);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app.into_make_service()).await;
    });
    addr
}

fn build_client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .build()
        .expect("build client")
}

/// Accumulate stream bytes until `needle` appears, or panic at the deadline.
async fn read_until(response: &mut reqwest::Response, needle: &str, buffer: &mut String) {
    let deadline = Instant::now() + Duration::from_secs(3);
    while !buffer.contains(needle) {
        let remaining = deadline
            .checked_duration_since(Instant::now())
            .unwrap_or_else(|| panic!("stream never produced {needle:?}; got {buffer:?}"));
        let chunk = tokio::time::timeout(remaining, response.chunk())
            .await
            .expect("stream read timed out")
            .expect("stream read failed")
            .expect("stream closed early");
        buffer.push_str(&String::from_utf8_lossy(&chunk));
    }
}

async fn wait_for<F: Fn() -> bool>(condition: F, what: &str) {
    let deadline = Instant::now() + Duration::from_secs(2);
    while !condition() {
        assert!(Instant::now() < deadline, "timed out waiting for {what}");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

#[tokio::test]
async fn late_joiner_sees_replay_then_live_updates_in_order() {
    let state = relay_state(Duration::from_secs(25));
    let registry = state.registry.clone();
    let addr = spawn_relay(state).await;
    let client = build_client();

    // Sample ingested before the subscriber connects: must be replayed first.
    registry.publish(sample("W735", 33.1));

    let mut response = client
        .get(format!("http://{addr}/v1/stream?flight=W735"))
        .send()
        .await
        .expect("open stream");
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    let mut buffer = String::new();
    read_until(&mut response, "\"lat\":33.1", &mut buffer).await;
    assert!(buffer.contains("\"lon\":-97.2"));

    // Live update sent through the public ingest endpoint.
    let ingest = client
        .post(format!("http://{addr}/v1/telemetry?flight=W735"))
        .header("x-skyfeed-token", TOKEN)
        .json(&json!({ "lat": 34.5, "lon": -98.0, "alt_ft": 10000 }))
        .send()
        .await
        .expect("ingest");
    assert_eq!(ingest.status(), reqwest::StatusCode::NO_CONTENT);

    read_until(&mut response, "\"lat\":34.5", &mut buffer).await;
    let replay_at = buffer.find("\"lat\":33.1").expect("replay event");
    let live_at = buffer.find("\"lat\":34.5").expect("live event");
    assert!(replay_at < live_at, "replay must precede live updates");
    assert!(buffer.contains("\"alt_ft\":10000"));
}

#[tokio::test]
async fn subscriber_without_history_waits_for_first_update() {
    let state = relay_state(Duration::from_secs(25));
    let registry = state.registry.clone();
    let addr = spawn_relay(state).await;
    let client = build_client();

    let mut response = client
        .get(format!("http://{addr}/v1/stream?flight=EMPTY"))
        .send()
        .await
        .expect("open stream");

    let registry_ready = registry.clone();
    wait_for(|| registry_ready.stats().subscribers == 1, "subscriber").await;

    registry.publish(sample("EMPTY", 10.0));
    let mut buffer = String::new();
    read_until(&mut response, "\"lat\":10.0", &mut buffer).await;
    // The first data frame is the live update, not a replay.
    assert_eq!(buffer.matches("data:").count(), 1);
}

#[tokio::test]
async fn flights_are_isolated_across_streams() {
    let state = relay_state(Duration::from_secs(25));
    let registry = state.registry.clone();
    let addr = spawn_relay(state).await;
    let client = build_client();

    let mut stream_a = client
        .get(format!("http://{addr}/v1/stream?flight=A"))
        .send()
        .await
        .expect("stream A");
    let mut stream_b = client
        .get(format!("http://{addr}/v1/stream?flight=B"))
        .send()
        .await
        .expect("stream B");

    let registry_ready = registry.clone();
    wait_for(|| registry_ready.stats().subscribers == 2, "subscribers").await;

    registry.publish(sample("A", 1.0));
    registry.publish(sample("B", 2.0));

    let mut buffer_a = String::new();
    read_until(&mut stream_a, "\"lat\":1.0", &mut buffer_a).await;
    assert!(!buffer_a.contains("\"flight\":\"B\""));

    let mut buffer_b = String::new();
    read_until(&mut stream_b, "\"lat\":2.0", &mut buffer_b).await;
    assert!(!buffer_b.contains("\"flight\":\"A\""));
}

#[tokio::test]
async fn idle_stream_receives_keepalive_comments() {
    let state = relay_state(Duration::from_millis(200));
    let addr = spawn_relay(state).await;
    let client = build_client();

    let mut response = client
        .get(format!("http://{addr}/v1/stream?flight=IDLE"))
        .send()
        .await
        .expect("open stream");

    let mut buffer = String::new();
    read_until(&mut response, ": keepalive", &mut buffer).await;
    assert!(!buffer.contains("data:"), "no telemetry was published");
}

#[tokio::test]
async fn disconnect_removes_the_subscriber() {
    let state = relay_state(Duration::from_secs(25));
    let registry = state.registry.clone();
    let addr = spawn_relay(state).await;
    let client = build_client();

    let response = client
        .get(format!("http://{addr}/v1/stream?flight=W735"))
        .send()
        .await
        .expect("open stream");

    let registry_ready = registry.clone();
    wait_for(|| registry_ready.stats().subscribers == 1, "subscriber").await;

    drop(response);

    let registry_gone = registry.clone();
    wait_for(
        || registry_gone.stats().subscribers == 0,
        "subscriber removal",
    )
    .await;

    // Publishing after the disconnect must still succeed.
    registry.publish(sample("W735", 99.0));
    assert_eq!(registry.last_sample("W735").expect("retained").lat, 99.0);
}
