//! Telemetry relay HTTP service entry point.
//!
//! # Purpose
//! Wires configuration, the flight registry, the planning-API proxy, and the
//! HTTP router, then starts the API server and the metrics endpoint.
//!
//! # Notes
//! `run_with_shutdown` and `build_state` keep the wiring testable and
//! minimize setup logic in `main`.
use anyhow::Context;
use skyfeed::app::{build_router, AppState};
use skyfeed::config::RelayConfig;
use skyfeed::observability;
use skyfeed::planning::{HttpRoutePlanSource, RouteCache};
use skyfeed::registry::FlightRegistry;
use std::future::Future;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = RelayConfig::from_env_or_yaml().context("relay config")?;
    run_with_shutdown(config, async {
        let _ = tokio::signal::ctrl_c().await;
    })
    .await
}

async fn run_with_shutdown<F>(config: RelayConfig, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let metrics_handle = observability::init_observability();
    let state = build_state(&config);
    let metrics_task = tokio::spawn(observability::serve_metrics(
        metrics_handle,
        config.metrics_bind,
    ));

    let app = build_router(state);

    let addr = config.bind_addr;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, route_proxy = config.route_api_url.is_some(), "telemetry relay listening");
    tokio::pin!(shutdown);
    tokio::select! {
        result = async { axum::serve(listener, app.into_make_service()).await } => {
            result?;
        }
        _ = &mut shutdown => {}
    }

    metrics_task.abort();
    let _ = metrics_task.await;
    Ok(())
}

fn build_state(config: &RelayConfig) -> AppState {
    let routes = config.route_api_url.as_ref().map(|url| {
        Arc::new(RouteCache::new(
            Arc::new(HttpRoutePlanSource::new(url.clone())),
            config.route_cache_ttl(),
        ))
    });

    AppState {
        api_version: "v1".to_string(),
        registry: Arc::new(FlightRegistry::new()),
        routes,
        ingest_token: config.ingest_token.clone(),
        keepalive: config.keepalive(),
        static_dir: config.static_dir.clone(),
    }
}
