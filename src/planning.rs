//! Flight-planning API proxy and cache.
//!
//! # Purpose
//! Bridges the viewer to the third-party planning API that knows the filed
//! route for a flight. The upstream is slow and rate-limited, so responses
//! are cached per flight identifier for a configurable TTL. This collaborator
//! is read-mostly and fully independent of the live telemetry registry.
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::RwLock;

#[derive(Debug, Error)]
pub enum RouteError {
    #[error("upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),
    #[error("upstream returned status {0}")]
    Status(u16),
}

/// Source of planned-route documents.
///
/// Handlers hold this as a trait object so tests can stub the upstream the
/// same way the HTTP implementation is swapped in at startup.
#[async_trait]
pub trait RoutePlanSource: Send + Sync {
    /// Fetch the planning document for a flight. The document shape belongs
    /// to the upstream API and is passed through opaquely.
    async fn fetch_plan(&self, flight_id: &str) -> Result<Value, RouteError>;
}

/// `RoutePlanSource` backed by an HTTP planning API.
pub struct HttpRoutePlanSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpRoutePlanSource {
    pub fn new(base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }
}

#[async_trait]
impl RoutePlanSource for HttpRoutePlanSource {
    async fn fetch_plan(&self, flight_id: &str) -> Result<Value, RouteError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("flight", flight_id)])
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RouteError::Status(status.as_u16()));
        }
        Ok(response.json().await?)
    }
}

struct CachedPlan {
    fetched_at: Instant,
    plan: Value,
}

/// Per-flight TTL cache in front of a [`RoutePlanSource`].
///
/// Fresh entries are served without touching the upstream. The upstream call
/// happens outside the lock, so concurrent misses for the same flight may
/// fetch twice; the last writer wins, which is harmless for an idempotent GET.
pub struct RouteCache {
    source: Arc<dyn RoutePlanSource>,
    ttl: Duration,
    entries: RwLock<HashMap<String, CachedPlan>>,
}

impl RouteCache {
    pub fn new(source: Arc<dyn RoutePlanSource>, ttl: Duration) -> Self {
        Self {
            source,
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Return the cached plan for the flight, fetching from the upstream when
    /// the entry is missing or stale.
    ///
    /// # Errors
    /// - Propagates [`RouteError`] from the upstream on a cache miss.
    pub async fn plan_for(&self, flight_id: &str) -> Result<Value, RouteError> {
        if let Some(plan) = self.fresh_entry(flight_id).await {
            return Ok(plan);
        }
        let plan = self.source.fetch_plan(flight_id).await?;
        let mut entries = self.entries.write().await;
        entries.insert(
            flight_id.to_string(),
            CachedPlan {
                fetched_at: Instant::now(),
                plan: plan.clone(),
            },
        );
        tracing::debug!(flight = flight_id, "route plan cached");
        Ok(plan)
    }

    async fn fresh_entry(&self, flight_id: &str) -> Option<Value> {
        let entries = self.entries.read().await;
        entries
            .get(flight_id)
            .filter(|entry| entry.fetched_at.elapsed() < self.ttl)
            .map(|entry| entry.plan.clone())
    }
}
