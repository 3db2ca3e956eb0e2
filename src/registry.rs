//! In-memory flight channel registry.
//!
//! # Purpose
//! Owns the live state of the relay: one channel per flight identifier, each
//! holding the set of active stream subscribers and the last sample seen.
//! This is the only shared mutable state in the process; every mutation goes
//! through the registry so concurrent ingest, subscribe, and disconnect never
//! race on the underlying maps.
//!
//! # Consistency and lifecycle
//! - **Not durable**: all channels are lost on restart, by design.
//! - Channels are created lazily on first publish or first subscribe and are
//!   never destroyed; the retained last sample makes late joiners see current
//!   state immediately. Retention is unbounded in the number of flight
//!   identifiers, which is acceptable while identifiers are operator-chosen.
//! - Fan-out is best effort. A subscriber whose connection is already gone is
//!   skipped during broadcast and removed only by its own disconnect path.
//!
//! # Locking
//! A single `std::sync::Mutex` guards the channel map. Registry operations
//! are plain map mutations held only for their duration, and subscriber
//! cleanup must run from `Drop` (no await point), so the lock is synchronous
//! rather than the async `RwLock` used elsewhere in this codebase.
use crate::model::TelemetrySample;
use std::collections::HashMap;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll};
use tokio::sync::mpsc;

pub type SubscriberId = u64;

/// Live state for one flight identifier.
#[derive(Default)]
struct Channel {
    last_sample: Option<Arc<TelemetrySample>>,
    subscribers: HashMap<SubscriberId, mpsc::UnboundedSender<Arc<TelemetrySample>>>,
}

/// Counts reported by [`FlightRegistry::stats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryStats {
    /// Channels created so far (including ones whose subscriber set is empty).
    pub flights: usize,
    /// Currently registered stream subscribers across all channels.
    pub subscribers: usize,
}

/// Registry mapping flight identifiers to their live channels.
pub struct FlightRegistry {
    channels: Mutex<HashMap<String, Channel>>,
    next_subscriber_id: AtomicU64,
}

impl FlightRegistry {
    pub fn new() -> Self {
        Self {
            channels: Mutex::new(HashMap::new()),
            next_subscriber_id: AtomicU64::new(0),
        }
    }

    /// Replace the channel's last sample and fan it out to every registered
    /// subscriber.
    ///
    /// Sends are non-blocking; a subscriber whose receiving side is already
    /// closed is skipped for this broadcast and left registered, since its
    /// own disconnect path owns removal. Publish therefore always succeeds
    /// regardless of subscriber health.
    pub fn publish(&self, sample: TelemetrySample) {
        let sample = Arc::new(sample);
        let mut channels = self.lock_channels();
        let channel = channels.entry(sample.flight.clone()).or_default();
        channel.last_sample = Some(sample.clone());
        for (id, sink) in &channel.subscribers {
            if sink.send(sample.clone()).is_err() {
                tracing::debug!(
                    flight = %sample.flight,
                    subscriber = id,
                    "skipping closed subscriber sink during broadcast"
                );
            }
        }
        metrics::counter!("skyfeed_samples_total").increment(1);
    }

    /// Register a new subscriber on the flight's channel.
    ///
    /// The channel's current last sample is captured under the same lock that
    /// registers the sink, so the caller can replay it knowing every later
    /// publish will be observed after it, in publish order.
    ///
    /// The returned [`Subscription`] unsubscribes itself when dropped.
    pub fn subscribe(self: &Arc<Self>, flight_id: &str) -> Subscription {
        let id = self.next_subscriber_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::unbounded_channel();
        let replay = {
            let mut channels = self.lock_channels();
            let channel = channels.entry(flight_id.to_string()).or_default();
            channel.subscribers.insert(id, tx);
            let replay = channel.last_sample.clone();
            self.update_subscriber_gauge(&channels);
            replay
        };
        tracing::debug!(flight = flight_id, subscriber = id, "subscriber registered");
        Subscription {
            registry: self.clone(),
            flight_id: flight_id.to_string(),
            id,
            replay,
            rx,
        }
    }

    /// Remove a subscriber from the flight's channel. Safe to call for an
    /// already-removed subscriber; duplicate disconnect notifications are a
    /// no-op.
    pub fn unsubscribe(&self, flight_id: &str, id: SubscriberId) {
        let mut channels = self.lock_channels();
        let removed = channels
            .get_mut(flight_id)
            .and_then(|channel| channel.subscribers.remove(&id));
        if removed.is_some() {
            self.update_subscriber_gauge(&channels);
            tracing::debug!(flight = flight_id, subscriber = id, "subscriber removed");
        }
    }

    /// Last sample published for the flight, if any.
    pub fn last_sample(&self, flight_id: &str) -> Option<Arc<TelemetrySample>> {
        self.lock_channels()
            .get(flight_id)
            .and_then(|channel| channel.last_sample.clone())
    }

    pub fn stats(&self) -> RegistryStats {
        let channels = self.lock_channels();
        RegistryStats {
            flights: channels.len(),
            subscribers: channels
                .values()
                .map(|channel| channel.subscribers.len())
                .sum(),
        }
    }

    fn update_subscriber_gauge(&self, channels: &HashMap<String, Channel>) {
        let subscribers: usize = channels
            .values()
            .map(|channel| channel.subscribers.len())
            .sum();
        metrics::gauge!("skyfeed_subscribers").set(subscribers as f64);
        metrics::gauge!("skyfeed_flights").set(channels.len() as f64);
    }

    fn lock_channels(&self) -> MutexGuard<'_, HashMap<String, Channel>> {
        // A panic while holding the lock leaves plain map data behind, which
        // is still safe to use; recover instead of propagating the poison.
        self.channels.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for FlightRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// One registered stream subscriber: the receiving half of its sink plus the
/// replay sample captured at registration time.
///
/// Implements [`futures::Stream`] over the broadcast samples. Dropping the
/// subscription (the SSE response body going away is the only trigger in
/// production) removes the registration exactly once.
pub struct Subscription {
    registry: Arc<FlightRegistry>,
    flight_id: String,
    id: SubscriberId,
    replay: Option<Arc<TelemetrySample>>,
    rx: mpsc::UnboundedReceiver<Arc<TelemetrySample>>,
}

impl Subscription {
    /// Take the sample to replay before any live event, if one was retained
    /// at subscribe time.
    pub fn take_replay(&mut self) -> Option<Arc<TelemetrySample>> {
        self.replay.take()
    }
}

impl futures::Stream for Subscription {
    type Item = Arc<TelemetrySample>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().rx.poll_recv(cx)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.registry.unsubscribe(&self.flight_id, self.id);
    }
}
