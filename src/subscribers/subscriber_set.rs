//! # Event fan-out for one request.
//!
//! [`SubscriberSet`] owns one bounded lane per subscriber and one worker draining it.
//! Publishing never waits on a subscriber.
//!
//! ```text
//! emit(event) ──► lane "log"     ──► worker ──► on_event()
//!             └─► lane "metrics" ──► worker ──► on_event()
//!                  full? ─► SubscriberOverflow on the bus
//!                               panic? ─► SubscriberPanicked on the bus
//! ```
//!
//! `on_event` runs under `AssertUnwindSafe`; a subscriber that panics while holding a lock
//! may leave its own state poisoned or half-updated.

use std::sync::Arc;

use futures::FutureExt;
use tokio::{sync::mpsc, task::JoinSet};

use crate::events::{Bus, Event};
use crate::subscribers::Subscribe;

struct Lane {
    name: &'static str,
    tx: mpsc::Sender<Arc<Event>>,
}

/// Delivers events to a fixed set of subscribers, each on its own worker.
pub struct SubscriberSet {
    lanes: Vec<Lane>,
    workers: JoinSet<()>,
    bus: Bus,
}

impl SubscriberSet {
    /// Spawns one worker per subscriber. Overflow and panic reports go to `bus`.
    ///
    /// Must be called from within a Tokio runtime.
    #[must_use]
    pub fn new(subscribers: Vec<Arc<dyn Subscribe>>, bus: Bus) -> Self {
        let mut lanes = Vec::with_capacity(subscribers.len());
        let mut workers = JoinSet::new();

        for sub in subscribers {
            let (tx, rx) = mpsc::channel(sub.queue_capacity().max(1));
            lanes.push(Lane {
                name: sub.name(),
                tx,
            });
            workers.spawn(drain_lane(sub, rx, bus.clone()));
        }
        Self {
            lanes,
            workers,
            bus,
        }
    }

    /// Number of attached subscribers.
    pub fn len(&self) -> usize {
        self.lanes.len()
    }

    /// Returns `true` if no subscriber is attached.
    pub fn is_empty(&self) -> bool {
        self.lanes.is_empty()
    }

    /// Queues `event` for every subscriber without waiting.
    pub fn emit(&self, event: &Event) {
        let shared = Arc::new(event.clone());
        for lane in &self.lanes {
            let reason = match lane.tx.try_send(Arc::clone(&shared)) {
                Ok(()) => continue,
                Err(mpsc::error::TrySendError::Full(_)) => "full",
                Err(mpsc::error::TrySendError::Closed(_)) => "closed",
            };
            tracing::warn!(subscriber = lane.name, reason, kind = ?event.kind, "event dropped");
            // An overflow report that itself overflows is not reported again.
            if !event.is_subscriber_overflow() {
                self.bus.publish(Event::subscriber_overflow(lane.name, reason));
            }
        }
    }

    /// Closes every lane and waits until all queued events are handled.
    pub async fn shutdown(self) {
        let Self {
            lanes, mut workers, ..
        } = self;
        drop(lanes);

        while let Some(res) = workers.join_next().await {
            if let Err(e) = res {
                tracing::warn!(error = %e, "subscriber worker failed");
            }
        }
    }
}

async fn drain_lane(sub: Arc<dyn Subscribe>, mut rx: mpsc::Receiver<Arc<Event>>, bus: Bus) {
    while let Some(ev) = rx.recv().await {
        let handled = std::panic::AssertUnwindSafe(sub.on_event(&ev))
            .catch_unwind()
            .await;
        if let Err(payload) = handled {
            let info = panic_message(payload.as_ref());
            tracing::warn!(subscriber = sub.name(), %info, "subscriber panicked");
            bus.publish(Event::subscriber_panicked(sub.name(), info));
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    payload
        .downcast_ref::<&'static str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;
    use async_trait::async_trait;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Collect(Mutex<Vec<EventKind>>);

    #[async_trait]
    impl Subscribe for Collect {
        async fn on_event(&self, event: &Event) {
            self.0.lock().push(event.kind);
        }

        fn name(&self) -> &'static str {
            "collect"
        }
    }

    struct Boom;

    #[async_trait]
    impl Subscribe for Boom {
        async fn on_event(&self, _event: &Event) {
            panic!("boom");
        }

        fn name(&self) -> &'static str {
            "boom"
        }
    }

    struct Tiny;

    #[async_trait]
    impl Subscribe for Tiny {
        async fn on_event(&self, _event: &Event) {}

        fn name(&self) -> &'static str {
            "tiny"
        }

        fn queue_capacity(&self) -> usize {
            0
        }
    }

    #[tokio::test]
    async fn test_fifo_delivery_and_shutdown_drains() {
        let collect = Arc::new(Collect::default());
        let sub: Arc<dyn Subscribe> = collect.clone();
        let set = SubscriberSet::new(vec![sub], Bus::new(8));
        assert_eq!(set.len(), 1);

        set.emit(&Event::new(EventKind::LeafStarting));
        set.emit(&Event::new(EventKind::LeafLoaded));
        set.shutdown().await;

        assert_eq!(
            *collect.0.lock(),
            vec![EventKind::LeafStarting, EventKind::LeafLoaded]
        );
    }

    #[tokio::test]
    async fn test_panicking_subscriber_is_reported() {
        let bus = Bus::new(8);
        let mut rx = bus.subscribe();
        let collect = Arc::new(Collect::default());
        let boom: Arc<dyn Subscribe> = Arc::new(Boom);
        let sub: Arc<dyn Subscribe> = collect.clone();
        let set = SubscriberSet::new(vec![boom, sub], bus);

        set.emit(&Event::new(EventKind::GroupStarting));
        set.shutdown().await;

        let ev = rx.recv().await.unwrap();
        assert_eq!(ev.kind, EventKind::SubscriberPanicked);
        assert_eq!(ev.element.as_deref(), Some("boom"));
        assert_eq!(ev.reason.as_deref(), Some("boom"));
        assert_eq!(*collect.0.lock(), vec![EventKind::GroupStarting]);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_full_lane_publishes_overflow() {
        let bus = Bus::new(8);
        let mut rx = bus.subscribe();
        let tiny: Arc<dyn Subscribe> = Arc::new(Tiny);
        let set = SubscriberSet::new(vec![tiny], bus);

        // The worker has not run yet, so the single slot is still occupied by the first event.
        set.emit(&Event::new(EventKind::LeafStarting));
        set.emit(&Event::new(EventKind::LeafLoaded));

        let ev = rx.try_recv().unwrap();
        assert!(ev.is_subscriber_overflow());
        assert_eq!(ev.element.as_deref(), Some("tiny"));
        set.shutdown().await;
    }
}
