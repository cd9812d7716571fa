//! # Request: top-level driver of one tree evaluation.
//!
//! A [`Request`] evaluates its root [`Element`] once, accumulates every leaf outcome and
//! drives the two [`RequestListener`] callbacks.
//!
//! ## Architecture
//! ```text
//! Request::load(listener)
//!   ├─► spawn subscriber listener (if subscribers): Bus ─► SubscriberSet
//!   ├─► publish RequestStarted
//!   ├─► root.evaluate(token, on_outcome) ─────────────────────────────┐
//!   │                                                                  │
//!   │     on_outcome(leaf, succeeded)   ◄── forwarded by every group ──┘
//!   │       ├─► report.loaded / report.failed (behind one mutex)
//!   │       └─► succeeded && leaf.notify_on_first_success && CAS(notified: false → true)
//!   │             └─► publish FirstSuccessNotified, listener.on_loaded(leaf)
//!   │
//!   ├─► publish RequestCompleted { loaded, failed, termination }
//!   ├─► listener.on_completed(loaded, failed)
//!   └─► wait for subscribers to drain, return LoadReport
//! ```
//!
//! ## Rules
//! - `on_loaded` fires **at most once**, for the first tree-wide qualifying success
//! - `on_completed` fires **exactly once**, after the root evaluation has unwound
//! - `load` consumes the request: a tree is evaluated at most once per request
//! - Caller cancellation (via [`Request::load_with_token`]) unwinds like a deadline:
//!   pending leaves emit nothing and `on_completed` still fires

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::{select, sync::broadcast, task::JoinHandle};
use tokio_util::sync::CancellationToken;

use crate::{
    config::Config,
    elements::{Element, Outcome},
    events::{Bus, Event, EventKind},
    listeners::{LoadReport, OutcomeListener, RequestListener},
    subscribers::{Subscribe, SubscriberSet},
};

/// Runs one element tree and aggregates its outcomes.
///
/// ## Example
/// ```rust
/// use std::sync::Arc;
/// use std::time::Duration;
/// use waterfall::{ElementConfig, LeafRef, Request, RequestListener, Strategy};
///
/// struct Quiet;
///
/// impl RequestListener for Quiet {
///     fn on_loaded(&self, _leaf: &LeafRef) {}
///     fn on_completed(&self, _loaded: &[LeafRef], _failed: &[LeafRef]) {}
/// }
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() {
///     let root = ElementConfig::group(Strategy::Sequential)
///         .with_deadline(Duration::from_secs(1))
///         .with_child(ElementConfig::leaf().with_id("a").with_outcome(true))
///         .with_child(ElementConfig::leaf().with_id("b"))
///         .build()
///         .unwrap();
///
///     let report = Request::new(root).load(Arc::new(Quiet)).await;
///     assert_eq!(report.loaded_ids(), ["a"]);
///     assert_eq!(report.failed_ids(), ["b"]);
/// }
/// ```
pub struct Request {
    root: Element,
    bus: Bus,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl Request {
    /// Creates a request over `root` using [`Config::default`].
    pub fn new(root: Element) -> Self {
        Self::with_config(root, &Config::default())
    }

    /// Creates a request over `root`, sizing the event bus from `cfg`.
    pub fn with_config(root: Element, cfg: &Config) -> Self {
        Self {
            root,
            bus: Bus::new(cfg.bus_capacity_clamped()),
            subscribers: Vec::new(),
        }
    }

    /// Attaches event subscribers.
    ///
    /// Each subscriber gets a dedicated worker with a bounded queue; `load` waits for the
    /// queues to drain before returning.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Returns the root element.
    pub fn root(&self) -> &Element {
        &self.root
    }

    /// Returns a receiver for the lifecycle events of this request.
    ///
    /// Only events published after the call are observed, so subscribe before `load`.
    pub fn events(&self) -> broadcast::Receiver<Event> {
        self.bus.subscribe()
    }

    /// Evaluates the tree once and returns the final report.
    pub async fn load(self, listener: Arc<dyn RequestListener>) -> LoadReport {
        self.load_with_token(CancellationToken::new(), listener).await
    }

    /// Like [`load`](Self::load), but the evaluation is cancelled when `token` is.
    pub async fn load_with_token(
        self,
        token: CancellationToken,
        listener: Arc<dyn RequestListener>,
    ) -> LoadReport {
        let done = CancellationToken::new();
        let _done_guard = done.clone().drop_guard();
        let forwarder = self.subscriber_listener(done);

        tracing::debug!(root = self.root.id(), "request started");
        self.bus
            .publish(Event::new(EventKind::RequestStarted).with_element(self.root.id()));

        let state = Arc::new(RequestState::default());
        let on_outcome = state.outcome_listener(Arc::clone(&listener), self.bus.clone());
        let termination = self.root.evaluate_with(&token, &on_outcome, &self.bus).await;
        let report = state.take_report();

        tracing::debug!(
            root = self.root.id(),
            loaded = report.loaded.len(),
            failed = report.failed.len(),
            %termination,
            "request completed"
        );
        self.bus.publish(
            Event::new(EventKind::RequestCompleted)
                .with_element(self.root.id())
                .with_counts(report.loaded.len(), report.failed.len())
                .with_termination(termination),
        );
        listener.on_completed(&report.loaded, &report.failed);

        if let Some(handle) = forwarder {
            if let Err(e) = handle.await {
                tracing::warn!(error = %e, "subscriber listener task failed");
            }
        }
        report
    }

    /// Spawns the bus → subscriber fan-out task, if any subscriber is attached.
    ///
    /// The task stops after forwarding `RequestCompleted`, or when `done` is cancelled
    /// (the `load` future was dropped), then drains the subscriber queues.
    fn subscriber_listener(&self, done: CancellationToken) -> Option<JoinHandle<()>> {
        if self.subscribers.is_empty() {
            return None;
        }
        let set = SubscriberSet::new(self.subscribers.clone(), self.bus.clone());
        let mut rx = self.bus.subscribe();

        Some(tokio::spawn(async move {
            loop {
                select! {
                    biased;
                    res = rx.recv() => match res {
                        Ok(ev) => {
                            let last = ev.is_request_completed();
                            set.emit(&ev);
                            if last {
                                break;
                            }
                        }
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            tracing::warn!(skipped, "subscriber listener lagged behind the bus");
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    },
                    _ = done.cancelled() => break,
                }
            }
            set.shutdown().await;
        }))
    }
}

/// Per-evaluation accumulators; written only from the outcome listener.
#[derive(Default)]
struct RequestState {
    report: Mutex<LoadReport>,
    notified: AtomicBool,
}

impl RequestState {
    fn outcome_listener(
        self: &Arc<Self>,
        listener: Arc<dyn RequestListener>,
        bus: Bus,
    ) -> OutcomeListener {
        let state = Arc::clone(self);
        Arc::new(move |outcome: &Outcome| state.on_outcome(outcome, listener.as_ref(), &bus))
    }

    fn on_outcome(&self, outcome: &Outcome, listener: &dyn RequestListener, bus: &Bus) {
        self.report
            .lock()
            .record(Arc::clone(&outcome.leaf), outcome.succeeded);

        if outcome.succeeded
            && outcome.leaf.notify_on_first_success()
            && self
                .notified
                .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
        {
            tracing::debug!(leaf = outcome.leaf.id(), "first success notified");
            bus.publish(
                Event::new(EventKind::FirstSuccessNotified).with_element(outcome.leaf.id()),
            );
            listener.on_loaded(&outcome.leaf);
        }
    }

    fn take_report(&self) -> LoadReport {
        std::mem::take(&mut *self.report.lock())
    }
}
