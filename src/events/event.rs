//! # Lifecycle events emitted while a request evaluates its tree.
//!
//! The [`EventKind`] enum classifies event types across four categories:
//! - **Request events**: start, first-success notification, completion
//! - **Leaf events**: starting, loaded, failed, timed out, cancelled
//! - **Group events**: starting, finished, deadline hit, stopped early, cancelled
//! - **Subscriber events**: overflow and panic reports from subscriber workers
//!
//! The [`Event`] struct carries additional metadata such as timestamps, element id,
//! strategy, deadlines and outcome counts.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use waterfall::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::LeafTimedOut)
//!     .with_element("banner")
//!     .with_deadline(Duration::from_millis(300));
//!
//! assert_eq!(ev.kind, EventKind::LeafTimedOut);
//! assert_eq!(ev.element.as_deref(), Some("banner"));
//! assert_eq!(ev.deadline_ms, Some(300));
//! ```

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use crate::elements::{Strategy, Termination};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    // === Request events ===
    /// Request started evaluating its root element.
    ///
    /// Sets:
    /// - `element`: root id
    RequestStarted,

    /// First qualifying success delivered to `on_loaded`.
    ///
    /// Sets:
    /// - `element`: leaf id
    FirstSuccessNotified,

    /// Root evaluation unwound; `on_completed` is about to fire.
    ///
    /// Sets:
    /// - `element`: root id
    /// - `loaded` / `failed`: final counts
    /// - `termination`: how the root evaluation ended
    RequestCompleted,

    // === Leaf events ===
    /// Leaf started; both timers are armed.
    ///
    /// Sets:
    /// - `element`, `deadline_ms`, `latency_ms`
    LeafStarting,

    /// Leaf completed before its deadline with a successful outcome.
    ///
    /// Sets:
    /// - `element`
    LeafLoaded,

    /// Leaf reported failure (simulated failure **or** deadline expiry).
    ///
    /// Sets:
    /// - `element`
    /// - `reason`: `"simulated"` or `"deadline"`
    LeafFailed,

    /// Leaf deadline elapsed before completion (always followed by `LeafFailed`).
    ///
    /// Sets:
    /// - `element`, `deadline_ms`
    LeafTimedOut,

    /// Leaf was cancelled by an enclosing group; no outcome was emitted.
    ///
    /// Sets:
    /// - `element`
    LeafCancelled,

    // === Group events ===
    /// Group started its traversal.
    ///
    /// Sets:
    /// - `element`, `strategy`, `deadline_ms`
    GroupStarting,

    /// Group finished; every started child completed on its own.
    ///
    /// Sets:
    /// - `element`, `termination`
    GroupFinished,

    /// Group deadline elapsed; pending descendants were cancelled.
    ///
    /// Sets:
    /// - `element`, `deadline_ms`
    GroupDeadlineHit,

    /// Stop-on-first-success abandoned the remaining children.
    ///
    /// Sets:
    /// - `element`
    /// - `reason`: id of the leaf whose success triggered the stop
    GroupStopped,

    /// Group was cancelled by an ancestor or by the caller.
    ///
    /// Sets:
    /// - `element`
    GroupCancelled,

    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `element`: subscriber name
    /// - `reason`: panic info/message
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `element`: subscriber name
    /// - `reason`: reason string (e.g., "full", "closed")
    SubscriberOverflow,
}

/// Lifecycle event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Id of the element (or subscriber name for subscriber events).
    pub element: Option<Arc<str>>,
    /// Group strategy.
    pub strategy: Option<Strategy>,
    /// Element deadline in milliseconds (compact).
    pub deadline_ms: Option<u32>,
    /// Leaf completion latency in milliseconds (compact).
    pub latency_ms: Option<u32>,
    /// How an evaluation ended.
    pub termination: Option<Termination>,
    /// Number of loaded leaves.
    pub loaded: Option<usize>,
    /// Number of failed leaves.
    pub failed: Option<usize>,
    /// Human-readable reason (failure cause, overflow details, etc.).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            element: None,
            strategy: None,
            deadline_ms: None,
            latency_ms: None,
            termination: None,
            loaded: None,
            failed: None,
            reason: None,
        }
    }

    /// Attaches an element id.
    #[inline]
    pub fn with_element(mut self, id: impl Into<Arc<str>>) -> Self {
        self.element = Some(id.into());
        self
    }

    /// Attaches a group strategy.
    #[inline]
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = Some(strategy);
        self
    }

    /// Attaches a deadline (stored as milliseconds).
    #[inline]
    pub fn with_deadline(mut self, d: Duration) -> Self {
        self.deadline_ms = Some(compact_ms(d));
        self
    }

    /// Attaches a completion latency (stored as milliseconds).
    #[inline]
    pub fn with_latency(mut self, d: Duration) -> Self {
        self.latency_ms = Some(compact_ms(d));
        self
    }

    /// Attaches a termination.
    #[inline]
    pub fn with_termination(mut self, termination: Termination) -> Self {
        self.termination = Some(termination);
        self
    }

    /// Attaches final outcome counts.
    #[inline]
    pub fn with_counts(mut self, loaded: usize, failed: usize) -> Self {
        self.loaded = Some(loaded);
        self.failed = Some(failed);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_element(subscriber)
            .with_reason(format!("subscriber={subscriber} reason={reason}"))
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_element(subscriber)
            .with_reason(info)
    }

    /// Returns `true` for subscriber overflow reports.
    #[inline]
    pub fn is_subscriber_overflow(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberOverflow)
    }

    /// Returns `true` for the terminal event of a request.
    #[inline]
    pub fn is_request_completed(&self) -> bool {
        matches!(self.kind, EventKind::RequestCompleted)
    }
}

fn compact_ms(d: Duration) -> u32 {
    d.as_millis().min(u128::from(u32::MAX)) as u32
}
