//! # LogWriter: simple event logger
//!
//! A minimal subscriber that renders incoming [`Event`]s through `tracing`.
//! Use it for tests or demos; install any `tracing` subscriber to see the output.
//!
//! ## Example output
//! ```text
//! [request-started] root="waterfall"
//! [group-starting] group="tier-1" strategy=parallel deadline_ms=2000
//! [leaf-starting] leaf="network-a" latency_ms=200 deadline_ms=300
//! [leaf-starting] leaf="network-b" latency_ms=250 deadline_ms=300
//! [leaf-loaded] leaf="network-a"
//! [first-success] leaf="network-a"
//! [leaf-cancelled] leaf="network-b"
//! [group-stopped] group="tier-1" by="network-a"
//! [request-completed] root="waterfall" loaded=1 failed=0
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let el = e.element.as_deref().unwrap_or("");
        match e.kind {
            EventKind::RequestStarted => {
                tracing::info!("[request-started] root={el:?}");
            }
            EventKind::FirstSuccessNotified => {
                tracing::info!("[first-success] leaf={el:?}");
            }
            EventKind::RequestCompleted => {
                tracing::info!(
                    "[request-completed] root={el:?} loaded={} failed={}",
                    e.loaded.unwrap_or(0),
                    e.failed.unwrap_or(0)
                );
            }
            EventKind::LeafStarting => {
                tracing::info!(
                    "[leaf-starting] leaf={el:?} latency_ms={} deadline_ms={}",
                    e.latency_ms.unwrap_or(0),
                    e.deadline_ms.unwrap_or(0)
                );
            }
            EventKind::LeafLoaded => {
                tracing::info!("[leaf-loaded] leaf={el:?}");
            }
            EventKind::LeafFailed => {
                tracing::info!("[leaf-failed] leaf={el:?} cause={:?}", e.reason);
            }
            EventKind::LeafTimedOut => {
                tracing::info!(
                    "[leaf-timeout] leaf={el:?} deadline_ms={}",
                    e.deadline_ms.unwrap_or(0)
                );
            }
            EventKind::LeafCancelled => {
                tracing::info!("[leaf-cancelled] leaf={el:?}");
            }
            EventKind::GroupStarting => {
                tracing::info!(
                    "[group-starting] group={el:?} strategy={} deadline_ms={}",
                    e.strategy.map(|s| s.as_label()).unwrap_or("-"),
                    e.deadline_ms.unwrap_or(0)
                );
            }
            EventKind::GroupFinished => {
                tracing::info!("[group-finished] group={el:?}");
            }
            EventKind::GroupDeadlineHit => {
                tracing::info!(
                    "[group-deadline] group={el:?} deadline_ms={}",
                    e.deadline_ms.unwrap_or(0)
                );
            }
            EventKind::GroupStopped => {
                tracing::info!(
                    "[group-stopped] group={el:?} by={:?}",
                    e.reason.as_deref().unwrap_or("")
                );
            }
            EventKind::GroupCancelled => {
                tracing::info!("[group-cancelled] group={el:?}");
            }
            EventKind::SubscriberOverflow => {
                tracing::warn!(
                    "[subscriber-overflow] subscriber={el:?} reason={:?}",
                    e.reason
                );
            }
            EventKind::SubscriberPanicked => {
                tracing::warn!(
                    "[subscriber-panicked] subscriber={} info={}",
                    el,
                    e.reason.as_deref().unwrap_or("unknown"),
                );
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
