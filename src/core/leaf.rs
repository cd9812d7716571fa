//! # Evaluate a single leaf.
//!
//! Races two timers under the caller's cancellation token and emits at most one outcome.
//!
//! ## Flow
//! ```text
//! Completion first:
//!   sleep(completion_latency) → LeafLoaded / LeafFailed → emit (leaf, simulated_outcome)
//!
//! Deadline first (or tie):
//!   sleep(deadline) → LeafTimedOut → LeafFailed → emit (leaf, false)
//!
//! Cancelled first:
//!   token.cancelled() → LeafCancelled (nothing emitted)
//! ```
//!
//! ## Rules
//! - Emits **at most one** outcome; cancellation never produces a synthetic failure
//! - Branch priority is cancellation, deadline, completion (`latency == deadline` times out)
//! - Emission happens synchronously inside the winning branch; once a branch is chosen,
//!   a later cancellation cannot retract it
//! - The leaf's own outcome event is published before the listener runs, so anything the
//!   listener triggers (first-success notification, group stop) follows it on the bus

use tokio::{select, time};
use tokio_util::sync::CancellationToken;

use crate::{
    elements::{LeafRef, Outcome, Termination},
    events::{Bus, Event, EventKind},
    listeners::OutcomeListener,
};

/// Evaluates `leaf` once, delivering its outcome (if any) to `listener`.
pub(crate) async fn evaluate_leaf(
    leaf: &LeafRef,
    token: &CancellationToken,
    listener: &OutcomeListener,
    bus: &Bus,
) -> Termination {
    tracing::trace!(
        leaf = leaf.id(),
        latency = ?leaf.completion_latency(),
        deadline = ?leaf.deadline(),
        "leaf starting"
    );
    bus.publish(
        Event::new(EventKind::LeafStarting)
            .with_element(leaf.id())
            .with_deadline(leaf.deadline())
            .with_latency(leaf.completion_latency()),
    );

    select! {
        biased;
        _ = token.cancelled() => {
            tracing::trace!(leaf = leaf.id(), "leaf cancelled");
            bus.publish(Event::new(EventKind::LeafCancelled).with_element(leaf.id()));
            Termination::Cancelled
        }
        _ = time::sleep(leaf.deadline()) => {
            tracing::debug!(leaf = leaf.id(), deadline = ?leaf.deadline(), "leaf deadline exceeded");
            bus.publish(
                Event::new(EventKind::LeafTimedOut)
                    .with_element(leaf.id())
                    .with_deadline(leaf.deadline()),
            );
            publish_outcome(bus, leaf, false, "deadline");
            listener(&Outcome::new(LeafRef::clone(leaf), false));
            Termination::DeadlineExceeded
        }
        _ = time::sleep(leaf.completion_latency()) => {
            let succeeded = leaf.simulated_outcome();
            tracing::debug!(leaf = leaf.id(), succeeded, "leaf completed");
            publish_outcome(bus, leaf, succeeded, "simulated");
            listener(&Outcome::new(LeafRef::clone(leaf), succeeded));
            Termination::Completed
        }
    }
}

/// Publishes `LeafLoaded` or `LeafFailed` (with the failure cause).
fn publish_outcome(bus: &Bus, leaf: &LeafRef, succeeded: bool, cause: &'static str) {
    let ev = if succeeded {
        Event::new(EventKind::LeafLoaded).with_element(leaf.id())
    } else {
        Event::new(EventKind::LeafFailed)
            .with_element(leaf.id())
            .with_reason(cause)
    };
    bus.publish(ev);
}
