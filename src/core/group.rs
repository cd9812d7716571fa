//! # Evaluate a group: composite traversal under one deadline.
//!
//! Orchestrates the children of a [`Group`] sequentially or in parallel, bounded by the
//! group deadline, with optional stop-on-first-success.
//!
//! ## Architecture
//! ```text
//! parent token ──► group token (child_token) ──► handed to every child
//!                        ▲            ▲
//!                        │            └── stop-on-first-success (wrapped listener)
//!                        └── group deadline
//!
//! Sequential:  child[0] ─► child[1] ─► ... ─► child[n-1]     (one in flight)
//! Parallel:    JoinSet { child[0], child[1], ..., child[n-1] } (all in flight)
//! ```
//!
//! ## Rules
//! - Every leaf outcome is forwarded **unchanged** to the parent listener
//! - Deadline expiry cancels the group token; pending descendants emit nothing
//! - Stop-on-first-success forwards the success **first**, then cancels the group token:
//!   - Sequential: the next child is never started
//!   - Parallel: in-flight siblings are cancelled (best-effort; a sibling already past its
//!     completion point may still deliver)
//! - Cancellation only flows downward; ancestors and already-delivered outcomes are untouched
//! - The group returns only after every started child has unwound, so no descendant can
//!   emit after the group's evaluation has finished
//! - The group reports `Stopped` only when the stop actually abandoned a child; a success
//!   from the last sequential child (or from the last parallel child still running) ends
//!   the group as `Completed`
//! - Cancelling the token more than once (deadline after stop, parent after deadline) is harmless

use std::sync::{Arc, OnceLock};

use tokio::{select, task::JoinSet, time};
use tokio_util::sync::CancellationToken;

use crate::{
    elements::{Group, Outcome, Strategy, Termination},
    events::{Bus, Event, EventKind},
    listeners::{forward, OutcomeListener},
};

/// Evaluates `group` and its subtree, forwarding every leaf outcome to `listener`.
pub(crate) async fn evaluate_group(
    group: &Group,
    parent: &CancellationToken,
    listener: &OutcomeListener,
    bus: &Bus,
) -> Termination {
    tracing::debug!(
        group = group.id(),
        strategy = %group.strategy(),
        deadline = ?group.deadline(),
        children = group.children().len(),
        "group starting"
    );
    bus.publish(
        Event::new(EventKind::GroupStarting)
            .with_element(group.id())
            .with_strategy(group.strategy())
            .with_deadline(group.deadline()),
    );

    let token = parent.child_token();
    let stop_cause: Arc<OnceLock<Arc<str>>> = Arc::new(OnceLock::new());
    let listener = if group.stop_on_first_success() {
        stop_on_success(listener, &token, &stop_cause)
    } else {
        Arc::clone(listener)
    };

    let run = match group.strategy() {
        Strategy::Sequential => run_sequential(group, &token, &listener, bus).await,
        Strategy::Parallel => run_parallel(group, &token, &listener, bus).await,
    };

    let termination = if run.deadline_hit {
        Termination::DeadlineExceeded
    } else if stop_cause.get().is_some() && run.abandoned {
        Termination::Stopped
    } else if parent.is_cancelled() {
        Termination::Cancelled
    } else {
        Termination::Completed
    };
    publish_finished(bus, group, termination, stop_cause.get());
    termination
}

/// What happened to the children of one group evaluation.
struct Run {
    deadline_hit: bool,
    /// At least one child was cancelled or never started.
    abandoned: bool,
}

/// Wraps `listener` so that the first success cancels the rest of the group.
fn stop_on_success(
    listener: &OutcomeListener,
    token: &CancellationToken,
    cause: &Arc<OnceLock<Arc<str>>>,
) -> OutcomeListener {
    let token = token.clone();
    let cause = Arc::clone(cause);
    forward(listener, move |outcome: &Outcome| {
        if outcome.succeeded && cause.set(Arc::from(outcome.leaf.id())).is_ok() {
            tracing::trace!(leaf = outcome.leaf.id(), "stop-on-first-success triggered");
            token.cancel();
        }
    })
}

/// Runs children one at a time, starting each after the previous one unwound.
async fn run_sequential(
    group: &Group,
    token: &CancellationToken,
    listener: &OutcomeListener,
    bus: &Bus,
) -> Run {
    let chain = async {
        let mut abandoned = false;
        for child in group.children() {
            if token.is_cancelled() {
                abandoned = true;
                break;
            }
            let end = child.evaluate_with(token, listener, bus).await;
            abandoned |= end == Termination::Cancelled;
        }
        abandoned
    };
    tokio::pin!(chain);

    select! {
        biased;
        _ = time::sleep(group.deadline()) => {
            token.cancel();
            Run { deadline_hit: true, abandoned: chain.await }
        }
        abandoned = &mut chain => Run { deadline_hit: false, abandoned },
    }
}

/// Runs all children as independent tasks and drains them.
async fn run_parallel(
    group: &Group,
    token: &CancellationToken,
    listener: &OutcomeListener,
    bus: &Bus,
) -> Run {
    let mut set = JoinSet::new();
    for child in group.children() {
        let child = child.clone();
        let token = token.clone();
        let listener = Arc::clone(listener);
        let bus = bus.clone();
        set.spawn(async move { child.evaluate_with(&token, &listener, &bus).await });
    }

    let deadline = time::sleep(group.deadline());
    tokio::pin!(deadline);
    let mut deadline_hit = false;
    let mut abandoned = false;

    loop {
        select! {
            biased;
            _ = &mut deadline, if !deadline_hit => {
                deadline_hit = true;
                token.cancel();
            }
            joined = set.join_next() => match joined {
                Some(Ok(end)) => abandoned |= end == Termination::Cancelled,
                Some(Err(e)) => {
                    tracing::warn!(group = group.id(), error = %e, "child evaluation task failed");
                }
                None => break,
            },
        }
    }
    Run {
        deadline_hit,
        abandoned,
    }
}

/// Publishes the terminal group event matching `termination`.
fn publish_finished(
    bus: &Bus,
    group: &Group,
    termination: Termination,
    stop_cause: Option<&Arc<str>>,
) {
    tracing::debug!(group = group.id(), %termination, "group finished");
    let ev = match termination {
        Termination::Completed => Event::new(EventKind::GroupFinished),
        Termination::DeadlineExceeded => {
            Event::new(EventKind::GroupDeadlineHit).with_deadline(group.deadline())
        }
        Termination::Stopped => {
            let ev = Event::new(EventKind::GroupStopped);
            match stop_cause {
                Some(leaf) => ev.with_reason(Arc::clone(leaf)),
                None => ev,
            }
        }
        Termination::Cancelled => Event::new(EventKind::GroupCancelled),
    };
    bus.publish(ev.with_element(group.id()).with_termination(termination));
}
