//! # Leaf: a single simulated load attempt.
//!
//! A [`Leaf`] races a completion timer (`completion_latency`) against a deadline timer
//! (`deadline`). See [`core::leaf`](crate::core) for the evaluation rules.

use std::sync::Arc;
use std::time::Duration;

/// Shared handle to a leaf; this is what outcomes and reports carry.
pub type LeafRef = Arc<Leaf>;

/// One loadable unit.
///
/// Immutable once built. Equality compares configuration, so two leaves with identical
/// fields (including `id`) compare equal.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Leaf {
    id: String,
    simulated_outcome: bool,
    completion_latency: Duration,
    deadline: Duration,
    notify_on_first_success: bool,
}

impl Leaf {
    pub(crate) fn new(
        id: String,
        simulated_outcome: bool,
        completion_latency: Duration,
        deadline: Duration,
        notify_on_first_success: bool,
    ) -> Self {
        Self {
            id,
            simulated_outcome,
            completion_latency,
            deadline,
            notify_on_first_success,
        }
    }

    /// Returns the leaf identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Outcome reported when the leaf completes before its deadline.
    pub fn simulated_outcome(&self) -> bool {
        self.simulated_outcome
    }

    /// Simulated time to completion.
    pub fn completion_latency(&self) -> Duration {
        self.completion_latency
    }

    /// Evaluation deadline.
    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    /// Whether a success of this leaf may trigger the request-wide notification.
    pub fn notify_on_first_success(&self) -> bool {
        self.notify_on_first_success
    }

    /// Outcome an uncancelled evaluation will report.
    ///
    /// `completion_latency >= deadline` is always a failure.
    pub fn expected_outcome(&self) -> bool {
        self.completion_latency < self.deadline && self.simulated_outcome
    }
}
