use std::fmt;

use crate::elements::LeafRef;

/// Result of one leaf evaluation, forwarded unchanged up the tree.
///
/// Groups never produce outcomes of their own.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Outcome {
    /// The leaf that completed or timed out.
    pub leaf: LeafRef,
    /// `true` if the leaf completed before its deadline with a successful simulated outcome.
    pub succeeded: bool,
}

impl Outcome {
    pub(crate) fn new(leaf: LeafRef, succeeded: bool) -> Self {
        Self { leaf, succeeded }
    }
}

/// How an element evaluation ended.
///
/// Informational only: it never changes which outcomes were emitted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Termination {
    /// Leaf: completion timer won. Group: every started child finished on its own.
    Completed,
    /// Leaf: deadline timer won (a failure was emitted). Group: its deadline expired.
    DeadlineExceeded,
    /// Group only: stop-on-first-success abandoned at least one child (cancelled or never
    /// started). A stop that leaves nothing to abandon reports `Completed`.
    Stopped,
    /// An enclosing group or the caller cancelled the evaluation.
    Cancelled,
}

impl Termination {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            Termination::Completed => "completed",
            Termination::DeadlineExceeded => "deadline_exceeded",
            Termination::Stopped => "stopped",
            Termination::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}
