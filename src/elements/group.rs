//! # Group: composite element.
//!
//! A [`Group`] orchestrates its ordered children under one [`Strategy`] and one deadline
//! that bounds the whole subtree. See [`core::group`](crate::core) for traversal and the
//! cancellation protocol.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use crate::elements::Element;

/// Shared handle to a group.
pub type GroupRef = Arc<Group>;

/// Traversal strategy for a group's children.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// One child at a time, in list order (default).
    #[default]
    Sequential,
    /// All children started at once, outcomes in completion order.
    Parallel,
}

impl Strategy {
    /// Returns a short stable label for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            Strategy::Sequential => "sequential",
            Strategy::Parallel => "parallel",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

/// Composite of children, itself an element.
#[derive(Debug)]
pub struct Group {
    id: String,
    strategy: Strategy,
    deadline: Duration,
    stop_on_first_success: bool,
    children: Vec<Element>,
}

impl Group {
    pub(crate) fn new(
        id: String,
        strategy: Strategy,
        deadline: Duration,
        stop_on_first_success: bool,
        children: Vec<Element>,
    ) -> Self {
        Self {
            id,
            strategy,
            deadline,
            stop_on_first_success,
            children,
        }
    }

    /// Returns the group identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the traversal strategy.
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Deadline bounding the evaluation of the whole subtree.
    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    /// Whether the first successful child abandons the remaining ones.
    pub fn stop_on_first_success(&self) -> bool {
        self.stop_on_first_success
    }

    /// Ordered children.
    pub fn children(&self) -> &[Element] {
        &self.children
    }
}
