//! # Element: the composite sum type.
//!
//! [`Element`] is either a [`Leaf`] or a [`Group`]; both share one operation,
//! [`Element::evaluate`], dispatched by variant.
//!
//! ## Example
//! ```rust
//! use std::sync::{Arc, Mutex};
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//! use waterfall::{ElementConfig, Outcome, OutcomeListener, Termination};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let leaf = ElementConfig::leaf()
//!         .with_id("banner")
//!         .with_outcome(true)
//!         .with_latency(Duration::from_millis(5))
//!         .build()
//!         .unwrap();
//!
//!     let seen = Arc::new(Mutex::new(Vec::new()));
//!     let sink = Arc::clone(&seen);
//!     let listener: OutcomeListener = Arc::new(move |o: &Outcome| {
//!         sink.lock().unwrap().push((o.leaf.id().to_string(), o.succeeded));
//!     });
//!
//!     let end = leaf.evaluate(&CancellationToken::new(), listener).await;
//!     assert_eq!(end, Termination::Completed);
//!     assert_eq!(*seen.lock().unwrap(), vec![("banner".to_string(), true)]);
//! }
//! ```

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::core::{evaluate_group, evaluate_leaf};
use crate::elements::{Group, GroupRef, Leaf, LeafRef, Termination};
use crate::events::Bus;
use crate::listeners::OutcomeListener;

/// Boxed evaluation future (needed because evaluation recurses through groups).
pub type BoxEvalFuture<'a> = Pin<Box<dyn Future<Output = Termination> + Send + 'a>>;

/// A node of the tree: a leaf or a group.
///
/// Cheap to clone (both variants are `Arc`-backed).
#[derive(Clone, Debug)]
pub enum Element {
    /// Single loadable unit.
    Leaf(LeafRef),
    /// Composite of children.
    Group(GroupRef),
}

impl Element {
    /// Returns the element identifier.
    pub fn id(&self) -> &str {
        match self {
            Element::Leaf(leaf) => leaf.id(),
            Element::Group(group) => group.id(),
        }
    }

    /// Returns the element deadline.
    pub fn deadline(&self) -> Duration {
        match self {
            Element::Leaf(leaf) => leaf.deadline(),
            Element::Group(group) => group.deadline(),
        }
    }

    /// Returns `true` for the leaf variant.
    pub fn is_leaf(&self) -> bool {
        matches!(self, Element::Leaf(_))
    }

    /// Returns the leaf, if this element is one.
    pub fn as_leaf(&self) -> Option<&LeafRef> {
        match self {
            Element::Leaf(leaf) => Some(leaf),
            Element::Group(_) => None,
        }
    }

    /// Returns the group, if this element is one.
    pub fn as_group(&self) -> Option<&GroupRef> {
        match self {
            Element::Group(group) => Some(group),
            Element::Leaf(_) => None,
        }
    }

    /// All leaves of the subtree, in pre-order (list order within each group).
    pub fn leaves(&self) -> Vec<LeafRef> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves(&self, out: &mut Vec<LeafRef>) {
        match self {
            Element::Leaf(leaf) => out.push(Arc::clone(leaf)),
            Element::Group(group) => {
                for child in group.children() {
                    child.collect_leaves(out);
                }
            }
        }
    }

    /// Evaluates the subtree, delivering every leaf outcome to `listener`.
    ///
    /// Cancelling `token` stops the evaluation cooperatively: pending leaves emit nothing.
    /// Lifecycle events are not observable through this entry point; use
    /// [`Request`](crate::Request) for that.
    pub async fn evaluate(&self, token: &CancellationToken, listener: OutcomeListener) -> Termination {
        let bus = Bus::new(1);
        self.evaluate_with(token, &listener, &bus).await
    }

    pub(crate) fn evaluate_with<'a>(
        &'a self,
        parent: &'a CancellationToken,
        listener: &'a OutcomeListener,
        bus: &'a Bus,
    ) -> BoxEvalFuture<'a> {
        Box::pin(async move {
            match self {
                Element::Leaf(leaf) => evaluate_leaf(leaf, parent, listener, bus).await,
                Element::Group(group) => evaluate_group(group, parent, listener, bus).await,
            }
        })
    }
}

impl From<Leaf> for Element {
    fn from(leaf: Leaf) -> Self {
        Element::Leaf(Arc::new(leaf))
    }
}

impl From<Group> for Element {
    fn from(group: Group) -> Self {
        Element::Group(Arc::new(group))
    }
}
