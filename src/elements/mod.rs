//! # Element tree: the data model evaluated by a request.
//!
//! This module provides the tree types:
//! - [`Element`] - sum type over the two variants, with a single `evaluate` operation
//! - [`Leaf`] / [`LeafRef`] - one simulated load attempt
//! - [`Group`] / [`GroupRef`] - ordered children under one [`Strategy`] and one deadline
//! - [`Outcome`] - the `(leaf, succeeded)` pair that crosses listener boundaries
//! - [`Termination`] - how an evaluation ended (informational)
//!
//! Trees are built from [`ElementConfig`](crate::ElementConfig) and are immutable afterwards.

mod element;
mod group;
mod leaf;
mod outcome;

pub use element::{BoxEvalFuture, Element};
pub use group::{Group, GroupRef, Strategy};
pub use leaf::{Leaf, LeafRef};
pub use outcome::{Outcome, Termination};
