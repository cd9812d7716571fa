//! # Request listener trait.
//!
//! Provides [`RequestListener`], the top-level callback contract of a
//! [`Request`](crate::Request).
//!
//! ## Rules
//! - `on_loaded` fires **at most once** per request, for the first tree-wide success among
//!   leaves with `notify_on_first_success = true`.
//! - `on_completed` fires **exactly once**, after the root evaluation has fully unwound.
//! - `on_loaded` may be called from a worker task; `on_completed` is called from the task
//!   driving [`Request::load`](crate::Request::load).
//!
//! ## Example
//! ```rust
//! use waterfall::{LeafRef, RequestListener};
//!
//! struct Printer;
//!
//! impl RequestListener for Printer {
//!     fn on_loaded(&self, leaf: &LeafRef) {
//!         println!("first fill: {}", leaf.id());
//!     }
//!
//!     fn on_completed(&self, loaded: &[LeafRef], failed: &[LeafRef]) {
//!         println!("done: {} loaded, {} failed", loaded.len(), failed.len());
//!     }
//! }
//! ```

use crate::elements::LeafRef;

/// Receives the request-level notifications.
pub trait RequestListener: Send + Sync + 'static {
    /// First qualifying success anywhere in the tree.
    fn on_loaded(&self, leaf: &LeafRef);

    /// Terminal notification with the final accumulated outcomes.
    fn on_completed(&self, loaded: &[LeafRef], failed: &[LeafRef]);
}
