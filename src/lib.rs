//! # waterfall
//!
//! **waterfall** simulates the hierarchical load process used by ad-mediation SDKs:
//! a tree of loadable elements is evaluated under per-node deadlines, with sequential or
//! parallel traversal of siblings and early-stop-on-success semantics.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!                         ┌──────────────────────────────┐
//!                         │ Request::load(listener)      │
//!                         │  - LoadReport accumulators   │
//!                         │  - notified-once flag (CAS)  │
//!                         └──────────────┬───────────────┘
//!                                        ▼ evaluate(token, on_outcome)
//!                         ┌──────────────────────────────┐
//!                         │ Group (Sequential, 2s)       │
//!                         │  token = parent.child_token()│
//!                         └───┬──────────────┬───────────┘
//!                             ▼              ▼
//!                    ┌──────────────┐  ┌──────────────────────────┐
//!                    │ Leaf a       │  │ Group (Parallel, 500ms,  │
//!                    │ latency/ddl  │  │        stop on success)  │
//!                    └──────┬───────┘  └───┬──────────────┬───────┘
//!                           │              ▼              ▼
//!                           │         ┌─────────┐    ┌─────────┐
//!                           │         │ Leaf b  │    │ Leaf c  │
//!                           │         └────┬────┘    └────┬────┘
//!                           ▼              ▼              ▼
//!               (leaf, succeeded) ──► forwarded unchanged by every group ──► Request
//! ```
//!
//! ### Lifecycle
//! ```text
//! ElementConfig ──build()──► Element tree (immutable) ──► Request::new(root)
//!
//! Request::load(listener)
//!   ├─► root.evaluate(token, on_outcome)
//!   │     Leaf:  select { cancelled ─► nothing
//!   │                     deadline  ─► (leaf, false)
//!   │                     latency   ─► (leaf, simulated_outcome) }
//!   │     Group: child token per group; deadline or stop-on-first-success cancels it
//!   │            Sequential ─► one child at a time, next starts after previous unwound
//!   │            Parallel   ─► JoinSet of children, drained after cancellation
//!   ├─► on_outcome: record loaded/failed; first notify-flagged success ─► on_loaded (once)
//!   └─► root unwound ─► on_completed(loaded, failed) (once) ─► LoadReport
//! ```
//!
//! ## Features
//! | Area              | Description                                                        | Key types / traits                      |
//! |-------------------|--------------------------------------------------------------------|-----------------------------------------|
//! | **Tree model**    | Leaves and groups as one sum type with a single `evaluate`.        | [`Element`], [`Leaf`], [`Group`]        |
//! | **Configuration** | Plain recursive config object, defaults, TOML loading, validation. | [`ElementConfig`], [`Config`]           |
//! | **Requests**      | First-success notification and final completion callback.          | [`Request`], [`RequestListener`]        |
//! | **Listeners**     | Outcome callbacks and wrap-and-forward composition.                | [`OutcomeListener`], [`forward`]        |
//! | **Events**        | Lifecycle events broadcast on a bus, fanned out to subscribers.    | [`Event`], [`Bus`], [`Subscribe`]       |
//! | **Errors**        | Construction-time validation errors.                               | [`ConfigError`]                         |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] subscriber _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use waterfall::{ElementConfig, LeafRef, Request, RequestListener, Strategy};
//!
//! struct Print;
//!
//! impl RequestListener for Print {
//!     fn on_loaded(&self, leaf: &LeafRef) {
//!         println!("first fill from {}", leaf.id());
//!     }
//!     fn on_completed(&self, loaded: &[LeafRef], failed: &[LeafRef]) {
//!         println!("loaded={} failed={}", loaded.len(), failed.len());
//!     }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), waterfall::ConfigError> {
//!     let tree = ElementConfig::group(Strategy::Sequential)
//!         .with_id("waterfall")
//!         .with_deadline(Duration::from_secs(1))
//!         .with_child(
//!             ElementConfig::group(Strategy::Parallel)
//!                 .with_id("tier-1")
//!                 .with_deadline(Duration::from_millis(400))
//!                 .stop_on_first_success()
//!                 .with_child(ElementConfig::leaf().with_id("a").with_latency(Duration::from_millis(20)))
//!                 .with_child(
//!                     ElementConfig::leaf()
//!                         .with_id("b")
//!                         .with_outcome(true)
//!                         .with_latency(Duration::from_millis(30))
//!                         .notify_on_first_success(),
//!                 ),
//!         )
//!         .with_child(ElementConfig::leaf().with_id("fallback").with_outcome(true))
//!         .build()?;
//!
//!     let report = Request::new(tree).load(Arc::new(Print)).await;
//!     assert_eq!(report.loaded_ids(), ["b", "fallback"]);
//!     assert_eq!(report.failed_ids(), ["a"]);
//!     Ok(())
//! }
//! ```
mod config;
mod core;
mod elements;
mod error;
mod events;
mod listeners;
mod subscribers;

// ---- Public re-exports ----

pub use config::{Config, ElementConfig};
pub use crate::core::Request;
pub use elements::{
    BoxEvalFuture, Element, Group, GroupRef, Leaf, LeafRef, Outcome, Strategy, Termination,
};
pub use error::ConfigError;
pub use events::{Bus, Event, EventKind};
pub use listeners::{forward, LoadReport, OutcomeListener, RequestListener};
pub use subscribers::{Subscribe, SubscriberSet};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
