//! # Event subscribers.
//!
//! This module provides the [`Subscribe`] trait and the [`SubscriberSet`] fan-out used by
//! a [`Request`](crate::Request) to deliver lifecycle events broadcast through the
//! [`Bus`](crate::Bus).
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   Leaf/Group/Request ── publish(Event) ──► Bus ──► subscriber listener (per request)
//!                                                         │
//!                                                         ▼
//!                                                  SubscriberSet::emit(&Event)
//!                                                ┌────────┼────────┐
//!                                                ▼        ▼        ▼
//!                                            LogWriter  Metrics  Custom ...
//! ```
//!
//! ## Implementing custom subscribers
//! ```no_run
//! use waterfall::{Subscribe, Event, EventKind};
//! use async_trait::async_trait;
//!
//! struct FillRate;
//!
//! #[async_trait]
//! impl Subscribe for FillRate {
//!     async fn on_event(&self, event: &Event) {
//!         if let EventKind::RequestCompleted = event.kind {
//!             // record event.loaded / event.failed
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str { "fill-rate" }
//! }
//! ```

#[cfg(feature = "logging")]
mod log;
mod subscriber;
mod subscriber_set;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use subscriber::Subscribe;
pub use subscriber_set::SubscriberSet;
