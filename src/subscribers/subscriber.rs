//! # Request event subscribers.
//!
//! A [`Subscribe`] implementation observes the lifecycle events of one [`Request`](crate::Request):
//! leaf starts and outcomes, group terminations, first-success notification and request completion.
//!
//! Subscribers are attached with [`Request::with_subscribers`](crate::Request::with_subscribers).
//! Delivery never feeds back into evaluation: a subscriber cannot slow a leaf down or change an
//! outcome.
//!
//! ## Rules
//! - Events reach a subscriber in publish order.
//! - When a subscriber's queue is full the event is dropped for that subscriber and
//!   `EventKind::SubscriberOverflow` is published.
//! - A panic inside `on_event` is reported as `EventKind::SubscriberPanicked`; the worker keeps going.
//! - `load` returns only after every queued event has been handled.

use async_trait::async_trait;

use crate::events::Event;

/// Observer of request lifecycle events.
///
/// Handlers run on a worker task owned by the request, one per subscriber.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handles one event.
    async fn on_event(&self, event: &Event);

    /// Name reported in overflow/panic events. Defaults to the type name.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Queue length for this subscriber (clamped to at least 1). Default: 1024.
    fn queue_capacity(&self) -> usize {
        1024
    }
}
