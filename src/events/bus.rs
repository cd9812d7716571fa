//! # Event bus for broadcasting lifecycle events.
//!
//! [`Bus`] is a thin wrapper around [`tokio::sync::broadcast`] that provides
//! non-blocking event publishing from many sources (leaves, groups, request driver).
//!
//! ## Architecture
//! ```text
//! Publishers (many):                     Receivers:
//!   Leaf 1  ──┐
//!   Leaf N  ──┼──────► Bus ───────┬──► subscriber listener ──► SubscriberSet
//!   Group   ──┤  (broadcast chan) └──► Request::events() receivers
//!   Request ──┘
//! ```
//!
//! Publishing never blocks and never fails. A receiver that falls more than `capacity`
//! events behind gets `RecvError::Lagged(n)` and resumes at the oldest retained event;
//! events published while nobody listens are gone.

use tokio::sync::broadcast;

use super::event::Event;

/// Cloneable handle to the event channel of one request.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a bus retaining up to `capacity` events (at least 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, _rx) = broadcast::channel::<Event>(capacity);
        Self { tx }
    }

    /// Sends `ev` to every live receiver.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// New independent receiver; sees only events published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }

    /// Returns `true` if at least one receiver is attached.
    pub fn has_receivers(&self) -> bool {
        self.tx.receiver_count() > 0
    }
}
