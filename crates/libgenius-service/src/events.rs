//! # Reservation Events
//!
//! Broadcast channel carrying [`ReservationReady`] hand-offs to whatever
//! notifier is listening.
//!
//! ```text
//! return_book ──► EventBus::publish ──► broadcast::Sender
//!                                            │
//!                          ┌─────────────────┼─────────────────┐
//!                          ▼                 ▼                 ▼
//!                     notifier A        notifier B          (none)
//! ```
//!
//! Publishing never blocks and never fails the operation that produced the
//! event. With no subscriber the event is dropped; a subscriber that falls
//! more than `capacity` events behind sees `RecvError::Lagged`.

use libgenius_core::ReservationReady;
use tokio::sync::broadcast;
use tracing::debug;

/// Default number of buffered events per subscriber.
pub const DEFAULT_EVENT_CAPACITY: usize = 64;

/// Fan-out channel for reservation hand-offs.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<ReservationReady>,
}

impl EventBus {
    /// Creates a bus buffering up to `capacity` events (at least one).
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        EventBus { tx }
    }

    /// Returns a receiver for events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<ReservationReady> {
        self.tx.subscribe()
    }

    /// Publishes an event. Returns the number of subscribers reached.
    pub fn publish(&self, event: ReservationReady) -> usize {
        match self.tx.send(event) {
            Ok(receivers) => receivers,
            Err(broadcast::error::SendError(event)) => {
                debug!(
                    book_id = %event.book_id,
                    reader = %event.reader_name,
                    "No subscriber for reservation event"
                );
                0
            }
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        EventBus::new(DEFAULT_EVENT_CAPACITY)
    }
}
