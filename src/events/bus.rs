//! # Event bus for broadcasting runtime events.
//!
//! [`Bus`] is a thin wrapper around [`tokio::sync::broadcast`] with a
//! non-blocking `publish`, shared by supervisory actors and drain loops.
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` never waits for receivers.
//! - **Bounded capacity**: one ring buffer keeps the most recent events for all receivers.
//! - **Lag handling**: slow receivers get `RecvError::Lagged(n)` and skip `n` oldest items.
//! - **No persistence**: events are dropped if nobody is subscribed at send time.

use tokio::sync::broadcast;

use super::event::Event;

/// Broadcast channel for runtime events.
///
/// Cheap to clone; every clone publishes into the same channel.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a new bus with the given channel capacity (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel::<Event>(capacity.max(1));
        Self { tx }
    }

    /// Publishes an event to all active receivers.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Creates a receiver that observes events sent after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;

    #[tokio::test]
    async fn test_publish_reaches_subscriber() {
        let bus = Bus::new(4);
        let mut rx = bus.subscribe();

        bus.publish(Event::new(EventKind::Heartbeat).with_reader("r"));
        let ev = rx.recv().await.unwrap();
        assert_eq!(ev.kind, EventKind::Heartbeat);
        assert_eq!(ev.reader.as_deref(), Some("r"));
    }

    #[test]
    fn test_publish_without_subscribers_is_noop() {
        let bus = Bus::new(0);
        bus.publish(Event::new(EventKind::ReaderStopped));
    }
}
