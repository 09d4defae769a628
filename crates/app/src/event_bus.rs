//! In-process event bus backed by a tokio broadcast channel.
//!
//! State changes and log lines flow through here to every network
//! adapter; entities never talk to sockets directly.

use chrono::{DateTime, Utc};
use tokio::sync::broadcast;

use espnode_domain::key::EntityKey;
use espnode_domain::log::LogLevel;
use espnode_proto::ApiMessage;

/// Something that happened on the device and may interest a client.
#[derive(Debug, Clone)]
pub enum Event {
    /// An entity committed a new state; `snapshot` is the ready-to-send
    /// state message.
    StateChange {
        key: EntityKey,
        snapshot: ApiMessage,
    },
    /// A log line emitted by the device or one of its entities.
    Log {
        level: LogLevel,
        tag: String,
        message: String,
        timestamp: DateTime<Utc>,
    },
}

/// Cloneable handle to the in-process event bus.
///
/// Publishing succeeds even when there are no active subscribers
/// (the event is simply dropped).
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<Event>,
}

impl EventBus {
    /// Create a new event bus with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    pub fn publish(&self, event: Event) {
        // send fails only when there are zero receivers, which is fine.
        let _ = self.sender.send(event);
    }

    /// Subscribe to events on this bus.
    ///
    /// Returns a receiver that will get all events published *after*
    /// the subscription is created.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use espnode_proto::message::SwitchStateResponse;

    fn state_event(key: u32, state: bool) -> Event {
        Event::StateChange {
            key: EntityKey::new(key),
            snapshot: ApiMessage::SwitchStateResponse(SwitchStateResponse { key, state }),
        }
    }

    #[tokio::test]
    async fn should_deliver_event_to_subscriber() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        bus.publish(state_event(1, true));

        let Event::StateChange { key, .. } = rx.recv().await.unwrap() else {
            panic!("expected state change");
        };
        assert_eq!(key, EntityKey::new(1));
    }

    #[tokio::test]
    async fn should_deliver_event_to_multiple_subscribers() {
        let bus = EventBus::new(16);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(state_event(2, false));

        assert!(matches!(rx1.recv().await.unwrap(), Event::StateChange { .. }));
        assert!(matches!(rx2.recv().await.unwrap(), Event::StateChange { .. }));
    }

    #[tokio::test]
    async fn should_accept_publish_with_no_subscribers() {
        let bus = EventBus::new(16);
        bus.publish(state_event(1, true));
    }

    #[tokio::test]
    async fn should_not_deliver_events_published_before_subscription() {
        let bus = EventBus::new(16);
        bus.publish(state_event(1, true));

        let mut rx = bus.subscribe();
        bus.publish(state_event(2, true));

        let Event::StateChange { key, .. } = rx.recv().await.unwrap() else {
            panic!("expected state change");
        };
        assert_eq!(key, EntityKey::new(2));
    }
}
