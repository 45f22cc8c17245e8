//! Broadcast event bus for distributing `MessageEvent` to multiple subscribers.
//!
//! Built on `tokio::sync::broadcast`, the `EventBus` supports multiple
//! concurrent subscribers. Publishing with no active subscribers is a no-op.

use missive_types::event::MessageEvent;
use missive_types::message::MessageView;
use tokio::sync::broadcast;

/// Fire-and-forget notification of completed writes.
///
/// Implementations must never fail the caller: a notifier that cannot
/// deliver simply drops the event.
pub trait MessageNotifier: Send + Sync {
    /// Called after a message has been persisted.
    fn notify_created(&self, message: &MessageView);

    /// Called after a message has been deleted.
    fn notify_deleted(&self, message_id: &str);
}

/// Multi-consumer event bus for message events.
///
/// Wraps a `tokio::sync::broadcast` channel. Cloning the bus clones the
/// sender, allowing multiple producers and consumers.
pub struct EventBus {
    sender: broadcast::Sender<MessageEvent>,
}

impl EventBus {
    /// Create a new event bus with the given channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Create a new subscriber that will receive all future events.
    pub fn subscribe(&self) -> broadcast::Receiver<MessageEvent> {
        self.sender.subscribe()
    }

    /// Publish an event to all current subscribers.
    ///
    /// If there are no subscribers, the event is silently dropped.
    pub fn publish(&self, event: MessageEvent) {
        let _ = self.sender.send(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl MessageNotifier for EventBus {
    fn notify_created(&self, message: &MessageView) {
        tracing::debug!(
            message_id = %message.message_id,
            subscribers = self.subscriber_count(),
            "Broadcasting new message"
        );
        self.publish(MessageEvent::NewMessage {
            message: message.clone(),
        });
    }

    fn notify_deleted(&self, message_id: &str) {
        self.publish(MessageEvent::MessageDeleted {
            message_id: message_id.to_string(),
        });
    }
}

impl Clone for EventBus {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("receiver_count", &self.sender.receiver_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use missive_types::message::{MessageMetadata, Sender};

    fn sample_view(id: &str) -> MessageView {
        MessageView {
            message_id: id.to_string(),
            session_id: "s1".to_string(),
            content: "hello world".to_string(),
            timestamp: "2023-06-15T14:30:00Z".to_string(),
            sender: Sender::User,
            metadata: MessageMetadata::from_content("hello world"),
        }
    }

    #[tokio::test]
    async fn notify_created_delivers_event() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        bus.notify_created(&sample_view("m1"));

        let received = rx.recv().await.unwrap();
        assert!(matches!(
            received,
            MessageEvent::NewMessage { ref message } if message.message_id == "m1"
        ));
    }

    #[tokio::test]
    async fn multiple_subscribers_each_receive_event() {
        let bus = EventBus::new(16);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.notify_deleted("m9");

        let e1 = rx1.recv().await.unwrap();
        let e2 = rx2.recv().await.unwrap();
        assert!(matches!(e1, MessageEvent::MessageDeleted { .. }));
        assert!(matches!(e2, MessageEvent::MessageDeleted { .. }));
    }

    #[test]
    fn notify_with_no_subscribers_does_not_panic() {
        let bus = EventBus::new(16);
        bus.notify_created(&sample_view("m1"));
        bus.notify_deleted("m1");
    }

    #[test]
    fn lagged_receiver_handles_gracefully() {
        let bus = EventBus::new(4);
        let mut rx = bus.subscribe();

        for i in 0..10 {
            bus.notify_created(&sample_view(&format!("m{i}")));
        }

        match rx.try_recv() {
            Ok(_) => {}
            Err(broadcast::error::TryRecvError::Lagged(_)) => {}
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn clone_shares_channel() {
        let bus = EventBus::new(16);
        let bus2 = bus.clone();
        let mut rx = bus.subscribe();

        bus2.notify_created(&sample_view("m1"));

        assert!(rx.try_recv().is_ok());
        assert_eq!(bus.subscriber_count(), 1);
    }

    #[test]
    fn debug_impl() {
        let bus = EventBus::new(16);
        let _rx = bus.subscribe();
        let debug = format!("{bus:?}");
        assert!(debug.contains("EventBus"));
        assert!(debug.contains("receiver_count"));
    }
}
