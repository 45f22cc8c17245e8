//! Event types for the Missive real-time broadcast.
//!
//! `MessageEvent` is what WebSocket subscribers receive. All variants are
//! Clone + Send + Sync for use with tokio broadcast channels.

use serde::{Deserialize, Serialize};

use crate::message::MessageView;

/// Events published after a successful write.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageEvent {
    /// A message was persisted.
    NewMessage { message: MessageView },

    /// A message was deleted.
    MessageDeleted { message_id: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{MessageMetadata, Sender};

    #[test]
    fn test_new_message_is_tagged() {
        let event = MessageEvent::NewMessage {
            message: MessageView {
                message_id: "m1".to_string(),
                session_id: "s1".to_string(),
                content: "hi there".to_string(),
                timestamp: "2023-06-15T14:30:00Z".to_string(),
                sender: Sender::User,
                metadata: MessageMetadata::from_content("hi there"),
            },
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "new_message");
        assert_eq!(json["message"]["message_id"], "m1");
        assert_eq!(json["message"]["metadata"]["word_count"], 2);
    }

    #[test]
    fn test_deleted_event_roundtrip() {
        let event = MessageEvent::MessageDeleted {
            message_id: "m2".to_string(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"message_deleted\""));
        let parsed: MessageEvent = serde_json::from_str(&json).unwrap();
        assert!(matches!(parsed, MessageEvent::MessageDeleted { ref message_id } if message_id == "m2"));
    }
}
