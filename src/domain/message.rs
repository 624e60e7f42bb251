//! Message and response types for worker-to-worker communication
//!
//! Every unit sent over the bus is a Message; a MessageResponse is the
//! correlated reply delivered back to a sender that asked to wait for one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::id::{generate_message_id, generate_response_id};

/// Advisory delivery priority. Does not reorder delivery; the bus processes
/// messages strictly in enqueue order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessagePriority {
    Low,
    Normal,
    High,
}

impl Default for MessagePriority {
    fn default() -> Self {
        MessagePriority::Normal
    }
}

/// A unit sent over the message bus
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Unique message identifier
    pub message_id: String,

    /// Logical name of the sending endpoint
    pub sender: String,

    /// Logical worker name this message is addressed to
    pub receiver: String,

    /// What kind of message this is (e.g. "execute_task")
    pub message_type: String,

    /// Opaque task payload
    pub content: Value,

    /// When the message was created
    pub timestamp: DateTime<Utc>,

    /// Advisory priority
    pub priority: MessagePriority,

    /// Correlation to a prior message when used for replies
    pub response_to: Option<String>,
}

impl Message {
    /// Create a new message with a fresh id and Normal priority
    pub fn new(
        sender: impl Into<String>,
        receiver: impl Into<String>,
        message_type: impl Into<String>,
        content: Value,
    ) -> Self {
        Self {
            message_id: generate_message_id(),
            sender: sender.into(),
            receiver: receiver.into(),
            message_type: message_type.into(),
            content,
            timestamp: Utc::now(),
            priority: MessagePriority::Normal,
            response_to: None,
        }
    }

    /// Set the advisory priority
    pub fn with_priority(mut self, priority: MessagePriority) -> Self {
        self.priority = priority;
        self
    }

    /// Mark this message as a reply to a prior one
    pub fn in_response_to(mut self, message_id: impl Into<String>) -> Self {
        self.response_to = Some(message_id.into());
        self
    }
}

/// Correlated reply to a message whose sender asked to wait
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Unique response identifier
    pub response_id: String,

    /// The message this responds to
    pub original_message_id: String,

    /// Who produced the response (the receiver, or "system" for bus-generated
    /// failures)
    pub sender: String,

    /// The handler's result, empty on failure
    pub content: Value,

    /// Whether the handler completed successfully
    pub success: bool,

    /// When the response was created
    pub timestamp: DateTime<Utc>,

    /// Failure description, present iff success is false
    pub error_message: Option<String>,
}

impl MessageResponse {
    /// Create a successful response carrying the handler's result
    pub fn success(
        original_message_id: impl Into<String>,
        sender: impl Into<String>,
        content: Value,
    ) -> Self {
        Self {
            response_id: generate_response_id(),
            original_message_id: original_message_id.into(),
            sender: sender.into(),
            content,
            success: true,
            timestamp: Utc::now(),
            error_message: None,
        }
    }

    /// Create a failure response carrying the error description
    pub fn failure(
        original_message_id: impl Into<String>,
        sender: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            response_id: generate_response_id(),
            original_message_id: original_message_id.into(),
            sender: sender.into(),
            content: Value::Object(Default::default()),
            success: false,
            timestamp: Utc::now(),
            error_message: Some(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_message_new_defaults() {
        let msg = Message::new("orchestrator", "script_writer", "execute_task", json!({"topic": "rust"}));
        assert_eq!(msg.sender, "orchestrator");
        assert_eq!(msg.receiver, "script_writer");
        assert_eq!(msg.message_type, "execute_task");
        assert_eq!(msg.priority, MessagePriority::Normal);
        assert!(msg.response_to.is_none());
        assert!(msg.message_id.starts_with("msg-"));
    }

    #[test]
    fn test_message_with_priority() {
        let msg = Message::new("a", "b", "t", json!({})).with_priority(MessagePriority::High);
        assert_eq!(msg.priority, MessagePriority::High);
    }

    #[test]
    fn test_message_in_response_to() {
        let msg = Message::new("a", "b", "t", json!({})).in_response_to("msg-123-abcd");
        assert_eq!(msg.response_to, Some("msg-123-abcd".to_string()));
    }

    #[test]
    fn test_message_ids_are_unique() {
        let m1 = Message::new("a", "b", "t", json!({}));
        let m2 = Message::new("a", "b", "t", json!({}));
        assert_ne!(m1.message_id, m2.message_id);
    }

    #[test]
    fn test_response_success() {
        let resp = MessageResponse::success("msg-1", "script_writer", json!({"ok": true}));
        assert!(resp.success);
        assert_eq!(resp.original_message_id, "msg-1");
        assert_eq!(resp.sender, "script_writer");
        assert!(resp.error_message.is_none());
        assert_eq!(resp.content, json!({"ok": true}));
    }

    #[test]
    fn test_response_failure() {
        let resp = MessageResponse::failure("msg-1", "system", "it broke");
        assert!(!resp.success);
        assert_eq!(resp.error_message, Some("it broke".to_string()));
        assert_eq!(resp.content, json!({}));
    }

    #[test]
    fn test_message_serialization_roundtrip() {
        let msg = Message::new("a", "b", "execute_task", json!({"topic": "rust"}));
        let encoded = serde_json::to_string(&msg).unwrap();
        let decoded: Message = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded.message_id, msg.message_id);
        assert_eq!(decoded.content, msg.content);
        assert_eq!(decoded.priority, MessagePriority::Normal);
    }

    #[test]
    fn test_priority_serializes_lowercase() {
        let encoded = serde_json::to_string(&MessagePriority::High).unwrap();
        assert_eq!(encoded, "\"high\"");
    }
}
