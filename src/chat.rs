//! Chat transcript types shared by the session core and the transport.

use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::SystemTime;

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "human")]
    Human,
    #[serde(rename = "ai")]
    Agent,
}

/// One entry in the chat transcript.
///
/// Messages delivered by the engine may arrive without an id; archiving a
/// timeline requires one, so `id` stays optional here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    /// Build a user-authored message with a fresh id.
    pub fn from_user(content: &str) -> Self {
        ChatMessage {
            id: Some(new_message_id()),
            role: Role::Human,
            content: content.to_string(),
        }
    }

    pub fn is_agent(&self) -> bool {
        self.role == Role::Agent
    }
}

/// Generate a unique message ID: `msg-{8 hex chars}`.
/// Uses a hash of timestamp and process ID.
pub fn new_message_id() -> String {
    let mut hasher = DefaultHasher::new();
    SystemTime::now().hash(&mut hasher);
    std::process::id().hash(&mut hasher);
    let hash = hasher.finish();
    format!("msg-{:08x}", hash as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_id_matches_format() {
        let id = new_message_id();
        assert_eq!(id.len(), 12); // "msg-" (4) + 8 hex chars
        assert!(id.starts_with("msg-"));
        assert!(id.chars().skip(4).all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn message_ids_differ_across_calls() {
        // Probabilistic, but collision chance is extremely low with a
        // nanosecond timestamp in the hash.
        assert_ne!(new_message_id(), new_message_id());
    }

    #[test]
    fn from_user_sets_role_and_id() {
        let message = ChatMessage::from_user("hello");
        assert_eq!(message.role, Role::Human);
        assert_eq!(message.content, "hello");
        assert!(message.id.is_some());
        assert!(!message.is_agent());
    }

    #[test]
    fn role_serializes_as_wire_names() {
        let human = serde_json::to_string(&Role::Human).unwrap();
        let agent = serde_json::to_string(&Role::Agent).unwrap();
        assert_eq!(human, "\"human\"");
        assert_eq!(agent, "\"ai\"");
    }

    #[test]
    fn message_deserializes_without_id() {
        let message: ChatMessage =
            serde_json::from_str(r#"{"role": "ai", "content": "answer"}"#).unwrap();
        assert_eq!(message.id, None);
        assert!(message.is_agent());
        assert_eq!(message.content, "answer");
    }
}
