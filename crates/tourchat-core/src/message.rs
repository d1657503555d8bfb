use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The author of a [`Message`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The person typing into the widget.
    User,
    /// The remote chatbot, or a canned/fallback reply standing in for it.
    Bot,
}

/// A single turn in the widget transcript.
///
/// Messages are immutable once created. `id` and `timestamp` exist so hosts
/// can key rendered rows; transcript order is insertion order, not time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Unique identifier for this message.
    pub id: Uuid,
    /// The role of the message author.
    pub role: Role,
    /// The textual content, possibly containing tour markers and newlines.
    pub content: String,
    /// UTC timestamp of when the message was created locally.
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Creates a new message with the given role and content.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    /// Creates a new message with [`Role::User`].
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Creates a new message with [`Role::Bot`].
    pub fn bot(content: impl Into<String>) -> Self {
        Self::new(Role::Bot, content)
    }

    /// True for turns typed by the user.
    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }

    /// True for turns produced by the bot.
    pub fn is_bot(&self) -> bool {
        self.role == Role::Bot
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_message_creation() {
        let msg = Message::user("Hello");
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.content, "Hello");
        assert!(msg.is_user());
        assert!(!msg.is_bot());
    }

    #[test]
    fn test_messages_get_distinct_ids() {
        let a = Message::bot("same");
        let b = Message::bot("same");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Bot).unwrap(), "\"bot\"");
        let role: Role = serde_json::from_str("\"user\"").unwrap();
        assert_eq!(role, Role::User);
    }
}
