//! Transcript message types.
//!
//! A session transcript is an append-only list of user and assistant turns.
//! The same type carries the system/user pair sent to the generation provider.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The role of a message sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The end user
    User,
    /// The assistant
    Assistant,
    /// Instructions for the generation provider
    System,
}

/// A single message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Unique message ID
    pub id: String,

    /// Who sent this message
    pub role: Role,

    /// The text content
    pub content: String,

    /// Timestamp
    pub timestamp: DateTime<Utc>,
}

impl Message {
    fn with_role(role: Role, content: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            timestamp,
        }
    }

    /// Create a new user message stamped now.
    pub fn user(content: impl Into<String>) -> Self {
        Self::with_role(Role::User, content, Utc::now())
    }

    /// Create a new assistant message stamped now.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::with_role(Role::Assistant, content, Utc::now())
    }

    /// Create a new system message stamped now.
    pub fn system(content: impl Into<String>) -> Self {
        Self::with_role(Role::System, content, Utc::now())
    }

    /// Create a message with an explicit timestamp (used with injected clocks).
    pub fn at(role: Role, content: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self::with_role(role, content, timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_user_message() {
        let msg = Message::user("When is my pickup?");
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.content, "When is my pickup?");
        assert!(!msg.id.is_empty());
    }

    #[test]
    fn explicit_timestamp_is_kept() {
        let ts = DateTime::parse_from_rfc3339("2025-03-01T08:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let msg = Message::at(Role::Assistant, "See you at stop 5", ts);
        assert_eq!(msg.timestamp, ts);
        assert_eq!(msg.role, Role::Assistant);
    }

    #[test]
    fn role_serializes_lowercase() {
        let json = serde_json::to_string(&Role::Assistant).unwrap();
        assert_eq!(json, "\"assistant\"");
    }
}
