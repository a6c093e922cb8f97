//! Conversation broadcast: fire-and-forget notification of completed turns.
//!
//! Every answered turn is published as a `ConversationEvent`. Subscribers
//! (e.g. the gateway's SSE stream) receive a copy; publishing never blocks
//! or fails the turn.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::context::Topic;
use crate::error::BroadcastError;
use crate::language::Language;

/// A completed conversation turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationEvent {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub user_message: String,
    pub bot_response: String,
    pub language: Language,
    pub topic: Topic,
    #[serde(rename = "type")]
    pub kind: String,
}

impl ConversationEvent {
    pub fn new(
        user_message: impl Into<String>,
        bot_response: impl Into<String>,
        language: Language,
        topic: Topic,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            timestamp,
            user_message: user_message.into(),
            bot_response: bot_response.into(),
            language,
            topic,
            kind: "conversation".into(),
        }
    }
}

/// Publishes conversation events.
#[async_trait]
pub trait Broadcaster: Send + Sync {
    async fn publish(&self, event: ConversationEvent) -> std::result::Result<(), BroadcastError>;
}

/// A broadcast-based event bus.
///
/// Uses `tokio::sync::broadcast` for multi-consumer pub/sub.
pub struct EventBus {
    sender: broadcast::Sender<Arc<ConversationEvent>>,
}

impl EventBus {
    /// Create a new event bus with the given capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to receive events.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<ConversationEvent>> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

#[async_trait]
impl Broadcaster for EventBus {
    async fn publish(&self, event: ConversationEvent) -> std::result::Result<(), BroadcastError> {
        // No subscribers is not a failure
        let _ = self.sender.send(Arc::new(event));
        Ok(())
    }
}
