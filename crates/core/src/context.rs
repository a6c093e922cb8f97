//! Session context: the per-session dialogue state.
//!
//! One `SessionContext` exists per session id. The entity fields
//! (`last_topic`, `flight_time`, `flight_destination`) are sticky: they are
//! only ever replaced by a newly observed value, never cleared by a turn that
//! does not mention them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::language::Language;
use crate::message::Message;

/// Opaque, stable identifier for a session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl SessionId {
    /// Generate a fresh random session id.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for SessionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What the conversation is currently about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    FlightTiming,
    Acknowledgment,
    Greeting,
    General,
    Unknown,
}

impl Topic {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FlightTiming => "flight_timing",
            Self::Acknowledgment => "acknowledgment",
            Self::Greeting => "greeting",
            Self::General => "general",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Flight destination region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Destination {
    Europe,
    UsCanada,
}

impl Destination {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Europe => "europe",
            Self::UsCanada => "us_canada",
        }
    }
}

impl std::fmt::Display for Destination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The full stored state of one session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionContext {
    pub session_id: SessionId,

    /// Resolved reply language
    pub language: Language,

    /// Sticky topic; never reset to `None` once set
    pub last_topic: Option<Topic>,

    /// Free-form clock token, e.g. "14:30" or "2pm"
    pub flight_time: Option<String>,

    pub flight_destination: Option<Destination>,

    /// Append-only transcript (not replayed into generation)
    pub messages: Vec<Message>,

    /// Last-touched time, used for TTL expiry
    pub timestamp: DateTime<Utc>,
}

impl SessionContext {
    /// A fresh context with every entity field empty.
    pub fn new(session_id: SessionId, language: Language, now: DateTime<Utc>) -> Self {
        Self {
            session_id,
            language,
            last_topic: None,
            flight_time: None,
            flight_destination: None,
            messages: Vec::new(),
            timestamp: now,
        }
    }

    /// The public snapshot returned to clients.
    pub fn view(&self) -> ContextView {
        ContextView {
            last_topic: self.last_topic,
            flight_time: self.flight_time.clone(),
            flight_destination: self.flight_destination,
        }
    }

    /// Append one message to the transcript.
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }
}

/// Public context snapshot: `{lastTopic, flightTime, flightDestination}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextView {
    pub last_topic: Option<Topic>,
    pub flight_time: Option<String>,
    pub flight_destination: Option<Destination>,
}

impl ContextView {
    /// Replace the reported topic, keeping the entity fields.
    pub fn with_topic(mut self, topic: Topic) -> Self {
        self.last_topic = Some(topic);
        self
    }
}

/// Context values reported back by the knowledge layer after a lookup.
///
/// Every field is optional; a `Some` value takes precedence over what the
/// dialogue engine extracted itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextFeedback {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_topic: Option<Topic>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flight_time: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flight_destination: Option<Destination>,
}

impl ContextFeedback {
    pub fn is_empty(&self) -> bool {
        self.last_topic.is_none() && self.flight_time.is_none() && self.flight_destination.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_context_has_empty_entities() {
        let ctx = SessionContext::new(SessionId::from("s1"), Language::En, Utc::now());
        assert!(ctx.last_topic.is_none());
        assert!(ctx.flight_time.is_none());
        assert!(ctx.flight_destination.is_none());
        assert!(ctx.messages.is_empty());
    }

    #[test]
    fn view_serializes_camel_case_with_nulls() {
        let mut ctx = SessionContext::new(SessionId::from("s1"), Language::En, Utc::now());
        ctx.last_topic = Some(Topic::FlightTiming);
        ctx.flight_destination = Some(Destination::UsCanada);

        let json = serde_json::to_value(ctx.view()).unwrap();
        assert_eq!(json["lastTopic"], "flight_timing");
        assert_eq!(json["flightDestination"], "us_canada");
        assert!(json["flightTime"].is_null());
    }

    #[test]
    fn view_with_topic_keeps_entities() {
        let view = ContextView {
            last_topic: Some(Topic::FlightTiming),
            flight_time: Some("14:00".into()),
            flight_destination: Some(Destination::Europe),
        }
        .with_topic(Topic::Acknowledgment);
        assert_eq!(view.last_topic, Some(Topic::Acknowledgment));
        assert_eq!(view.flight_time.as_deref(), Some("14:00"));
    }

    #[test]
    fn feedback_emptiness() {
        assert!(ContextFeedback::default().is_empty());
        let fb = ContextFeedback {
            flight_destination: Some(Destination::Europe),
            ..Default::default()
        };
        assert!(!fb.is_empty());
    }

    #[test]
    fn session_id_is_transparent_in_json() {
        let id = SessionId::from("abc-123");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"abc-123\"");
    }
}
