//! Knowledge collaborators: corpus lookup and pickup-location search.
//!
//! The dialogue engine treats knowledge items as opaque JSON facts that are
//! embedded verbatim into the generation prompt.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::context::{ContextFeedback, SessionContext};
use crate::error::KnowledgeError;

/// One structured fact from the knowledge corpus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeItem {
    /// Item kind, e.g. "flight_timing", "luggage", "location_details"
    #[serde(rename = "type")]
    pub kind: String,

    /// The fact payload
    pub data: serde_json::Value,
}

impl KnowledgeItem {
    pub fn new(kind: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            kind: kind.into(),
            data,
        }
    }
}

/// Result of a knowledge lookup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeResult {
    /// Items relevant to the message; may be empty
    pub relevant_info: Vec<KnowledgeItem>,

    /// Context values observed during lookup; may be empty
    #[serde(default)]
    pub context: ContextFeedback,
}

impl KnowledgeResult {
    pub fn is_empty(&self) -> bool {
        self.relevant_info.is_empty()
    }
}

/// Looks up knowledge relevant to a message in the light of session context.
#[async_trait]
pub trait KnowledgeLookup: Send + Sync {
    async fn lookup(
        &self,
        message: &str,
        context: &SessionContext,
    ) -> std::result::Result<KnowledgeResult, KnowledgeError>;
}

/// A named pickup location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub name: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,

    /// Where the shuttle picks up, e.g. "Bus stop 12 - Rauðarárstígur"
    pub pickup_point: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_number: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Result of a location search.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationSearchResult {
    pub exact_matches: Vec<Location>,

    #[serde(default)]
    pub partial_matches: Vec<Location>,
}

/// Searches the pickup-location directory.
#[async_trait]
pub trait LocationSearch: Send + Sync {
    async fn search_location(
        &self,
        message: &str,
    ) -> std::result::Result<LocationSearchResult, KnowledgeError>;
}
