//! `StaticKnowledgeBase`: keyword lookup over the read-only corpus.

use async_trait::async_trait;
use serde_json::{Value, json};
use shuttlechat_core::context::{ContextFeedback, Destination, SessionContext, Topic};
use shuttlechat_core::error::KnowledgeError;
use shuttlechat_core::knowledge::{
    KnowledgeItem, KnowledgeLookup, KnowledgeResult, Location, LocationSearch,
    LocationSearchResult,
};
use shuttlechat_core::text::{contains_word, normalize};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

use crate::corpus::{FLIGHT_TIMING_TOPIC, KnowledgeCorpus, RegionEntry};
use crate::timing::{parse_clock, pickup_time};

/// Name words too generic to identify a location on their own.
const GENERIC_NAME_WORDS: &[&str] = &["hotel", "reykjavik", "reykjavík", "terminal", "stop"];

/// Shortest name word considered for a partial location match.
const MIN_SIGNIFICANT_WORD: usize = 4;

/// Knowledge collaborator backed by an in-memory corpus.
///
/// Cloning is cheap; clones share the same corpus.
#[derive(Debug, Clone)]
pub struct StaticKnowledgeBase {
    corpus: Arc<KnowledgeCorpus>,
}

impl StaticKnowledgeBase {
    pub fn new(corpus: KnowledgeCorpus) -> Self {
        Self {
            corpus: Arc::new(corpus),
        }
    }

    /// Knowledge base over the built-in corpus.
    pub fn builtin() -> Self {
        Self::new(KnowledgeCorpus::builtin())
    }

    /// Load a JSON corpus from disk.
    pub fn from_path(path: &Path) -> Result<Self, KnowledgeError> {
        let corpus = KnowledgeCorpus::from_json_file(path)?;
        debug!(
            path = %path.display(),
            topics = corpus.topics.len(),
            locations = corpus.locations.len(),
            "Loaded knowledge corpus"
        );
        Ok(Self::new(corpus))
    }

    pub fn corpus(&self) -> &KnowledgeCorpus {
        &self.corpus
    }

    /// First region (in declaration order) with an alias in the message.
    fn region_in(&self, normalized: &str) -> Option<&RegionEntry> {
        self.corpus
            .regions
            .iter()
            .find(|r| r.aliases.iter().any(|a| contains_word(normalized, a)))
    }

    fn flight_matches(&self, normalized: &str, context: &SessionContext) -> bool {
        let keyword_hit = self
            .corpus
            .topic(FLIGHT_TIMING_TOPIC)
            .is_some_and(|t| t.keywords.iter().any(|k| contains_word(normalized, k)));

        keyword_hit
            || self.region_in(normalized).is_some()
            || (context.last_topic == Some(Topic::FlightTiming)
                && normalized.chars().any(|c| c.is_ascii_digit()))
    }

    /// The flight-timing item for the resolved destination and time.
    fn flight_item(&self, destination: Option<Destination>, flight_time: Option<&str>) -> KnowledgeItem {
        let mut data = self
            .corpus
            .topic(FLIGHT_TIMING_TOPIC)
            .map(|t| t.facts.clone())
            .filter(Value::is_object)
            .unwrap_or_else(|| json!({}));

        let region = destination.and_then(|d| self.corpus.region(d));
        if let Some(region) = region {
            data["destination"] = json!(region.destination);
            data["regionNote"] = json!(region.note);
            data["leadMinutes"] = json!(region.lead_minutes);
        }

        if let Some(token) = flight_time {
            data["flightTime"] = json!(token);
            if let (Some(region), Some(departure)) = (region, parse_clock(token)) {
                let pickup = pickup_time(departure, region.lead_minutes);
                data["recommendedPickup"] = json!(pickup.format("%H:%M").to_string());
            }
        }

        KnowledgeItem::new(FLIGHT_TIMING_TOPIC, data)
    }
}

impl Default for StaticKnowledgeBase {
    fn default() -> Self {
        Self::builtin()
    }
}

#[async_trait]
impl KnowledgeLookup for StaticKnowledgeBase {
    async fn lookup(
        &self,
        message: &str,
        context: &SessionContext,
    ) -> Result<KnowledgeResult, KnowledgeError> {
        let normalized = normalize(message);
        let mut result = KnowledgeResult::default();

        if self.flight_matches(&normalized, context) {
            let observed = self.region_in(&normalized).map(|r| r.destination);
            let destination = observed.or(context.flight_destination);

            result.relevant_info.push(
                self.flight_item(destination, context.flight_time.as_deref()),
            );
            result.context = ContextFeedback {
                last_topic: Some(Topic::FlightTiming),
                flight_time: None,
                flight_destination: observed,
            };
        }

        for topic in self.corpus.topics.iter().filter(|t| t.id != FLIGHT_TIMING_TOPIC) {
            if topic.keywords.iter().any(|k| contains_word(&normalized, k)) {
                result
                    .relevant_info
                    .push(KnowledgeItem::new(topic.id.clone(), topic.facts.clone()));
            }
        }

        debug!(
            items = result.relevant_info.len(),
            feedback = !result.context.is_empty(),
            "Knowledge lookup complete"
        );
        Ok(result)
    }
}

#[async_trait]
impl LocationSearch for StaticKnowledgeBase {
    async fn search_location(&self, message: &str) -> Result<LocationSearchResult, KnowledgeError> {
        let normalized = normalize(message);
        let mut result = LocationSearchResult::default();

        for location in &self.corpus.locations {
            if is_exact_match(location, &normalized) {
                result.exact_matches.push(location.clone());
            } else if is_partial_match(location, &normalized) {
                result.partial_matches.push(location.clone());
            }
        }

        debug!(
            exact = result.exact_matches.len(),
            partial = result.partial_matches.len(),
            "Location search complete"
        );
        Ok(result)
    }
}

fn is_exact_match(location: &Location, normalized: &str) -> bool {
    contains_word(normalized, &location.name.to_lowercase())
        || location.aliases.iter().any(|a| contains_word(normalized, a))
}

fn is_partial_match(location: &Location, normalized: &str) -> bool {
    location
        .name
        .to_lowercase()
        .split_whitespace()
        .filter(|w| w.chars().count() >= MIN_SIGNIFICANT_WORD && !GENERIC_NAME_WORDS.contains(w))
        .any(|w| contains_word(normalized, w))
}
