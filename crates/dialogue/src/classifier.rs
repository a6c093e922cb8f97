//! Topic classification as an ordered rule table.
//!
//! Rules are evaluated top to bottom; the first rule that fires decides the
//! classification. The table order is the precedence:
//!
//! | # | Rule                    | Result           |
//! |---|-------------------------|------------------|
//! | 1 | greeting prefix         | `Greeting`       |
//! | 2 | flight mention          | `FlightTiming`   |
//! | 3 | acknowledgment prefix   | `Acknowledgment` |
//! | 4 | prior topic is flight   | `FlightTiming`   |
//!
//! Nothing firing yields `None`: defer to knowledge lookup.

use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use shuttlechat_core::context::{SessionContext, Topic};
use shuttlechat_core::text::{contains_word, normalize, starts_with_word};

use crate::extractor::{DESTINATION_KEYWORDS, is_shouted, is_us_code};

/// Greeting prefixes, English then Icelandic.
pub const GREETING_PREFIXES: &[&str] = &[
    "hello",
    "hi",
    "hey",
    "good morning",
    "good afternoon",
    "good evening",
    "hæ",
    "halló",
    "góðan dag",
];

/// Thanks and acknowledgment prefixes, English then Icelandic.
pub const ACKNOWLEDGMENT_PREFIXES: &[&str] = &[
    "thanks",
    "thank you",
    "thx",
    "ok",
    "okay",
    "great",
    "perfect",
    "takk",
    "frábært",
];

/// Advisory classification of a single turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Greeting,
    Acknowledgment,
    FlightTiming,
    None,
}

impl Classification {
    /// The context topic this classification maps to, if any.
    pub fn topic(&self) -> Option<Topic> {
        match self {
            Self::Greeting => Some(Topic::Greeting),
            Self::Acknowledgment => Some(Topic::Acknowledgment),
            Self::FlightTiming => Some(Topic::FlightTiming),
            Self::None => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rule {
    GreetingPrefix,
    FlightMention,
    AcknowledgmentPrefix,
    StickyFlightContext,
}

const RULES: &[(Rule, Classification)] = &[
    (Rule::GreetingPrefix, Classification::Greeting),
    (Rule::FlightMention, Classification::FlightTiming),
    (Rule::AcknowledgmentPrefix, Classification::Acknowledgment),
    (Rule::StickyFlightContext, Classification::FlightTiming),
];

/// Pattern-table topic classifier.
#[derive(Debug, Clone)]
pub struct TopicClassifier {
    /// "to <region>" / "for <region>", on lowercased text
    region_phrase: Regex,

    /// "to"/"for" and the token after it, on the raw text
    preposition_token: Regex,
}

impl TopicClassifier {
    pub fn new() -> Self {
        let keywords: Vec<String> = DESTINATION_KEYWORDS
            .iter()
            .flat_map(|(_, keywords)| keywords.iter())
            .map(|k| regex_lite::escape(k))
            .collect();
        let pattern = format!(r"\b(?:to|for)\s+(?:the\s+)?(?:{})\b", keywords.join("|"));

        Self {
            region_phrase: Regex::new(&pattern).expect("region phrase pattern is valid"),
            preposition_token: Regex::new(r"(?i)\b(?:to|for)\s+(?:the\s+)?(\S+)")
                .expect("preposition pattern is valid"),
        }
    }

    /// Does the message open with a greeting?
    pub fn is_greeting(&self, message: &str) -> bool {
        let normalized = normalize(message);
        GREETING_PREFIXES.iter().any(|p| starts_with_word(&normalized, p))
    }

    /// Does the message open with thanks or an acknowledgment?
    pub fn is_acknowledgment(&self, message: &str) -> bool {
        let normalized = normalize(message);
        ACKNOWLEDGMENT_PREFIXES.iter().any(|p| starts_with_word(&normalized, p))
    }

    /// Does the message itself talk about a flight?
    ///
    /// True for the word "flight" or a "to/for <region>" phrase. "to us"
    /// is the pronoun unless written as a country code.
    pub fn mentions_flight(&self, message: &str) -> bool {
        let normalized = normalize(message);
        contains_word(&normalized, "flight")
            || self.region_phrase.is_match(&normalized)
            || self.names_us_after_preposition(message)
    }

    fn names_us_after_preposition(&self, message: &str) -> bool {
        let shouted = is_shouted(message);
        self.preposition_token
            .captures_iter(message)
            .any(|caps| caps.get(1).is_some_and(|m| is_us_code(m.as_str(), shouted)))
    }

    /// Classify a message in the light of the current context.
    pub fn classify(&self, message: &str, context: Option<&SessionContext>) -> Classification {
        RULES
            .iter()
            .find(|(rule, _)| self.fires(*rule, message, context))
            .map(|(_, classification)| *classification)
            .unwrap_or(Classification::None)
    }

    fn fires(&self, rule: Rule, message: &str, context: Option<&SessionContext>) -> bool {
        match rule {
            Rule::GreetingPrefix => self.is_greeting(message),
            Rule::FlightMention => self.mentions_flight(message),
            Rule::AcknowledgmentPrefix => self.is_acknowledgment(message),
            Rule::StickyFlightContext => {
                context.is_some_and(|c| c.last_topic == Some(Topic::FlightTiming))
            }
        }
    }
}

impl Default for TopicClassifier {
    fn default() -> Self {
        Self::new()
    }
}
