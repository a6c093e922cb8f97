//! Entity extraction: flight time and destination region.
//!
//! Both extractors are pure functions of the message text.

use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use shuttlechat_core::context::Destination;
use shuttlechat_core::text::{contains_word, normalize};
use std::sync::LazyLock;

/// Destination keyword table, checked in declaration order.
///
/// When a message names places in both regions the first declared region
/// wins, so "from Spain to Toronto" resolves to `Europe`. The bare code "US"
/// is not listed: lowercase "us" is the pronoun, see [`is_us_code`].
pub const DESTINATION_KEYWORDS: &[(Destination, &[&str])] = &[
    (
        Destination::Europe,
        &["europe", "spain", "uk", "united kingdom", "france", "germany"],
    ),
    (
        Destination::UsCanada,
        &["usa", "united states", "canada", "new york", "toronto"],
    ),
];

/// Clock time with optional minutes and meridiem, optionally after "at".
/// Runs on lowercased text.
static TIME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(at\s+)?((?:[01]?\d|2[0-3])(?::[0-5]\d)?(?:\s*[ap]m)?)\b")
        .expect("time pattern is valid")
});

/// Entities found in a single message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedEntities {
    /// Clock token as written (lowercased), e.g. "14:00" or "2pm"
    pub time: Option<String>,
    pub destination: Option<Destination>,
}

impl ExtractedEntities {
    pub fn is_empty(&self) -> bool {
        self.time.is_none() && self.destination.is_none()
    }
}

/// Extract the flight time and destination from a raw message.
pub fn extract(message: &str) -> ExtractedEntities {
    ExtractedEntities {
        time: extract_time(message),
        destination: extract_destination(message),
    }
}

/// The first clock time in the message, without any "at " prefix.
///
/// A bare number only counts as a time after "at"; "2 bags" has no time,
/// "at 2" and "2pm" do.
pub fn extract_time(message: &str) -> Option<String> {
    let lowered = message.to_lowercase();

    TIME_PATTERN.captures_iter(&lowered).find_map(|caps| {
        let token = caps.get(2)?.as_str().trim();
        let has_at = caps.get(1).is_some();
        let has_minutes = token.contains(':');
        let has_meridiem = token.ends_with("am") || token.ends_with("pm");

        (has_at || has_minutes || has_meridiem).then(|| token.to_string())
    })
}

/// The destination region named in the message, if any.
pub fn extract_destination(message: &str) -> Option<Destination> {
    let normalized = normalize(message);

    DESTINATION_KEYWORDS
        .iter()
        .find(|(destination, keywords)| {
            keywords.iter().any(|k| contains_word(&normalized, k))
                || (*destination == Destination::UsCanada && names_us_code(message))
        })
        .map(|(destination, _)| *destination)
}

/// A message with no lowercase letters at all.
pub(crate) fn is_shouted(message: &str) -> bool {
    !message.chars().any(char::is_lowercase)
}

/// Is this raw token the country code for the United States?
///
/// "U.S." and "U.S.A." count in any case. Plain "US" counts only when
/// capitalised in a message that is not written all in capitals, so
/// "room for us" and "PICK US UP" name no country.
pub(crate) fn is_us_code(token: &str, shouted: bool) -> bool {
    let token = token
        .trim_matches(|c: char| !c.is_alphanumeric() && c != '.')
        .trim_end_matches('.');

    (token == "US" && !shouted) || token.eq_ignore_ascii_case("u.s") || token.eq_ignore_ascii_case("u.s.a")
}

fn names_us_code(message: &str) -> bool {
    let shouted = is_shouted(message);
    message.split_whitespace().any(|token| is_us_code(token, shouted))
}
