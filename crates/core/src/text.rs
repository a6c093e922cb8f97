//! Word-bounded keyword matching shared by the classifier, extractor, and
//! knowledge corpus.
//!
//! Boundaries are Unicode-aware (`char::is_alphanumeric`), so Icelandic
//! keywords such as "hæ" or "takk" behave like their English counterparts.

/// Lowercase and collapse runs of whitespace to single spaces.
pub fn normalize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn is_boundary(c: Option<char>) -> bool {
    c.is_none_or(|c| !c.is_alphanumeric())
}

/// Does `phrase` occur in `haystack` as a whole word (or word sequence)?
///
/// Both arguments are expected to be normalized already.
pub fn contains_word(haystack: &str, phrase: &str) -> bool {
    if phrase.is_empty() {
        return false;
    }
    haystack.match_indices(phrase).any(|(idx, m)| {
        let before = haystack[..idx].chars().next_back();
        let after = haystack[idx + m.len()..].chars().next();
        is_boundary(before) && is_boundary(after)
    })
}

/// Does `haystack` start with `prefix` followed by a word boundary?
pub fn starts_with_word(haystack: &str, prefix: &str) -> bool {
    if prefix.is_empty() {
        return false;
    }
    haystack
        .strip_prefix(prefix)
        .is_some_and(|rest| is_boundary(rest.chars().next()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_collapses_whitespace() {
        assert_eq!(normalize("  Flight   to\tNEW  York "), "flight to new york");
    }

    #[test]
    fn contains_word_respects_boundaries() {
        assert!(contains_word("flight to the us tomorrow", "us"));
        assert!(!contains_word("the shuttle bus", "us"));
        assert!(!contains_word("you must go", "us"));
        assert!(contains_word("flying to new york", "new york"));
        assert!(contains_word("canada!", "canada"));
    }

    #[test]
    fn starts_with_word_handles_non_ascii() {
        assert!(starts_with_word("hæ", "hæ"));
        assert!(starts_with_word("hæ, hvað segirðu", "hæ"));
        assert!(!starts_with_word("history of the bus", "hi"));
        assert!(starts_with_word("hi there", "hi"));
    }

    #[test]
    fn empty_needles_never_match() {
        assert!(!contains_word("anything", ""));
        assert!(!starts_with_word("anything", ""));
    }
}
