//! Reply language and the detection strategy.
//!
//! Only the fixed detector is registered today; it always reports the
//! configured primary language. The context and prompt code treat the
//! detector as opaque so a real one can be swapped in.

use serde::{Deserialize, Serialize};

/// Supported reply languages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// English (primary)
    #[default]
    En,
    /// Icelandic (secondary)
    Is,
}

impl Language {
    /// ISO 639-1 code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Is => "is",
        }
    }

    /// English name of the language, used in generation instructions.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::En => "English",
            Self::Is => "Icelandic",
        }
    }

    /// Parse an ISO code; unknown codes yield `None`.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "en" => Some(Self::En),
            "is" => Some(Self::Is),
            _ => None,
        }
    }
}

/// Strategy for resolving the reply language of a message.
pub trait LanguageDetector: Send + Sync {
    fn detect(&self, text: &str) -> Language;
}

/// Reports one language regardless of input.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedLanguageDetector {
    language: Language,
}

impl FixedLanguageDetector {
    pub fn new(language: Language) -> Self {
        Self { language }
    }
}

impl LanguageDetector for FixedLanguageDetector {
    fn detect(&self, _text: &str) -> Language {
        self.language
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_detector_ignores_input() {
        let detector = FixedLanguageDetector::default();
        assert_eq!(detector.detect("Hæ, hvenær fer rútan?"), Language::En);
        assert_eq!(detector.detect("Hello"), Language::En);

        let icelandic = FixedLanguageDetector::new(Language::Is);
        assert_eq!(icelandic.detect("Hello"), Language::Is);
    }

    #[test]
    fn codes_round_trip() {
        assert_eq!(Language::from_code("IS"), Some(Language::Is));
        assert_eq!(Language::from_code("en"), Some(Language::En));
        assert_eq!(Language::from_code("de"), None);
        assert_eq!(Language::Is.code(), "is");
    }
}
