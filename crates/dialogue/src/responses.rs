//! Canned replies for the paths that skip generation.

use shuttlechat_core::language::Language;

pub fn greeting(language: Language) -> &'static str {
    match language {
        Language::En => {
            "Hello! I can help with airport transfers, pickup times and bookings. What would you like to know?"
        }
        Language::Is => {
            "Halló! Ég get aðstoðað með flugrútuna, sóttíma og bókanir. Hvað viltu vita?"
        }
    }
}

pub fn acknowledgment(language: Language) -> &'static str {
    match language {
        Language::En => "You're welcome! Let me know if there is anything else I can help with.",
        Language::Is => "Verði þér að góðu! Láttu mig vita ef ég get aðstoðað með eitthvað fleira.",
    }
}

/// Reply when nothing in the corpus matches the message.
pub fn fallback(language: Language) -> &'static str {
    match language {
        Language::En => {
            "I'm not sure I can help with that. Please contact our support team for assistance."
        }
        Language::Is => {
            "Ég er ekki viss um að ég geti aðstoðað með það. Vinsamlegast hafðu samband við þjónustuverið."
        }
    }
}

/// Reply when a collaborator failed mid-turn.
pub fn apology(language: Language) -> &'static str {
    match language {
        Language::En => "Sorry, something went wrong on our side. Please try again in a moment.",
        Language::Is => "Því miður kom upp villa hjá okkur. Vinsamlegast reyndu aftur eftir smástund.",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replies_differ_per_language() {
        for reply in [greeting, acknowledgment, fallback, apology] {
            assert_ne!(reply(Language::En), reply(Language::Is));
            assert!(!reply(Language::En).is_empty());
        }
    }

    #[test]
    fn fallback_points_to_support() {
        assert!(fallback(Language::En).contains("support"));
    }
}
