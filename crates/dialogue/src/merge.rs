//! Context merge engine.
//!
//! `merge` is the single place where a session's entity fields change. It is
//! pure: the same prior context, signals and feedback always produce the
//! same next context.

use chrono::{DateTime, Utc};
use shuttlechat_core::context::{ContextFeedback, SessionContext, SessionId, Topic};
use shuttlechat_core::language::Language;

use crate::classifier::Classification;
use crate::extractor::ExtractedEntities;

/// What the current turn observed before any knowledge lookup.
#[derive(Debug, Clone)]
pub struct TurnSignals<'a> {
    pub session_id: &'a SessionId,

    /// Detected language, used only when starting a fresh context
    pub language: Language,

    pub entities: &'a ExtractedEntities,
    pub classification: Classification,
    pub now: DateTime<Utc>,
}

/// Fold prior context, this turn's signals and optional knowledge feedback
/// into the next context.
///
/// 1. No prior context: start fresh with every entity field empty.
/// 2. Flight turn (classified, or prior topic already flight): newly
///    extracted time/destination replace the prior values; `last_topic`
///    becomes `FlightTiming` if it was empty.
/// 3. Non-empty feedback values override step 2.
/// 4. A flight turn always ends with `last_topic = FlightTiming`.
/// 5. The timestamp is stamped with `now`.
pub fn merge(
    prior: Option<&SessionContext>,
    signals: &TurnSignals<'_>,
    feedback: Option<&ContextFeedback>,
) -> SessionContext {
    let mut next = match prior {
        Some(ctx) => ctx.clone(),
        None => SessionContext::new(signals.session_id.clone(), signals.language, signals.now),
    };

    let flight_turn = signals.classification == Classification::FlightTiming
        || next.last_topic == Some(Topic::FlightTiming);

    if flight_turn {
        if let Some(destination) = signals.entities.destination {
            next.flight_destination = Some(destination);
        }
        if let Some(time) = &signals.entities.time {
            next.flight_time = Some(time.clone());
        }
        if next.last_topic.is_none() {
            next.last_topic = Some(Topic::FlightTiming);
        }
    }

    if let Some(feedback) = feedback {
        if let Some(topic) = feedback.last_topic {
            next.last_topic = Some(topic);
        }
        if let Some(time) = &feedback.flight_time {
            next.flight_time = Some(time.clone());
        }
        if let Some(destination) = feedback.flight_destination {
            next.flight_destination = Some(destination);
        }
    }

    if signals.classification == Classification::FlightTiming
        || next.last_topic == Some(Topic::FlightTiming)
    {
        next.last_topic = Some(Topic::FlightTiming);
    }

    next.timestamp = signals.now;
    next
}
