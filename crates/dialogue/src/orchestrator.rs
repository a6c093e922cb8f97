//! The dialogue orchestrator: one turn, start to finish.
//!
//! ```text
//! greeting ──────────────────────────────────────────────► canned reply
//! otherwise: load + merge ─► knowledge lookup (+ locations)
//!     items found   ─► generate ─► merge feedback ─► persist ─► reply
//!     acknowledgment ─► persist ─► canned reply (topic: acknowledgment)
//!     nothing        ─► persist ─► fallback reply (topic: unknown)
//! collaborator failure anywhere ─► apology, nothing persisted
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shuttlechat_core::clock::{Clock, SystemClock};
use shuttlechat_core::context::{ContextView, SessionContext, SessionId, Topic};
use shuttlechat_core::error::{Error, Result};
use shuttlechat_core::event::{Broadcaster, ConversationEvent};
use shuttlechat_core::knowledge::{KnowledgeItem, KnowledgeLookup, KnowledgeResult, LocationSearch};
use shuttlechat_core::language::{FixedLanguageDetector, Language, LanguageDetector};
use shuttlechat_core::message::{Message, Role};
use shuttlechat_core::provider::{Provider, ProviderRequest};
use shuttlechat_core::text::{contains_word, normalize};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::classifier::TopicClassifier;
use crate::extractor::extract;
use crate::merge::{TurnSignals, merge};
use crate::prompt;
use crate::responses;
use crate::store::ContextStore;

/// Words that make a message worth a location-directory search.
const LOCATION_KEYWORDS: &[&str] = &["hotel", "hótel", "pickup", "pick up", "location", "stop", "address"];

/// Knowledge item kind for exact location-directory matches.
pub const LOCATION_DETAILS: &str = "location_details";

const DEFAULT_TEMPERATURE: f32 = 0.3;
const DEFAULT_MAX_TOKENS: u32 = 500;

/// Whether the turn completed normally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnStatus {
    Ok,
    /// A collaborator failed; the reply is the apology text
    Failed,
}

/// Everything a transport needs to answer one turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnOutcome {
    pub reply: String,
    pub language: Language,
    pub session_id: SessionId,
    pub context: ContextView,
    pub status: TurnStatus,

    /// Topic published with the conversation event
    pub topic: Topic,
}

impl TurnOutcome {
    pub fn is_failed(&self) -> bool {
        self.status == TurnStatus::Failed
    }
}

/// Runs dialogue turns against the injected collaborators.
pub struct DialogueOrchestrator {
    /// Text generation backend
    provider: Arc<dyn Provider>,

    /// Knowledge corpus lookup
    knowledge: Arc<dyn KnowledgeLookup>,

    /// Optional pickup-location directory
    locations: Option<Arc<dyn LocationSearch>>,

    /// Session context storage
    store: Arc<dyn ContextStore>,

    /// Optional conversation event sink
    broadcaster: Option<Arc<dyn Broadcaster>>,

    clock: Arc<dyn Clock>,
    detector: Arc<dyn LanguageDetector>,
    classifier: TopicClassifier,

    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl DialogueOrchestrator {
    pub fn new(
        provider: Arc<dyn Provider>,
        knowledge: Arc<dyn KnowledgeLookup>,
        store: Arc<dyn ContextStore>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            knowledge,
            locations: None,
            store,
            broadcaster: None,
            clock: Arc::new(SystemClock),
            detector: Arc::new(FixedLanguageDetector::default()),
            classifier: TopicClassifier::new(),
            model: model.into(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    /// Attach the pickup-location directory.
    pub fn with_location_search(mut self, locations: Arc<dyn LocationSearch>) -> Self {
        self.locations = Some(locations);
        self
    }

    /// Publish a conversation event for every answered turn.
    pub fn with_broadcaster(mut self, broadcaster: Arc<dyn Broadcaster>) -> Self {
        self.broadcaster = Some(broadcaster);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_language_detector(mut self, detector: Arc<dyn LanguageDetector>) -> Self {
        self.detector = detector;
        self
    }

    /// Set the sampling temperature for generation.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the output cap for generation.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Handle one turn.
    ///
    /// A missing `session_id` starts a new session. Only an empty message
    /// is an `Err`; collaborator failures come back as a
    /// [`TurnStatus::Failed`] outcome carrying the apology reply.
    pub async fn handle_turn(&self, session_id: Option<SessionId>, message: &str) -> Result<TurnOutcome> {
        let message = message.trim();
        if message.is_empty() {
            return Err(Error::InvalidInput("message must not be empty".into()));
        }

        let session_id = session_id.unwrap_or_default();
        let language = self.detector.detect(message);
        info!(session_id = %session_id, len = message.len(), "Turn started");
        debug!(session_id = %session_id, preview = %preview(message), "Turn message");

        if self.classifier.is_greeting(message) {
            debug!(session_id = %session_id, "Greeting path");
            let reply = responses::greeting(language);
            self.publish(message, reply, language, Topic::Greeting).await;
            return Ok(TurnOutcome {
                reply: reply.to_string(),
                language,
                session_id,
                context: ContextView::default().with_topic(Topic::Greeting),
                status: TurnStatus::Ok,
                topic: Topic::Greeting,
            });
        }

        let prior = self.store.get(&session_id).await;

        match self.run_turn(&session_id, message, language, prior.as_ref()).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                error!(session_id = %session_id, error = %e, "Turn failed");
                let language = prior.as_ref().map_or(language, |c| c.language);
                let context = prior.as_ref().map(SessionContext::view).unwrap_or_default();
                Ok(TurnOutcome {
                    reply: responses::apology(language).to_string(),
                    language,
                    session_id,
                    topic: context.last_topic.unwrap_or(Topic::Unknown),
                    context,
                    status: TurnStatus::Failed,
                })
            }
        }
    }

    async fn run_turn(
        &self,
        session_id: &SessionId,
        message: &str,
        language: Language,
        prior: Option<&SessionContext>,
    ) -> Result<TurnOutcome> {
        let now = self.clock.now();
        let entities = extract(message);
        let signals = TurnSignals {
            session_id,
            language,
            entities: &entities,
            classification: self.classifier.classify(message, prior),
            now,
        };
        debug!(
            session_id = %session_id,
            classification = ?signals.classification,
            time = ?entities.time,
            destination = ?entities.destination,
            "Turn signals"
        );

        let working = merge(prior, &signals, None);
        let knowledge = self.gather_knowledge(message, &working).await?;

        if !knowledge.is_empty() {
            return self
                .grounded_reply(message, prior, &signals, &working, knowledge, now)
                .await;
        }

        let (reply, topic, context) = if self.classifier.is_acknowledgment(message) {
            debug!(session_id = %session_id, "Acknowledgment path");
            (
                responses::acknowledgment(working.language),
                Topic::Acknowledgment,
                working.view().with_topic(Topic::Acknowledgment),
            )
        } else {
            debug!(session_id = %session_id, "Fallback path");
            (responses::fallback(working.language), Topic::Unknown, working.view())
        };

        let language = working.language;
        self.persist(working, message, reply, now).await;
        self.publish(message, reply, language, topic).await;

        Ok(TurnOutcome {
            reply: reply.to_string(),
            language,
            session_id: session_id.clone(),
            context,
            status: TurnStatus::Ok,
            topic,
        })
    }

    /// Corpus lookup plus, for location-flavoured messages, exact
    /// directory matches as a `location_details` item.
    async fn gather_knowledge(&self, message: &str, context: &SessionContext) -> Result<KnowledgeResult> {
        let mut knowledge = self.knowledge.lookup(message, context).await?;

        let Some(locations) = &self.locations else {
            return Ok(knowledge);
        };
        if !mentions_location(message) {
            return Ok(knowledge);
        }

        let found = locations.search_location(message).await?;
        if !found.exact_matches.is_empty() {
            debug!(matches = found.exact_matches.len(), "Location matches attached");
            knowledge.relevant_info.push(KnowledgeItem::new(
                LOCATION_DETAILS,
                serde_json::to_value(&found.exact_matches)?,
            ));
        }

        Ok(knowledge)
    }

    async fn grounded_reply(
        &self,
        message: &str,
        prior: Option<&SessionContext>,
        signals: &TurnSignals<'_>,
        working: &SessionContext,
        knowledge: KnowledgeResult,
        now: DateTime<Utc>,
    ) -> Result<TurnOutcome> {
        debug!(
            session_id = %signals.session_id,
            items = knowledge.relevant_info.len(),
            "Grounded path"
        );

        let request = ProviderRequest::grounded(
            &self.model,
            prompt::system_instruction(working.language),
            prompt::user_content(&knowledge.relevant_info, message)?,
            self.temperature,
            self.max_tokens,
        );
        let response = self.provider.complete(request).await?;
        let reply = response.message.content;

        let feedback = (!knowledge.context.is_empty()).then_some(&knowledge.context);
        let next = merge(prior, signals, feedback);
        let context = next.view();
        let language = next.language;
        let topic = next.last_topic.unwrap_or(Topic::General);

        self.persist(next, message, &reply, now).await;
        self.publish(message, &reply, language, topic).await;

        Ok(TurnOutcome {
            reply,
            language,
            session_id: signals.session_id.clone(),
            context,
            status: TurnStatus::Ok,
            topic,
        })
    }

    /// Append both turn messages and write the full context in one put.
    async fn persist(&self, mut context: SessionContext, message: &str, reply: &str, now: DateTime<Utc>) {
        context.push(Message::at(Role::User, message, now));
        context.push(Message::at(Role::Assistant, reply, now));
        self.store.put(context.session_id.clone(), context).await;
    }

    async fn publish(&self, message: &str, reply: &str, language: Language, topic: Topic) {
        let Some(broadcaster) = &self.broadcaster else {
            return;
        };
        let event = ConversationEvent::new(message, reply, language, topic, self.clock.now());
        if let Err(e) = broadcaster.publish(event).await {
            warn!(error = %e, "Conversation event not published");
        }
    }
}

fn mentions_location(message: &str) -> bool {
    let normalized = normalize(message);
    LOCATION_KEYWORDS.iter().any(|k| contains_word(&normalized, k))
}

fn preview(message: &str) -> String {
    message.chars().take(60).collect()
}
