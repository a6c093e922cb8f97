//! End-to-end tests for the shuttlechat dialogue pipeline.
//!
//! These run the real extractor, classifier, context store, merge engine,
//! orchestrator and built-in knowledge corpus; only text generation is
//! scripted.

use std::sync::{Arc, Mutex};

use chrono::{Duration, Utc};
use shuttlechat_core::clock::{Clock, ManualClock};
use shuttlechat_core::context::{ContextView, Destination, SessionId, Topic};
use shuttlechat_core::error::ProviderError;
use shuttlechat_core::event::EventBus;
use shuttlechat_core::message::Message;
use shuttlechat_core::provider::{Provider, ProviderRequest, ProviderResponse};
use shuttlechat_dialogue::{ContextStore, DialogueOrchestrator, InMemoryContextStore, TurnStatus};
use shuttlechat_knowledge::StaticKnowledgeBase;

// ── Scripted Provider ────────────────────────────────────────────────────

/// Returns scripted replies in sequence and keeps every request.
struct ScriptedProvider {
    replies: Vec<String>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl ScriptedProvider {
    fn new(replies: &[&str]) -> Self {
        Self {
            replies: replies.iter().map(|r| r.to_string()).collect(),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn user_content(&self, call: usize) -> String {
        self.requests.lock().unwrap()[call].messages[1].content.clone()
    }
}

#[async_trait::async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "e2e_scripted"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let mut requests = self.requests.lock().unwrap();
        let call = requests.len();
        requests.push(request);
        let reply = self
            .replies
            .get(call)
            .unwrap_or_else(|| panic!("ScriptedProvider exhausted at call #{call}"));
        Ok(ProviderResponse {
            message: Message::assistant(reply.as_str()),
            usage: None,
            model: "e2e-model".into(),
        })
    }
}

struct Pipeline {
    orchestrator: DialogueOrchestrator,
    provider: Arc<ScriptedProvider>,
    store: Arc<InMemoryContextStore>,
    bus: Arc<EventBus>,
    clock: Arc<ManualClock>,
}

fn pipeline(replies: &[&str]) -> Pipeline {
    let clock = Arc::new(ManualClock::new(Utc::now()));
    let provider = Arc::new(ScriptedProvider::new(replies));
    let store = Arc::new(InMemoryContextStore::new(clock.clone(), Duration::minutes(30)));
    let bus = Arc::new(EventBus::new(64));
    let kb = Arc::new(StaticKnowledgeBase::builtin());

    let orchestrator = DialogueOrchestrator::new(provider.clone(), kb.clone(), store.clone(), "e2e-model")
        .with_location_search(kb)
        .with_broadcaster(bus.clone())
        .with_clock(clock.clone());

    Pipeline {
        orchestrator,
        provider,
        store,
        bus,
        clock,
    }
}

fn session() -> Option<SessionId> {
    Some(SessionId::from("e2e-session"))
}

// ── Scenarios ────────────────────────────────────────────────────────────

#[tokio::test]
async fn pickup_question_then_thanks_then_nonsense() {
    let p = pipeline(&["Your hotel pickup is at 10:00."]);
    let mut events = p.bus.subscribe();

    // Turn 1: grounded flight question
    let first = p
        .orchestrator
        .handle_turn(session(), "What time is my pickup? Flight to Canada at 14:00")
        .await
        .unwrap();
    assert_eq!(first.status, TurnStatus::Ok);
    assert_eq!(first.reply, "Your hotel pickup is at 10:00.");
    assert_eq!(
        first.context,
        ContextView {
            last_topic: Some(Topic::FlightTiming),
            flight_time: Some("14:00".into()),
            flight_destination: Some(Destination::UsCanada),
        }
    );
    assert!(p.provider.user_content(0).contains("\"recommendedPickup\": \"10:00\""));

    // Turn 2: acknowledgment keeps the itinerary
    let second = p.orchestrator.handle_turn(session(), "thanks").await.unwrap();
    assert_eq!(second.context.last_topic, Some(Topic::Acknowledgment));
    assert_eq!(second.context.flight_time.as_deref(), Some("14:00"));
    assert_eq!(second.context.flight_destination, Some(Destination::UsCanada));

    // Turn 3: nothing matches
    let third = p
        .orchestrator
        .handle_turn(session(), "blah blah unrelated nonsense")
        .await
        .unwrap();
    assert!(third.reply.contains("support"));
    assert_eq!(third.context.flight_time.as_deref(), Some("14:00"));

    assert_eq!(p.provider.calls(), 1);

    let topics: Vec<Topic> = (0..3).map(|_| events.try_recv().unwrap().topic).collect();
    assert_eq!(
        topics,
        vec![Topic::FlightTiming, Topic::Acknowledgment, Topic::Unknown]
    );

    let stored = p.store.get(&SessionId::from("e2e-session")).await.unwrap();
    assert_eq!(stored.messages.len(), 6);
    assert_eq!(stored.last_topic, Some(Topic::FlightTiming));
}

#[tokio::test]
async fn itinerary_given_across_turns() {
    let p = pipeline(&["Noted your 14:00 flight.", "For Toronto, pickup is at 10:00."]);

    let first = p
        .orchestrator
        .handle_turn(session(), "My flight is at 14:00")
        .await
        .unwrap();
    assert_eq!(first.context.flight_time.as_deref(), Some("14:00"));
    assert!(first.context.flight_destination.is_none());

    let second = p
        .orchestrator
        .handle_turn(session(), "It goes to Toronto")
        .await
        .unwrap();
    assert_eq!(second.context.last_topic, Some(Topic::FlightTiming));
    assert_eq!(second.context.flight_time.as_deref(), Some("14:00"));
    assert_eq!(second.context.flight_destination, Some(Destination::UsCanada));
    assert!(p.provider.user_content(1).contains("\"recommendedPickup\": \"10:00\""));
}

#[tokio::test]
async fn greetings_never_create_sessions() {
    let p = pipeline(&[]);
    for greeting in ["Hello", "Hæ", "good morning!"] {
        let outcome = p.orchestrator.handle_turn(session(), greeting).await.unwrap();
        assert_eq!(outcome.context.last_topic, Some(Topic::Greeting));
    }
    assert_eq!(p.store.len().await, 0);
    assert_eq!(p.provider.calls(), 0);
}

#[tokio::test]
async fn expired_session_forgets_itinerary() {
    let p = pipeline(&["Pickup at 10:00."]);
    p.orchestrator
        .handle_turn(session(), "Flight to Canada at 14:00")
        .await
        .unwrap();

    p.clock.advance(Duration::minutes(45));

    let outcome = p
        .orchestrator
        .handle_turn(session(), "what should I do then?")
        .await
        .unwrap();
    assert_eq!(outcome.context, ContextView::default());
    assert_eq!(p.store.purge_expired().await, 0);
    let stored = p.store.get(&SessionId::from("e2e-session")).await.unwrap();
    assert_eq!(stored.timestamp, p.clock.now());
}

#[tokio::test]
async fn hotel_pickup_question_carries_location() {
    let p = pipeline(&["Hotel Borg guests are picked up at bus stop 2."]);
    let outcome = p
        .orchestrator
        .handle_turn(None, "Where is the pickup for Hotel Borg?")
        .await
        .unwrap();

    assert_eq!(outcome.status, TurnStatus::Ok);
    let content = p.provider.user_content(0);
    assert!(content.contains("location_details"));
    assert!(content.contains("Hotel Borg"));
    assert!(content.ends_with("Where is the pickup for Hotel Borg?"));
}
