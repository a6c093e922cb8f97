//! # shuttlechat dialogue
//!
//! The dialogue context engine. Each turn flows through:
//!
//! 1. [`extractor`] pulls a flight time and destination region out of the text
//! 2. [`classifier`] decides whether the turn is a greeting, an
//!    acknowledgment, or part of the flight-timing conversation
//! 3. [`store`] supplies the session's prior context (TTL-bounded)
//! 4. [`merge`] folds prior context, extracted entities and knowledge
//!    feedback into the next snapshot
//! 5. [`orchestrator`] picks the reply path and calls the collaborators

pub mod classifier;
pub mod extractor;
pub mod merge;
pub mod orchestrator;
pub mod prompt;
pub mod responses;
pub mod store;

pub use classifier::{Classification, TopicClassifier};
pub use extractor::{ExtractedEntities, extract};
pub use merge::{TurnSignals, merge};
pub use orchestrator::{DialogueOrchestrator, TurnOutcome, TurnStatus};
pub use store::{ContextStore, InMemoryContextStore};
