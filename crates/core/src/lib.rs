//! # shuttlechat core
//!
//! Domain types, collaborator traits, and error definitions for the
//! shuttlechat dialogue engine. This crate has **no framework dependencies**:
//! it defines the model that the knowledge, dialogue, provider, and gateway
//! crates implement against.
//!
//! ## Design Philosophy
//!
//! Every external collaborator (text generation, knowledge lookup, location
//! search, broadcast, clock, language detection) is a trait here. Concrete
//! implementations live in their own crates, which keeps the dialogue engine
//! testable with small in-test fakes.

pub mod clock;
pub mod context;
pub mod error;
pub mod event;
pub mod knowledge;
pub mod language;
pub mod message;
pub mod provider;
pub mod text;

// Re-export key types at crate root for ergonomics
pub use clock::{Clock, ManualClock, SystemClock};
pub use context::{ContextFeedback, ContextView, Destination, SessionContext, SessionId, Topic};
pub use error::{Error, Result};
pub use event::{Broadcaster, ConversationEvent, EventBus};
pub use knowledge::{KnowledgeItem, KnowledgeLookup, KnowledgeResult, Location, LocationSearch, LocationSearchResult};
pub use language::{FixedLanguageDetector, Language, LanguageDetector};
pub use message::{Message, Role};
pub use provider::{Provider, ProviderRequest, ProviderResponse};
