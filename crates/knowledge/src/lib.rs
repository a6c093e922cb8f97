//! Knowledge collaborators for shuttlechat.
//!
//! `StaticKnowledgeBase` serves the read-only service corpus: topic facts,
//! flight-timing guidance per destination region, and the pickup-location
//! directory. It implements both `KnowledgeLookup` and `LocationSearch`
//! and is shared across all turns without synchronization.

pub mod corpus;
pub mod lookup;
pub mod timing;

pub use corpus::{KnowledgeCorpus, RegionEntry, TopicEntry, FLIGHT_TIMING_TOPIC};
pub use lookup::StaticKnowledgeBase;
