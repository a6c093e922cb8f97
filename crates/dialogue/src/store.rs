//! Session context store: TTL-bounded, single-process.
//!
//! Concurrent turns on one session race on read-modify-write: the last
//! `put` wins. There is no compare-and-swap.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use shuttlechat_core::clock::Clock;
use shuttlechat_core::context::{SessionContext, SessionId};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Keyed storage of per-session context.
#[async_trait]
pub trait ContextStore: Send + Sync {
    /// The stored context, or `None` when absent or older than the TTL.
    async fn get(&self, session_id: &SessionId) -> Option<SessionContext>;

    /// Store the full context, replacing any previous entry.
    async fn put(&self, session_id: SessionId, context: SessionContext);

    /// Number of physically stored entries, expired ones included.
    async fn len(&self) -> usize;

    /// Physically drop expired entries; returns how many were removed.
    async fn purge_expired(&self) -> usize;
}

struct StoredContext {
    context: SessionContext,
    written_at: DateTime<Utc>,
}

/// In-process context store with lazy TTL expiry.
pub struct InMemoryContextStore {
    entries: Arc<RwLock<HashMap<SessionId, StoredContext>>>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl InMemoryContextStore {
    pub fn new(clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            clock,
            ttl,
        }
    }

    /// Build from a TTL in seconds, as configured.
    pub fn with_ttl_secs(clock: Arc<dyn Clock>, ttl_secs: u64) -> Self {
        let secs = i64::try_from(ttl_secs).unwrap_or(i64::MAX);
        Self::new(clock, Duration::try_seconds(secs).unwrap_or(Duration::MAX))
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn is_expired(&self, written_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(written_at) > self.ttl
    }
}

#[async_trait]
impl ContextStore for InMemoryContextStore {
    async fn get(&self, session_id: &SessionId) -> Option<SessionContext> {
        let now = self.clock.now();
        let entries = self.entries.read().await;
        let stored = entries.get(session_id)?;

        if self.is_expired(stored.written_at, now) {
            debug!(session_id = %session_id, "Stored context expired");
            return None;
        }
        Some(stored.context.clone())
    }

    async fn put(&self, session_id: SessionId, context: SessionContext) {
        let written_at = self.clock.now();
        self.entries
            .write()
            .await
            .insert(session_id, StoredContext { context, written_at });
    }

    async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    async fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, stored| !self.is_expired(stored.written_at, now));
        before - entries.len()
    }
}
