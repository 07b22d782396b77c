//! In-memory association between conversation fingerprints and backend
//! sessions.
//!
//! The store is a memoized lookup, not a cache: entries live for the
//! process lifetime, there is no eviction or TTL, and a restart forgets
//! everything. Capacity is bounded only by the number of distinct system
//! prompts seen.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::SystemTime;

use tokio::sync::RwLock;

use crate::models::backend::SessionStart;
use crate::prompt::LessonConfig;

/// Greeting used when the backend's start reply carries none.
pub const DEFAULT_GREETING: &str = "Hello! I'm your AI teacher.";

/// One resolved backend session and the configuration it was created with.
#[derive(Debug, Clone)]
pub struct SessionRecord {
    pub session_id: String,
    pub config: LessonConfig,
    pub created_at: SystemTime,
    /// The backend's opening line, replayed as the answer to the first
    /// request of a conversation.
    pub greeting: String,
}

impl SessionRecord {
    pub fn from_start(config: LessonConfig, start: SessionStart) -> Self {
        Self {
            session_id: start.session_id,
            config,
            created_at: SystemTime::now(),
            greeting: start
                .initial_message
                .unwrap_or_else(|| DEFAULT_GREETING.to_string()),
        }
    }
}

/// Keyed store of session records, shared across request handlers.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<String, SessionRecord>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, fingerprint: &str) -> Option<SessionRecord> {
        self.inner.read().await.get(fingerprint).cloned()
    }

    /// Store a record unless the fingerprint is already mapped, and return
    /// whichever record ends up stored. Concurrent first requests for the
    /// same fingerprint may both reach the backend, but only one session id
    /// is ever kept, so the fingerprint-to-session mapping stays
    /// single-valued.
    pub async fn insert_or_keep(
        &self,
        fingerprint: String,
        record: SessionRecord,
    ) -> SessionRecord {
        let mut map = self.inner.write().await;
        map.entry(fingerprint).or_insert(record).clone()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }
}
