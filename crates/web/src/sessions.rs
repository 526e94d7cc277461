//! In-memory chat sessions keyed by id, bounded in count and age.

use finagent_core::chat::ChatSession;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use uuid::Uuid;

pub const DEFAULT_MAX_SESSIONS: usize = 1000;
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(60 * 60);

pub type SharedSession = Arc<tokio::sync::Mutex<ChatSession>>;

struct Entry {
    session: SharedSession,
    last_used: Instant,
}

pub struct SessionStore {
    inner: Mutex<HashMap<Uuid, Entry>>,
    max_sessions: usize,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(max_sessions: usize, ttl: Duration) -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
            max_sessions: max_sessions.max(1),
            ttl,
        }
    }

    pub fn from_env() -> Self {
        let max_sessions = std::env::var("CHAT_MAX_SESSIONS")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(DEFAULT_MAX_SESSIONS);
        let ttl = std::env::var("CHAT_SESSION_TTL_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_SESSION_TTL);
        Self::new(max_sessions, ttl)
    }

    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Looks up a live session and marks it used.
    pub fn get(&self, id: Uuid) -> Option<SharedSession> {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let entry = inner.get_mut(&id)?;
        entry.last_used = Instant::now();
        Some(Arc::clone(&entry.session))
    }

    /// Existing session for `id`, or a fresh one from `make`.
    ///
    /// Creating a session first drops expired ones, then the least recently
    /// used while the store is full.
    pub fn get_or_create(
        &self,
        id: Option<Uuid>,
        make: impl FnOnce() -> ChatSession,
    ) -> (Uuid, SharedSession) {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let now = Instant::now();

        if let Some(id) = id {
            if let Some(entry) = inner.get_mut(&id) {
                entry.last_used = now;
                return (id, Arc::clone(&entry.session));
            }
        }

        let before = inner.len();
        inner.retain(|_, e| now.duration_since(e.last_used) < self.ttl);
        while inner.len() >= self.max_sessions {
            let Some(oldest) = inner
                .iter()
                .min_by_key(|(_, e)| e.last_used)
                .map(|(id, _)| *id)
            else {
                break;
            };
            inner.remove(&oldest);
        }
        let dropped = before - inner.len();
        if dropped > 0 {
            tracing::debug!(dropped, remaining = inner.len(), "chat sessions evicted");
        }

        let id = Uuid::new_v4();
        let session = Arc::new(tokio::sync::Mutex::new(make()));
        inner.insert(
            id,
            Entry {
                session: Arc::clone(&session),
                last_used: now,
            },
        );
        tracing::debug!(session = %id, "chat session created");
        (id, session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use finagent_core::api::{ApiClient, MarketApi};

    fn make() -> ChatSession {
        let api: Arc<dyn MarketApi> =
            Arc::new(ApiClient::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap());
        ChatSession::new(api)
    }

    #[test]
    fn known_id_reuses_session() {
        let store = SessionStore::new(10, DEFAULT_SESSION_TTL);
        let (id, first) = store.get_or_create(None, make);
        let (again, second) = store.get_or_create(Some(id), make);
        assert_eq!(id, again);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn unknown_id_gets_a_new_one() {
        let store = SessionStore::new(10, DEFAULT_SESSION_TTL);
        let stale = Uuid::new_v4();
        let (id, _) = store.get_or_create(Some(stale), make);
        assert_ne!(id, stale);
        assert!(store.get(stale).is_none());
    }

    #[test]
    fn full_store_evicts_least_recently_used() {
        let store = SessionStore::new(2, DEFAULT_SESSION_TTL);
        let (a, _) = store.get_or_create(None, make);
        std::thread::sleep(Duration::from_millis(2));
        let (b, _) = store.get_or_create(None, make);
        std::thread::sleep(Duration::from_millis(2));
        // Touch `a` so `b` becomes the oldest.
        assert!(store.get(a).is_some());
        std::thread::sleep(Duration::from_millis(2));

        let (c, _) = store.get_or_create(None, make);
        assert_eq!(store.len(), 2);
        assert!(store.get(a).is_some());
        assert!(store.get(b).is_none());
        assert!(store.get(c).is_some());
    }

    #[test]
    fn expired_sessions_are_dropped_on_create() {
        let store = SessionStore::new(10, Duration::from_millis(10));
        let (old, _) = store.get_or_create(None, make);
        std::thread::sleep(Duration::from_millis(30));
        store.get_or_create(None, make);
        assert_eq!(store.len(), 1);
        assert!(store.get(old).is_none());
    }
}
