//! Session storage.
//!
//! Sessions live only in memory; a restart logs everyone out.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use fnicon_core::Session;
use tokio::sync::RwLock;

/// Result of [`SessionStore::touch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Touch {
    /// The session was live; this is its new state.
    Refreshed(Session),
    /// The session had expired and was removed.
    Expired,
    /// No session with this id.
    Missing,
}

/// Storage for logged-in sessions.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Returns the session with `id`, expired or not.
    async fn get(&self, id: &str) -> Option<Session>;

    /// Inserts or replaces a session.
    async fn put(&self, session: Session);

    /// Checks the session with `id` and, if live at `now`, extends it to
    /// `now + ttl`. An expired session is removed instead.
    ///
    /// The check and the write happen atomically, so a concurrent
    /// [`delete`](Self::delete) is never undone.
    async fn touch(&self, id: &str, now: DateTime<Utc>, ttl: Duration) -> Touch;

    /// Removes a session. Returns true if it existed.
    async fn delete(&self, id: &str) -> bool;

    /// Removes every session expired at `now`. Returns how many were removed.
    async fn sweep(&self, now: DateTime<Utc>) -> usize;
}

/// [`SessionStore`] backed by a `HashMap` behind an async `RwLock`.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, Session>>,
}

impl InMemorySessionStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored sessions, expired ones included.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Returns true if no sessions are stored.
    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, id: &str) -> Option<Session> {
        self.sessions.read().await.get(id).cloned()
    }

    async fn put(&self, session: Session) {
        self.sessions
            .write()
            .await
            .insert(session.id.clone(), session);
    }

    async fn touch(&self, id: &str, now: DateTime<Utc>, ttl: Duration) -> Touch {
        let mut sessions = self.sessions.write().await;
        match sessions.entry(id.to_string()) {
            Entry::Vacant(_) => Touch::Missing,
            Entry::Occupied(entry) if entry.get().is_expired(now) => {
                entry.remove();
                Touch::Expired
            }
            Entry::Occupied(mut entry) => {
                let session = entry.get_mut();
                session.refresh(now, ttl);
                Touch::Refreshed(session.clone())
            }
        }
    }

    async fn delete(&self, id: &str) -> bool {
        self.sessions.write().await.remove(id).is_some()
    }

    async fn sweep(&self, now: DateTime<Utc>) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_expired(now));
        before - sessions.len()
    }
}
