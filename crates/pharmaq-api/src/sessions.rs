//! Process-local session store.
//!
//! Sessions are keyed by id and created on first access. A session idle
//! longer than the configured timeout is discarded and replaced by an empty
//! one. The lock is never held across a model call: handlers claim work under
//! the lock, release it, and re-enter to record the result.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{Duration, Utc};
use thiserror::Error;
use uuid::Uuid;

use pharmaq_core::session::{Session, SessionSnapshot};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("session lock poisoned: {0}")]
    Poisoned(String),
}

pub struct SessionStore {
    sessions: Mutex<HashMap<Uuid, Session>>,
    idle_timeout: Duration,
}

impl SessionStore {
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            idle_timeout,
        }
    }

    pub fn from_minutes(minutes: u64) -> Self {
        let minutes = i64::try_from(minutes).unwrap_or(i64::MAX / 60_000);
        Self::new(Duration::minutes(minutes))
    }

    /// Start a new empty session.
    pub fn create(&self) -> Result<SessionSnapshot, StoreError> {
        let session = Session::new();
        let snapshot = session.snapshot();
        self.lock()?.insert(session.id(), session);
        tracing::info!(session_id = %snapshot.id, "Session started");
        Ok(snapshot)
    }

    /// Run `f` against session `id`, creating it (or replacing an expired one)
    /// first. Every call counts as activity.
    pub fn with_session<R>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut Session) -> R,
    ) -> Result<R, StoreError> {
        let mut sessions = self.lock()?;
        let now = Utc::now();

        let expired = sessions
            .get(&id)
            .is_some_and(|s| s.is_idle(self.idle_timeout, now));
        if expired {
            sessions.remove(&id);
            tracing::info!(session_id = %id, "Session expired after inactivity");
        }

        let session = sessions.entry(id).or_insert_with(|| {
            tracing::debug!(session_id = %id, "Session created on first access");
            Session::with_id(id)
        });
        session.touch();
        Ok(f(session))
    }

    pub fn snapshot(&self, id: Uuid) -> Result<SessionSnapshot, StoreError> {
        self.with_session(id, |s| s.snapshot())
    }

    /// Drop idle sessions and return how many remain.
    pub fn active_count(&self) -> Result<usize, StoreError> {
        let mut sessions = self.lock()?;
        let now = Utc::now();
        let timeout = self.idle_timeout;
        sessions.retain(|_, s| !s.is_idle(timeout, now));
        Ok(sessions.len())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<Uuid, Session>>, StoreError> {
        self.sessions
            .lock()
            .map_err(|e| StoreError::Poisoned(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pharmaq_core::types::ChatMessage;

    #[test]
    fn test_create_and_reuse() {
        let store = SessionStore::from_minutes(120);
        let snap = store.create().unwrap();
        store
            .with_session(snap.id, |s| s.begin_turn(ChatMessage::user("Hello")))
            .unwrap();
        let again = store.snapshot(snap.id).unwrap();
        assert_eq!(again.transcript.len(), 1);
        assert_eq!(store.active_count().unwrap(), 1);
    }

    #[test]
    fn test_unknown_id_creates_empty_session() {
        let store = SessionStore::from_minutes(120);
        let id = Uuid::new_v4();
        let snap = store.snapshot(id).unwrap();
        assert_eq!(snap.id, id);
        assert!(snap.transcript.is_empty());
        assert_eq!(snap.available.len(), 5);
    }

    #[test]
    fn test_sessions_are_isolated() {
        let store = SessionStore::from_minutes(120);
        let a = store.create().unwrap().id;
        let b = store.create().unwrap().id;
        store
            .with_session(a, |s| s.claim("ASCO (American Society of Clinical Oncology)"))
            .unwrap();
        assert_eq!(store.snapshot(a).unwrap().available.len(), 4);
        assert_eq!(store.snapshot(b).unwrap().available.len(), 5);
    }

    #[test]
    fn test_idle_session_is_replaced() {
        let store = SessionStore::new(Duration::zero());
        let id = store.create().unwrap().id;
        store
            .with_session(id, |s| s.begin_turn(ChatMessage::user("Hello")))
            .unwrap();
        std::thread::sleep(std::time::Duration::from_millis(5));
        let snap = store.snapshot(id).unwrap();
        assert_eq!(snap.id, id);
        assert!(snap.transcript.is_empty());
    }

    #[test]
    fn test_active_count_drops_idle() {
        let store = SessionStore::new(Duration::zero());
        store.create().unwrap();
        std::thread::sleep(std::time::Duration::from_millis(5));
        assert_eq!(store.active_count().unwrap(), 0);
    }
}
