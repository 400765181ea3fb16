use std::collections::HashMap;
use std::sync::{Arc, LockResult, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::diagnosis::{DiagnosisSession, DiagnosticTest};

/// Identifier of the chat (user) a session belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChatId(pub String);

impl From<&str> for ChatId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl std::fmt::Display for ChatId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

pub type SessionHandle = Arc<Mutex<DiagnosisSession>>;

/// Active sessions keyed by chat.
///
/// The map lock is held only long enough to insert, remove, or clone a
/// handle; each session has its own lock so that messages from one chat are
/// processed one at a time while other chats proceed independently.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: Mutex<HashMap<ChatId, Entry>>,
}

#[derive(Debug)]
struct Entry {
    handle: SessionHandle,
    started_at: DateTime<Utc>,
}

fn relock<T>(result: LockResult<MutexGuard<'_, T>>) -> MutexGuard<'_, T> {
    result.unwrap_or_else(PoisonError::into_inner)
}

/// Locks a session handle, recovering the state if a previous holder panicked.
pub fn lock_session(handle: &SessionHandle) -> MutexGuard<'_, DiagnosisSession> {
    relock(handle.lock())
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a session, discarding any previous one for the chat.
    pub fn start(&self, chat: ChatId, test: Arc<DiagnosticTest>) -> SessionHandle {
        let session = DiagnosisSession::new(test);
        let started_at = session.started_at();
        let handle = Arc::new(Mutex::new(session));
        relock(self.sessions.lock()).insert(
            chat,
            Entry {
                handle: handle.clone(),
                started_at,
            },
        );
        handle
    }

    pub fn get(&self, chat: &ChatId) -> Option<SessionHandle> {
        relock(self.sessions.lock())
            .get(chat)
            .map(|entry| entry.handle.clone())
    }

    /// Runs `f` with exclusive access to the chat's session.
    #[cfg(test)]
    pub(crate) fn with_session<T>(
        &self,
        chat: &ChatId,
        f: impl FnOnce(&mut DiagnosisSession) -> T,
    ) -> Option<T> {
        let handle = self.get(chat)?;
        let mut session = lock_session(&handle);
        Some(f(&mut *session))
    }

    pub fn remove(&self, chat: &ChatId) -> bool {
        relock(self.sessions.lock()).remove(chat).is_some()
    }

    /// Removes the chat's entry only if it still refers to `handle`, so a
    /// session started concurrently is left alone.
    pub fn remove_if_same(&self, chat: &ChatId, handle: &SessionHandle) -> bool {
        let mut sessions = relock(self.sessions.lock());
        match sessions.get(chat) {
            Some(current) if Arc::ptr_eq(&current.handle, handle) => {
                sessions.remove(chat);
                true
            }
            _ => false,
        }
    }

    /// Whether the chat's entry still refers to `handle`.
    pub fn is_current(&self, chat: &ChatId, handle: &SessionHandle) -> bool {
        relock(self.sessions.lock())
            .get(chat)
            .is_some_and(|entry| Arc::ptr_eq(&entry.handle, handle))
    }

    pub fn contains(&self, chat: &ChatId) -> bool {
        relock(self.sessions.lock()).contains_key(chat)
    }

    pub fn len(&self) -> usize {
        relock(self.sessions.lock()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops sessions started before `now - max_age`, returning how many.
    pub fn purge_older_than(&self, max_age: Duration, now: DateTime<Utc>) -> usize {
        let cutoff = now - max_age;
        let mut sessions = relock(self.sessions.lock());
        let before = sessions.len();
        sessions.retain(|_, entry| entry.started_at >= cutoff);
        before - sessions.len()
    }
}
