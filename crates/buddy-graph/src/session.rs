//! Per-thread conversation state storage

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::state::ConversationState;

/// Shared handle to one thread's state.
///
/// The async mutex serializes turns on the same thread; turns on different
/// threads never contend.
pub type SessionHandle = Arc<tokio::sync::Mutex<ConversationState>>;

/// Thread-id keyed store of conversation states
#[derive(Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<String, SessionHandle>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle for the thread, created empty on first use.
    ///
    /// Repeated calls with the same id return the same handle until the
    /// thread is reset.
    pub fn get_or_create(&self, thread_id: &str) -> SessionHandle {
        self.sessions
            .lock()
            .entry(thread_id.to_string())
            .or_default()
            .clone()
    }

    /// Handle for the thread, if it exists
    pub fn get(&self, thread_id: &str) -> Option<SessionHandle> {
        self.sessions.lock().get(thread_id).cloned()
    }

    /// Replace the thread's state with a fresh one.
    ///
    /// Installs a new handle; anyone still holding the old one keeps the
    /// old snapshot and no longer observes this thread.
    pub fn reset(&self, thread_id: &str) {
        self.sessions
            .lock()
            .insert(thread_id.to_string(), SessionHandle::default());
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use buddy_ai::Message;

    #[tokio::test]
    async fn test_get_or_create_returns_stable_handle() {
        let store = SessionStore::new();
        let first = store.get_or_create("t1");
        let second = store.get_or_create("t1");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_threads_are_isolated() {
        let store = SessionStore::new();
        let t1 = store.get_or_create("t1");
        let t2 = store.get_or_create("t2");
        assert!(!Arc::ptr_eq(&t1, &t2));

        t1.lock().await.push_message(Message::user("laptop"));
        assert!(t2.lock().await.messages.is_empty());
    }

    #[tokio::test]
    async fn test_reset_installs_fresh_state() {
        let store = SessionStore::new();
        let old = store.get_or_create("t1");
        old.lock().await.push_message(Message::user("laptop"));

        store.reset("t1");
        let fresh = store.get_or_create("t1");
        assert!(!Arc::ptr_eq(&old, &fresh));
        assert!(fresh.lock().await.messages.is_empty());

        // the old handle still sees the pre-reset snapshot
        assert_eq!(old.lock().await.messages.len(), 1);
    }

    #[test]
    fn test_get_missing_thread() {
        let store = SessionStore::new();
        assert!(store.get("nope").is_none());
        assert!(store.is_empty());
    }
}
