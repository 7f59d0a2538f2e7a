//! Session accumulator
//!
//! [`SessionStore`] owns one [`Transcript`] per (user, topic). It is built
//! once per process and shared by handle. Each transcript sits behind its
//! own async mutex, so unrelated sessions never contend and writers on the
//! same session are served in arrival order (tokio's mutex is FIFO).

use std::collections::HashMap;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

use crate::debate::{Message, Sender, SessionKey, Transcript};

/// Process-lifetime map from session key to transcript
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<SessionKey, Arc<Mutex<Transcript>>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn transcript(&self, key: &SessionKey) -> Arc<Mutex<Transcript>> {
        if let Some(existing) = self.sessions.read().await.get(key) {
            return existing.clone();
        }
        self.sessions
            .write()
            .await
            .entry(key.clone())
            .or_default()
            .clone()
    }

    /// Take exclusive access to a session for a whole exchange.
    ///
    /// The transcript is created on first use. Other writers to the same key
    /// wait until the guard is dropped.
    pub async fn lock(&self, key: &SessionKey) -> SessionGuard {
        let transcript = self.transcript(key).await;
        SessionGuard {
            key: key.clone(),
            inner: transcript.lock_owned().await,
        }
    }

    /// Append one message and return it with its assigned sequence number
    pub async fn append(&self, key: &SessionKey, sender: Sender, text: impl Into<String>) -> Message {
        let mut guard = self.lock(key).await;
        guard.push(sender, text).clone()
    }

    /// Full transcript for a key, oldest first. Unknown keys are empty.
    pub async fn history(&self, key: &SessionKey) -> Vec<Message> {
        let transcript = self.sessions.read().await.get(key).cloned();
        match transcript {
            Some(t) => t.lock().await.messages().to_vec(),
            None => Vec::new(),
        }
    }

    /// Number of live sessions
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

/// Exclusive handle on one transcript
#[derive(Debug)]
pub struct SessionGuard {
    key: SessionKey,
    inner: OwnedMutexGuard<Transcript>,
}

impl SessionGuard {
    pub fn key(&self) -> &SessionKey {
        &self.key
    }
}

impl Deref for SessionGuard {
    type Target = Transcript;

    fn deref(&self) -> &Transcript {
        &self.inner
    }
}

impl DerefMut for SessionGuard {
    fn deref_mut(&mut self) -> &mut Transcript {
        &mut self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sequential_appends_keep_order() {
        let store = SessionStore::new();
        let key = SessionKey::new("alice", "School uniforms");

        for i in 0..5 {
            store.append(&key, Sender::User, format!("msg {}", i)).await;
        }

        let history = store.history(&key).await;
        assert_eq!(history.len(), 5);
        for (i, message) in history.iter().enumerate() {
            assert_eq!(message.text, format!("msg {}", i));
            assert_eq!(message.sequence_number, i as u32 + 1);
        }
    }

    #[tokio::test]
    async fn test_unknown_key_is_empty() {
        let store = SessionStore::new();
        assert!(store.history(&SessionKey::new("nobody", "nothing")).await.is_empty());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_concurrent_keys_do_not_interleave() {
        let store = Arc::new(SessionStore::new());
        let key_a = SessionKey::new("alice", "topic");
        let key_b = SessionKey::new("bob", "topic");

        let mut handles = Vec::new();
        for i in 0..20 {
            for (key, label) in [(key_a.clone(), "a"), (key_b.clone(), "b")] {
                let store = store.clone();
                handles.push(tokio::spawn(async move {
                    store.append(&key, Sender::User, format!("{}-{}", label, i)).await;
                }));
            }
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let history_a = store.history(&key_a).await;
        let history_b = store.history(&key_b).await;
        assert_eq!(history_a.len(), 20);
        assert_eq!(history_b.len(), 20);
        assert!(history_a.iter().all(|m| m.text.starts_with("a-")));
        assert!(history_b.iter().all(|m| m.text.starts_with("b-")));
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_guard_holds_exchange_together() {
        let store = Arc::new(SessionStore::new());
        let key = SessionKey::new("carol", "topic");

        let mut guard = store.lock(&key).await;
        let writer = {
            let store = store.clone();
            let key = key.clone();
            tokio::spawn(async move {
                store.append(&key, Sender::User, "second exchange").await;
            })
        };
        tokio::task::yield_now().await;
        guard.push(Sender::User, "question");
        guard.push(Sender::Ai, "answer");
        drop(guard);
        writer.await.unwrap();

        let texts: Vec<String> = store.history(&key).await.into_iter().map(|m| m.text).collect();
        assert_eq!(texts, vec!["question", "answer", "second exchange"]);
    }
}
