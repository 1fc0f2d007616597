use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc;

use crate::platform::{Destination, UserId};

/// One open conversation per user per place (a channel, or the user's DMs).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConversationKey {
    pub user: UserId,
    pub place: Destination,
}

impl ConversationKey {
    pub fn new(user: UserId, place: Destination) -> Self {
        Self { user, place }
    }

    pub fn direct(user: UserId) -> Self {
        Self::new(user, Destination::Direct(user))
    }
}

struct Entry {
    generation: u64,
    tx: mpsc::UnboundedSender<String>,
}

/// Routes replies to the flow waiting for them.
#[derive(Clone, Default)]
pub struct Conversations {
    open: Arc<Mutex<HashMap<ConversationKey, Entry>>>,
    generation: Arc<AtomicU64>,
}

impl Conversations {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<ConversationKey, Entry>> {
        self.open.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a flow for `key`. `None` if one is already open there.
    pub fn open(&self, key: ConversationKey) -> Option<Inbox> {
        let mut open = self.lock();
        if open.contains_key(&key) {
            return None;
        }
        let generation = self.generation.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::unbounded_channel();
        open.insert(key, Entry { generation, tx });
        Some(Inbox {
            key,
            generation,
            rx,
            registry: self.clone(),
        })
    }

    pub fn is_open(&self, key: &ConversationKey) -> bool {
        self.lock().contains_key(key)
    }

    /// Hand `content` to the flow open for `key`. False if there is none, in
    /// which case the message should be treated as a command.
    pub fn deliver(&self, key: &ConversationKey, content: &str) -> bool {
        match self.lock().get(key) {
            Some(entry) => entry.tx.send(content.to_string()).is_ok(),
            None => false,
        }
    }

    fn close(&self, key: &ConversationKey, generation: u64) {
        let mut open = self.lock();
        if open.get(key).is_some_and(|e| e.generation == generation) {
            open.remove(key);
        }
    }
}

/// Receiving end of an open conversation. Dropping it closes the
/// conversation.
pub struct Inbox {
    key: ConversationKey,
    generation: u64,
    rx: mpsc::UnboundedReceiver<String>,
    registry: Conversations,
}

impl Inbox {
    pub fn key(&self) -> ConversationKey {
        self.key
    }

    pub async fn recv(&mut self) -> Option<String> {
        self.rx.recv().await
    }
}

impl Drop for Inbox {
    fn drop(&mut self) {
        self.registry.close(&self.key, self.generation);
    }
}
