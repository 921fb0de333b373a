use crate::core::error::Result;
use crate::core::message::Message;
use crate::core::store::{keys, PersistenceStore};

pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

/// Conversation log, oldest first, capped at `capacity` messages
#[derive(Debug, Clone)]
pub struct ChatHistory {
    messages: Vec<Message>,
    capacity: usize,
}

impl ChatHistory {
    pub fn load<S: PersistenceStore>(store: &S, capacity: usize) -> Result<Self> {
        let messages: Vec<Message> = store.load(keys::CHAT_HISTORY)?.unwrap_or_default();
        let mut history = ChatHistory {
            messages,
            capacity: capacity.max(1),
        };
        history.truncate();
        Ok(history)
    }

    pub fn push<S: PersistenceStore>(&mut self, message: Message, store: &mut S) -> Result<()> {
        self.messages.push(message);
        self.truncate();
        store.save(keys::CHAT_HISTORY, &self.messages)
    }

    /// The last `n` messages, oldest first
    pub fn recent(&self, n: usize) -> &[Message] {
        let start = self.messages.len().saturating_sub(n);
        &self.messages[start..]
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear<S: PersistenceStore>(&mut self, store: &mut S) -> Result<()> {
        self.messages.clear();
        store.remove(keys::CHAT_HISTORY)
    }

    fn truncate(&mut self) {
        if self.messages.len() > self.capacity {
            let overflow = self.messages.len() - self.capacity;
            self.messages.drain(..overflow);
        }
    }
}
