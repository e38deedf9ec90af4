// src/memory.rs
use std::{fmt, sync::Arc};

use uuid::Uuid;

use crate::message::Message;

/// Opaque token distinguishing one reset-to-reset span of a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConversationId(Uuid);

impl ConversationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// First block of the UUID, enough to tell conversations apart on screen.
    pub fn short(&self) -> String {
        self.0.simple().to_string()[..8].to_string()
    }
}

impl Default for ConversationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Overflow {
    #[default]
    DropOldest,
}

/// Optional bound on how many messages a conversation keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryLimit {
    pub max_messages: usize,
    pub on_overflow: Overflow,
}

impl MemoryLimit {
    pub fn drop_oldest(max_messages: usize) -> Self {
        Self {
            max_messages,
            on_overflow: Overflow::DropOldest,
        }
    }
}

/// Ordered, append-only log of the messages exchanged in one conversation.
///
/// Snapshots share the underlying vector. Appends clone it first if a snapshot
/// is still alive, and `reset` swaps in a fresh one, so a snapshot handed to an
/// in-flight request never changes under it.
#[derive(Debug, Clone)]
pub struct ConversationMemory {
    id: ConversationId,
    messages: Arc<Vec<Message>>,
    limit: Option<MemoryLimit>,
}

impl Default for ConversationMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationMemory {
    pub fn new() -> Self {
        Self {
            id: ConversationId::new(),
            messages: Arc::new(Vec::new()),
            limit: None,
        }
    }

    pub fn with_limit(limit: Option<MemoryLimit>) -> Self {
        Self {
            limit,
            ..Self::new()
        }
    }

    pub fn id(&self) -> ConversationId {
        self.id
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn append(&mut self, message: Message) {
        let messages = Arc::make_mut(&mut self.messages);
        messages.push(message);

        if let Some(limit) = self.limit {
            if messages.len() > limit.max_messages {
                match limit.on_overflow {
                    Overflow::DropOldest => {
                        let excess = messages.len() - limit.max_messages;
                        messages.drain(..excess);
                        log::debug!("Evicted {excess} oldest message(s) from {}", self.id);
                    }
                }
            }
        }
    }

    pub fn snapshot(&self) -> Arc<Vec<Message>> {
        Arc::clone(&self.messages)
    }

    pub fn reset(&mut self) -> ConversationId {
        let previous = self.id;
        self.messages = Arc::new(Vec::new());
        self.id = ConversationId::new();
        log::info!("Conversation {previous} reset, new conversation {}", self.id);
        self.id
    }
}
