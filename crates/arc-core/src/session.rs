//! Session memory: per-session chat history and council logs.
//!
//! The [`SessionMemory`] trait is the seam to an external store. The
//! [`InMemorySessionMemory`] implementation keeps everything in process with
//! per-session trimming and LRU eviction to prevent memory exhaustion.

use async_trait::async_trait;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::error::MemoryError;
use crate::events::{DeliberationEvent, DeliberationLog};

/// Default maximum number of sessions to track before LRU eviction.
const DEFAULT_MAX_SESSIONS: usize = 10000;

/// Default maximum number of messages kept per session.
const DEFAULT_MAX_MESSAGES: usize = 50;

/// Author of a session message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }
}

/// A single message in a session's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionMessage {
    pub role: MessageRole,
    pub text: String,
}

impl SessionMessage {
    /// Create a user message.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            text: text.into(),
        }
    }

    /// Create an assistant message.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            text: text.into(),
        }
    }
}

/// Storage for session history and council transcripts.
///
/// Reads and writes are append-style; implementations are expected to be
/// safe for concurrent use. The orchestrator does not add locking of its own.
#[async_trait]
pub trait SessionMemory: Send + Sync {
    /// Append a message to a session's history.
    async fn append_message(
        &self,
        session_id: &str,
        role: MessageRole,
        text: &str,
    ) -> Result<(), MemoryError>;

    /// Up to `limit` most recent messages, oldest first.
    async fn recent_messages(
        &self,
        session_id: &str,
        limit: usize,
    ) -> Result<Vec<SessionMessage>, MemoryError>;

    /// Replace the session's latest council transcript.
    async fn save_deliberation_log(
        &self,
        session_id: &str,
        events: &[DeliberationEvent],
    ) -> Result<(), MemoryError>;

    /// The session's latest council transcript, if any.
    async fn deliberation_log(&self, session_id: &str)
        -> Result<Option<DeliberationLog>, MemoryError>;

    /// The most recently saved transcript across all sessions.
    async fn last_deliberation_log(&self) -> Result<Option<DeliberationLog>, MemoryError>;
}

#[derive(Debug, Default)]
struct SessionState {
    messages: Vec<SessionMessage>,
    log: Option<DeliberationLog>,
}

/// In-process session memory with LRU eviction.
///
/// # Example
///
/// ```rust
/// use arc_core::{InMemorySessionMemory, MessageRole, SessionMemory};
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() {
///     let memory = InMemorySessionMemory::new();
///
///     memory.append_message("s1", MessageRole::User, "Hello").await.unwrap();
///     memory.append_message("s1", MessageRole::Assistant, "Hi!").await.unwrap();
///
///     let recent = memory.recent_messages("s1", 12).await.unwrap();
///     assert_eq!(recent.len(), 2);
/// }
/// ```
#[derive(Debug)]
pub struct InMemorySessionMemory {
    /// Uses IndexMap to maintain insertion order for LRU eviction.
    sessions: RwLock<IndexMap<String, SessionState>>,
    /// Most recently saved transcript; survives eviction of its session.
    last_log: RwLock<Option<DeliberationLog>>,
    max_messages: usize,
    max_sessions: usize,
}

impl Default for InMemorySessionMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemorySessionMemory {
    /// Create a store with default limits.
    pub fn new() -> Self {
        Self::with_limits(DEFAULT_MAX_MESSAGES, DEFAULT_MAX_SESSIONS)
    }

    /// Create a store with custom limits.
    ///
    /// # Arguments
    ///
    /// * `max_messages` - Maximum messages kept per session
    /// * `max_sessions` - Maximum sessions tracked before LRU eviction
    pub fn with_limits(max_messages: usize, max_sessions: usize) -> Self {
        Self {
            sessions: RwLock::new(IndexMap::new()),
            last_log: RwLock::new(None),
            max_messages,
            max_sessions,
        }
    }

    /// Number of tracked sessions.
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Remove the entry for `session_id` and reinsert it at the end,
    /// marking it as recently used. Evicts the oldest sessions when over
    /// the limit.
    fn touch<'a>(
        sessions: &'a mut IndexMap<String, SessionState>,
        session_id: &str,
        max_sessions: usize,
    ) -> &'a mut SessionState {
        let state = sessions.shift_remove(session_id).unwrap_or_default();
        sessions.insert(session_id.to_string(), state);

        while sessions.len() > max_sessions.max(1) {
            sessions.shift_remove_index(0);
        }

        let last = sessions.len() - 1;
        &mut sessions[last]
    }
}

#[async_trait]
impl SessionMemory for InMemorySessionMemory {
    async fn append_message(
        &self,
        session_id: &str,
        role: MessageRole,
        text: &str,
    ) -> Result<(), MemoryError> {
        let mut sessions = self.sessions.write().await;
        let state = Self::touch(&mut sessions, session_id, self.max_sessions);

        state.messages.push(SessionMessage {
            role,
            text: text.to_string(),
        });

        if state.messages.len() > self.max_messages {
            let to_remove = state.messages.len() - self.max_messages;
            state.messages.drain(0..to_remove);
        }

        Ok(())
    }

    async fn recent_messages(
        &self,
        session_id: &str,
        limit: usize,
    ) -> Result<Vec<SessionMessage>, MemoryError> {
        let sessions = self.sessions.read().await;
        let Some(state) = sessions.get(session_id) else {
            return Ok(Vec::new());
        };

        let skip = state.messages.len().saturating_sub(limit);
        Ok(state.messages[skip..].to_vec())
    }

    async fn save_deliberation_log(
        &self,
        session_id: &str,
        events: &[DeliberationEvent],
    ) -> Result<(), MemoryError> {
        let log = DeliberationLog::new(session_id, events.to_vec());
        {
            let mut sessions = self.sessions.write().await;
            let state = Self::touch(&mut sessions, session_id, self.max_sessions);
            state.log = Some(log.clone());
        }

        *self.last_log.write().await = Some(log);
        Ok(())
    }

    async fn deliberation_log(
        &self,
        session_id: &str,
    ) -> Result<Option<DeliberationLog>, MemoryError> {
        let sessions = self.sessions.read().await;
        Ok(sessions.get(session_id).and_then(|s| s.log.clone()))
    }

    async fn last_deliberation_log(&self) -> Result<Option<DeliberationLog>, MemoryError> {
        Ok(self.last_log.read().await.clone())
    }
}
