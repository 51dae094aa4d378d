//! Conversation state storage, keyed by thread id.

use std::collections::HashMap;

use parking_lot::Mutex;

use crate::conversation::Conversation;

/// Identifies which conversation thread a turn belongs to.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RunConfig {
    thread_id: String,
}

impl RunConfig {
    /// Creates a config routing turns to `thread_id`.
    #[inline]
    pub fn with_thread_id<S: Into<String>>(thread_id: S) -> Self {
        Self {
            thread_id: thread_id.into(),
        }
    }

    /// Returns the thread id.
    #[inline]
    pub fn thread_id(&self) -> &str {
        &self.thread_id
    }
}

/// Stores conversation threads between turns.
///
/// The agent loads the thread when a turn starts and saves it after every
/// step of the turn, so an aborted turn keeps what it did so far.
pub trait Checkpointer: Send + Sync + 'static {
    /// Returns the saved thread, if any.
    fn load(&self, thread_id: &str) -> Option<Conversation>;

    /// Replaces the saved thread.
    fn save(&self, thread_id: &str, conversation: &Conversation);
}

/// A checkpointer that keeps threads in memory for the process lifetime.
#[derive(Default)]
pub struct MemoryCheckpointer {
    threads: Mutex<HashMap<String, Conversation>>,
}

impl MemoryCheckpointer {
    /// Creates an empty checkpointer.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Checkpointer for MemoryCheckpointer {
    fn load(&self, thread_id: &str) -> Option<Conversation> {
        self.threads.lock().get(thread_id).cloned()
    }

    fn save(&self, thread_id: &str, conversation: &Conversation) {
        self.threads
            .lock()
            .insert(thread_id.to_owned(), conversation.clone());
    }
}
