mod builder;
mod stream;
#[cfg(test)]
mod tests;

use std::sync::Arc;

use crate::checkpoint::{Checkpointer, RunConfig};
use crate::conversation::Turn;
use crate::model_client::ModelClient;
use crate::tool::ToolRegistry;
pub use builder::AgentBuilder;
pub use stream::{AgentMessage, AgentUpdate, ToolMessage, TurnStream};

/// Default bound on model steps per turn.
pub const DEFAULT_MAX_STEPS: usize = 25;

pub(crate) struct AgentInner {
    model_client: ModelClient,
    tools: ToolRegistry,
    system_prompt: Option<String>,
    checkpointer: Arc<dyn Checkpointer>,
    max_steps: usize,
}

/// A reasoning-and-acting agent.
///
/// For every user input the agent asks the model for a reply. When the reply
/// requests tools, the agent runs them, appends their results and asks the
/// model again, until the model answers without tool calls. Each of these
/// steps is reported as an [`AgentUpdate`] through a [`TurnStream`].
///
/// Conversation history lives in the [`Checkpointer`], keyed by the thread id
/// of the [`RunConfig`] passed with each input.
#[derive(Clone)]
pub struct Agent {
    inner: Arc<AgentInner>,
}

impl Agent {
    /// Submits `input` as a new user turn and returns the stream of updates
    /// for this turn.
    ///
    /// Nothing is sent to the model until the stream is polled.
    pub fn stream<S: Into<String>>(
        &self,
        input: S,
        config: &RunConfig,
    ) -> TurnStream {
        TurnStream::new(Arc::clone(&self.inner), input.into(), config)
    }

    /// Returns the tools available to the model.
    #[inline]
    pub fn tools(&self) -> &ToolRegistry {
        &self.inner.tools
    }

    /// Returns the system instructions, if any.
    #[inline]
    pub fn system_prompt(&self) -> Option<&str> {
        self.inner.system_prompt.as_deref()
    }

    /// Returns the saved history of a thread.
    pub fn history(&self, config: &RunConfig) -> Vec<Turn> {
        self.inner
            .checkpointer
            .load(config.thread_id())
            .map(|conversation| conversation.turns())
            .unwrap_or_default()
    }
}
