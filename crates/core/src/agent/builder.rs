use std::sync::Arc;

use chain_agent_model::ModelProvider;

use super::{Agent, AgentInner, DEFAULT_MAX_STEPS};
use crate::checkpoint::{Checkpointer, MemoryCheckpointer};
use crate::model_client::ModelClient;
use crate::tool::{DynTool, RegistryError, ToolRegistry};

/// [`Agent`] builder.
pub struct AgentBuilder {
    model_client: ModelClient,
    tools: Vec<DynTool>,
    system_prompt: Option<String>,
    checkpointer: Option<Arc<dyn Checkpointer>>,
    max_steps: usize,
}

impl AgentBuilder {
    /// Creates a new builder with the specified model provider.
    #[inline]
    pub fn with_model_provider<P: ModelProvider + 'static>(
        provider: P,
    ) -> Self {
        Self {
            model_client: ModelClient::new(provider),
            tools: vec![],
            system_prompt: None,
            checkpointer: None,
            max_steps: DEFAULT_MAX_STEPS,
        }
    }

    /// Sets the system instructions sent ahead of every request.
    #[inline]
    pub fn with_system_prompt<S: Into<String>>(mut self, prompt: S) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Registers a tool.
    #[inline]
    pub fn with_tool<T: Into<DynTool>>(mut self, tool: T) -> Self {
        self.tools.push(tool.into());
        self
    }

    /// Registers tools, keeping their order.
    #[inline]
    pub fn with_tools<I: IntoIterator<Item = DynTool>>(mut self, tools: I) -> Self {
        self.tools.extend(tools);
        self
    }

    /// Sets where conversation threads are stored. Defaults to a fresh
    /// [`MemoryCheckpointer`].
    #[inline]
    pub fn with_checkpointer(
        mut self,
        checkpointer: Arc<dyn Checkpointer>,
    ) -> Self {
        self.checkpointer = Some(checkpointer);
        self
    }

    /// Bounds the number of model steps in one turn.
    #[inline]
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps.max(1);
        self
    }

    /// Builds the agent. Fails if two tools share a name.
    pub fn build(self) -> Result<Agent, RegistryError> {
        let tools = ToolRegistry::from_tools(self.tools)?;
        debug!("building agent with tools: {:?}", tools.names());
        let inner = AgentInner {
            model_client: self.model_client,
            tools,
            system_prompt: self.system_prompt,
            checkpointer: self
                .checkpointer
                .unwrap_or_else(|| Arc::new(MemoryCheckpointer::new())),
            max_steps: self.max_steps,
        };
        Ok(Agent {
            inner: Arc::new(inner),
        })
    }
}
