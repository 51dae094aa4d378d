use std::mem;
use std::sync::Arc;

use chain_agent_model::{
    ModelMessage, ModelRequest, ToolCallRequest, ToolCallResult,
};
use tracing::{Instrument, Span};

use super::AgentInner;
use crate::AgentError;
use crate::checkpoint::RunConfig;
use crate::conversation::Conversation;

/// A reply written by the model.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AgentMessage {
    /// The text of the reply, empty when the model only called tools.
    pub content: String,
    /// Tools the model asked for; they run in the next step.
    pub tool_calls: Vec<ToolCallRequest>,
}

/// The output of one tool call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToolMessage {
    /// The id of the tool call this answers.
    pub tool_call_id: String,
    /// The tool name.
    pub name: String,
    /// The output handed back to the model.
    pub content: String,
    /// Whether the tool failed; `content` then describes the failure.
    pub is_error: bool,
}

/// One step of a turn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AgentUpdate {
    /// The model replied.
    Agent(AgentMessage),
    /// The tools requested by the previous reply ran.
    Tools(Vec<ToolMessage>),
}

#[derive(Default)]
enum TurnStage {
    ModelThinking,
    RunningTools(Vec<ToolCallRequest>),
    #[default]
    Done,
}

/// The ordered updates of one turn.
///
/// Every call to [`TurnStream::next`] performs exactly one step (a model
/// request or a round of tool calls) and returns its update. The stream ends
/// with `None` after the model answers without tool calls, or right after an
/// error. A finished stream cannot be resumed; submit a new turn instead.
pub struct TurnStream {
    agent: Arc<AgentInner>,
    thread_id: String,
    conversation: Conversation,
    stage: TurnStage,
    steps: usize,
    span: Span,
}

impl TurnStream {
    pub(crate) fn new(
        agent: Arc<AgentInner>,
        input: String,
        config: &RunConfig,
    ) -> Self {
        let thread_id = config.thread_id().to_owned();
        let conversation =
            agent.checkpointer.load(&thread_id).unwrap_or_default();
        let span = debug_span!("agent turn", thread_id = %thread_id);
        let mut stream = Self {
            agent,
            thread_id,
            conversation,
            stage: TurnStage::ModelThinking,
            steps: 0,
            span,
        };
        stream.commit(ModelMessage::User(input));
        stream
    }

    /// Runs the next step and returns its update, or `None` when the turn is
    /// over.
    pub async fn next(&mut self) -> Option<Result<AgentUpdate, AgentError>> {
        let span = self.span.clone();
        let result = match mem::take(&mut self.stage) {
            TurnStage::Done => return None,
            TurnStage::ModelThinking => self.think().instrument(span).await,
            TurnStage::RunningTools(calls) => {
                Ok(self.run_tools(calls).instrument(span).await)
            }
        };
        if let Err(err) = &result {
            warn!("turn aborted: {err}");
        }
        Some(result)
    }

    /// Drives the turn to completion and collects all updates.
    pub async fn collect(mut self) -> Result<Vec<AgentUpdate>, AgentError> {
        let mut updates = vec![];
        while let Some(update) = self.next().await {
            updates.push(update?);
        }
        Ok(updates)
    }

    async fn think(&mut self) -> Result<AgentUpdate, AgentError> {
        if self.steps >= self.agent.max_steps {
            return Err(AgentError::StepLimitExceeded(self.agent.max_steps));
        }
        self.steps += 1;

        let request = self.build_model_request();
        let resp = self.agent.model_client.send_request(request).await?;
        debug!(
            "model replied with {} chars and {} tool calls",
            resp.transcript.len(),
            resp.tool_calls.len()
        );

        self.commit(ModelMessage::Assistant {
            content: resp.transcript.clone(),
            tool_calls: resp.tool_calls.clone(),
        });
        if !resp.tool_calls.is_empty() {
            self.stage = TurnStage::RunningTools(resp.tool_calls.clone());
        }
        Ok(AgentUpdate::Agent(AgentMessage {
            content: resp.transcript,
            tool_calls: resp.tool_calls,
        }))
    }

    /// Runs the calls one after another, in the order the model gave them.
    async fn run_tools(&mut self, calls: Vec<ToolCallRequest>) -> AgentUpdate {
        let mut messages = Vec::with_capacity(calls.len());
        for call in calls {
            let (content, is_error) = match self.agent.tools.call(&call).await {
                Ok(output) => (output, false),
                Err(err) => (format!("Error: {}", err.reason()), true),
            };
            self.commit(ModelMessage::Tool(ToolCallResult {
                id: call.id.clone(),
                name: call.name.clone(),
                content: content.clone(),
            }));
            messages.push(ToolMessage {
                tool_call_id: call.id,
                name: call.name,
                content,
                is_error,
            });
        }
        self.stage = TurnStage::ModelThinking;
        AgentUpdate::Tools(messages)
    }

    fn build_model_request(&self) -> ModelRequest {
        let system = self
            .agent
            .system_prompt
            .iter()
            .map(|prompt| ModelMessage::System(prompt.clone()));
        ModelRequest {
            messages: system
                .chain(self.conversation.messages().iter().cloned())
                .collect(),
            tools: self.agent.tools.definitions(),
        }
    }

    fn commit(&mut self, msg: ModelMessage) {
        self.conversation.push(msg);
        self.agent
            .checkpointer
            .save(&self.thread_id, &self.conversation);
    }
}
