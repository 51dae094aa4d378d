use chain_agent_model::{ErrorKind, ModelProviderError};
use thiserror::Error;

/// An error that ends a turn.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum AgentError {
    /// The model provider failed.
    #[error("model request failed: {message}")]
    Model {
        /// What kind of failure the provider reported.
        kind: ErrorKind,
        /// The provider's message.
        message: String,
    },
    /// The model kept calling tools without giving an answer.
    #[error("agent stopped after {0} model steps without a final answer")]
    StepLimitExceeded(usize),
}

impl AgentError {
    pub(crate) fn from_provider(err: &dyn ModelProviderError) -> Self {
        AgentError::Model {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}
