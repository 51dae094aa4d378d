//! Conversation-related types.

use std::fmt::{self, Display};

use chain_agent_model::ModelMessage;

/// Who produced a turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    /// Typed by the user.
    User,
    /// Written by the model.
    Agent,
    /// Returned by a tool.
    Tool,
}

impl Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => f.write_str("user"),
            Role::Agent => f.write_str("agent"),
            Role::Tool => f.write_str("tool"),
        }
    }
}

/// A human-readable view of one message in a thread.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Turn {
    /// Who produced the turn.
    pub role: Role,
    /// The text of the turn.
    pub content: String,
}

/// The history of one conversation thread.
///
/// The history is append-only. The system instructions are not part of it;
/// the agent prepends them to every model request.
#[derive(Clone, Default, Debug, PartialEq, Eq)]
pub struct Conversation {
    messages: Vec<ModelMessage>,
}

impl Conversation {
    /// Appends a message.
    #[inline]
    pub fn push(&mut self, msg: ModelMessage) {
        self.messages.push(msg);
    }

    /// Returns the messages in order.
    #[inline]
    pub fn messages(&self) -> &[ModelMessage] {
        &self.messages
    }

    /// Returns the number of messages.
    #[inline]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns `true` if nothing has been said yet.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Returns the history as turns.
    pub fn turns(&self) -> Vec<Turn> {
        self.messages
            .iter()
            .filter_map(|msg| {
                let (role, content) = match msg {
                    ModelMessage::System(_) => return None,
                    ModelMessage::User(text) => (Role::User, text),
                    ModelMessage::Assistant { content, .. } => {
                        (Role::Agent, content)
                    }
                    ModelMessage::Tool(result) => (Role::Tool, &result.content),
                };
                Some(Turn {
                    role,
                    content: content.clone(),
                })
            })
            .collect()
    }
}
