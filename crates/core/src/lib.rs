//! Core logic of the agent: the tool abstraction, the conversation store and
//! the reasoning-and-acting loop that alternates between the model and the
//! tools until the model answers in plain text.

#![deny(missing_docs)]

#[macro_use]
extern crate tracing;

mod agent;
pub mod checkpoint;
pub mod conversation;
mod error;
mod model_client;
pub mod tool;

pub use agent::{
    Agent, AgentBuilder, AgentMessage, AgentUpdate, ToolMessage, TurnStream,
};
pub use checkpoint::{Checkpointer, MemoryCheckpointer, RunConfig};
pub use error::AgentError;
