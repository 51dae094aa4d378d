//! A command-line chatbot that can act onchain.
//!
//! The crate wires an OpenAI-compatible model, a subset of the wallet toolkit
//! and a web search tool into a reasoning-and-acting agent, then drives it
//! from a line-based chat loop.

#![deny(missing_docs)]

#[macro_use]
extern crate tracing;

mod bootstrap;
mod chat;
mod config;
mod session;
#[cfg(test)]
mod testing;
pub mod tools;

pub use bootstrap::{
    BootstrapError, DEFAULT_WALLET_FILE, WalletSource, load_wallet_data,
    save_wallet_data, wallet_source,
};
pub use chat::{ChatError, ChatExit, run_chat_mode};
pub use config::{Config, ConfigError};
pub use session::{
    Session, SessionBuilder, SessionError, THREAD_ID, WALLET_TOOLS,
};

/// Re-exports of [`chain_agent_core`] crate.
pub mod core {
    pub use chain_agent_core::*;
}
