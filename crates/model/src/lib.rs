//! Provider-neutral types for talking to chat models.
//!
//! The agent only ever sees the types in this crate, so a model backend can
//! be swapped (a hosted OpenAI-compatible endpoint, a scripted fake for
//! tests) without touching the agent loop. Nothing here performs I/O; the
//! traits are the contract a backend implements.

#![deny(missing_docs)]

mod error;
mod provider;
mod request;
mod response;

pub use error::*;
pub use provider::*;
pub use request::*;
pub use response::*;
