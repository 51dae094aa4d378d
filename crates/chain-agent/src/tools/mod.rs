//! Tools built by this crate, next to the wallet toolkit.

mod search;

pub use search::{SearchBackend, SearchError, SearchTool, SerperSearch};
