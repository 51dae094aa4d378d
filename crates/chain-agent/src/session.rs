use std::sync::Arc;

use chain_agent_core::tool::{RegistryError, select_tools};
use chain_agent_core::{
    Agent, AgentBuilder, MemoryCheckpointer, RunConfig, TurnStream,
};
use chain_agent_model::ModelProvider;
use chain_agent_wallet::{Wallet, WalletError, WalletProvider, WalletToolkit};
use thiserror::Error;

use crate::tools::{SearchBackend, SearchTool};

/// The thread every turn of a session is routed to.
pub const THREAD_ID: &str = "chain-agent-chatbot";

/// The wallet actions the model may use.
pub const WALLET_TOOLS: [&str; 3] = ["get_balance", "transfer", "get_wallet_details"];

const SYSTEM_PROMPT: &str = include_str!("./system_prompt.md");

/// Errors building a [`Session`].
#[derive(Debug, Error)]
pub enum SessionError {
    /// A required collaborator was not set on the builder.
    #[error("no {0} configured")]
    Missing(&'static str),
    /// The wallet could not be created or imported.
    #[error("wallet setup failed: {0}")]
    Wallet(#[from] WalletError),
    /// The tools could not be registered.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// A session builder.
///
/// See [`Session`].
pub struct SessionBuilder {
    agent_builder: AgentBuilder,
    wallet_provider: Option<Arc<dyn WalletProvider>>,
    wallet_data: Option<String>,
    search_backend: Option<Arc<dyn SearchBackend>>,
}

impl SessionBuilder {
    /// Creates a session builder with a specified model provider.
    pub fn with_model_provider<M: ModelProvider + 'static>(
        provider: M,
    ) -> Self {
        let agent_builder = AgentBuilder::with_model_provider(provider)
            .with_system_prompt(SYSTEM_PROMPT.trim());
        Self {
            agent_builder,
            wallet_provider: None,
            wallet_data: None,
            search_backend: None,
        }
    }

    /// Sets the provider that creates or imports the wallet.
    #[inline]
    pub fn with_wallet_provider<W: WalletProvider + 'static>(
        mut self,
        provider: W,
    ) -> Self {
        self.wallet_provider = Some(Arc::new(provider));
        self
    }

    /// Imports the wallet from an exported blob instead of creating one.
    #[inline]
    pub fn with_wallet_data<S: Into<String>>(mut self, data: Option<S>) -> Self {
        self.wallet_data = data.map(Into::into);
        self
    }

    /// Sets the backend of the `Search` tool.
    #[inline]
    pub fn with_search_backend<B: SearchBackend + 'static>(
        mut self,
        backend: B,
    ) -> Self {
        self.search_backend = Some(Arc::new(backend));
        self
    }

    /// Opens the wallet and builds a new session.
    pub async fn build(self) -> Result<Session, SessionError> {
        let wallet_provider = self
            .wallet_provider
            .ok_or(SessionError::Missing("wallet provider"))?;
        let search_backend = self
            .search_backend
            .ok_or(SessionError::Missing("search backend"))?;

        let wallet = match &self.wallet_data {
            Some(data) => wallet_provider.import_wallet(data).await?,
            None => wallet_provider.create_wallet().await?,
        };
        info!(
            "using wallet {} on {}",
            wallet.id(),
            wallet.network_id()
        );

        let wallet_tools =
            select_tools(WalletToolkit::new(Arc::clone(&wallet)).tools(), &WALLET_TOOLS);
        let agent = self
            .agent_builder
            .with_tools(wallet_tools)
            .with_tool(SearchTool::new(search_backend))
            .with_checkpointer(Arc::new(MemoryCheckpointer::new()))
            .build()?;

        Ok(Session {
            agent,
            config: RunConfig::with_thread_id(THREAD_ID),
            wallet,
        })
    }
}

/// A chat session: a fully configured agent and the thread it talks on.
///
/// The session is basically a wrapper around [`Agent`] that routes every
/// input to the same conversation thread.
pub struct Session {
    agent: Agent,
    config: RunConfig,
    wallet: Arc<dyn Wallet>,
}

impl Session {
    /// Submits a user turn and returns its updates.
    #[inline]
    pub fn send_message(&self, message: &str) -> TurnStream {
        self.agent.stream(message, &self.config)
    }

    /// Returns the underlying agent.
    #[inline]
    pub fn agent(&self) -> &Agent {
        &self.agent
    }

    /// Returns the run config routing turns to [`THREAD_ID`].
    #[inline]
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Returns the blob to persist so the next run imports the same wallet.
    #[inline]
    pub fn export_wallet_data(&self) -> Result<String, WalletError> {
        self.wallet.export_data()
    }
}
