use std::env;
use std::fmt::{self, Debug};

use chain_agent_openai_model::{OpenAIConfig, OpenAIConfigBuilder};
use chain_agent_wallet::{CdpConfig, CdpConfigBuilder};
use thiserror::Error;

/// Errors reading the configuration.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A required variable is not set.
    #[error("{0} environment variable is not set")]
    Missing(&'static str),
}

/// Settings read from the environment.
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    model_name: String,
    openai_api_key: String,
    openai_base_url: Option<String>,
    serper_api_key: String,
    cdp_api_key_name: String,
    cdp_api_key_private_key: String,
    cdp_base_url: Option<String>,
    network_id: Option<String>,
}

impl Config {
    /// Reads the configuration from the process environment.
    ///
    /// Call `dotenvy::dotenv()` first to pick up a `.env` file.
    #[inline]
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Reads the configuration through `lookup`. Empty values count as
    /// unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |name: &str| lookup(name).filter(|v| !v.is_empty());
        let required =
            |name: &'static str| optional(name).ok_or(ConfigError::Missing(name));
        Ok(Self {
            model_name: required("MODEL_NAME")?,
            openai_api_key: required("OPENAI_API_KEY")?,
            openai_base_url: optional("OPENAI_BASE_URL"),
            serper_api_key: required("SERPER_API_KEY")?,
            cdp_api_key_name: required("CDP_API_KEY_NAME")?,
            cdp_api_key_private_key: required("CDP_API_KEY_PRIVATE_KEY")?,
            cdp_base_url: optional("CDP_BASE_URL"),
            network_id: optional("NETWORK_ID"),
        })
    }

    /// Returns the model provider configuration.
    pub fn openai_config(&self) -> OpenAIConfig {
        let mut builder =
            OpenAIConfigBuilder::with_api_key(&*self.openai_api_key)
                .with_model(&*self.model_name);
        if let Some(base_url) = &self.openai_base_url {
            builder = builder.with_base_url(&**base_url);
        }
        builder.build()
    }

    /// Returns the wallet provider configuration.
    pub fn cdp_config(&self) -> CdpConfig {
        let mut builder = CdpConfigBuilder::with_api_key(
            &*self.cdp_api_key_name,
            &self.cdp_api_key_private_key,
        );
        if let Some(base_url) = &self.cdp_base_url {
            builder = builder.with_base_url(&**base_url);
        }
        if let Some(network_id) = &self.network_id {
            builder = builder.with_network_id(&**network_id);
        }
        builder.build()
    }

    /// Returns the search API key.
    #[inline]
    pub fn serper_api_key(&self) -> &str {
        &self.serper_api_key
    }
}

impl Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("model_name", &self.model_name)
            .field("openai_base_url", &self.openai_base_url)
            .field("cdp_api_key_name", &self.cdp_api_key_name)
            .field("cdp_base_url", &self.cdp_base_url)
            .field("network_id", &self.network_id)
            .finish_non_exhaustive()
    }
}
