use std::fmt::{self, Debug};

const DEFAULT_BASE_URL: &str = "https://api.cdp.coinbase.com/platform";
const DEFAULT_NETWORK_ID: &str = "base-sepolia";

/// Builder for [`CdpConfig`].
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct CdpConfigBuilder {
    api_key_name: String,
    api_key_private_key: String,
    base_url: Option<String>,
    network_id: Option<String>,
}

impl CdpConfigBuilder {
    /// Creates a builder with the API key name and its PEM private key.
    ///
    /// Escaped `\n` sequences in the key, as found in `.env` files, are
    /// turned back into newlines.
    #[inline]
    pub fn with_api_key<N: Into<String>, K: AsRef<str>>(
        name: N,
        private_key: K,
    ) -> Self {
        Self {
            api_key_name: name.into(),
            api_key_private_key: private_key.as_ref().replace("\\n", "\n"),
            base_url: None,
            network_id: None,
        }
    }

    /// Sets a custom base URL.
    #[inline]
    pub fn with_base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Sets the network new wallets are created on.
    #[inline]
    pub fn with_network_id<S: Into<String>>(mut self, network_id: S) -> Self {
        self.network_id = Some(network_id.into());
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> CdpConfig {
        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned());
        CdpConfig {
            api_key_name: self.api_key_name,
            api_key_private_key: self.api_key_private_key,
            base_url: base_url.trim_end_matches('/').to_owned(),
            network_id: self
                .network_id
                .unwrap_or_else(|| DEFAULT_NETWORK_ID.to_owned()),
        }
    }
}

impl Debug for CdpConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CdpConfigBuilder")
            .field("api_key_name", &self.api_key_name)
            .field("api_key_private_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("network_id", &self.network_id)
            .finish()
    }
}

/// Configuration for the CDP wallet provider.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct CdpConfig {
    pub(crate) api_key_name: String,
    pub(crate) api_key_private_key: String,
    pub(crate) base_url: String,
    pub(crate) network_id: String,
}

impl CdpConfig {
    /// Returns the network new wallets are created on.
    #[inline]
    pub fn network_id(&self) -> &str {
        &self.network_id
    }

    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Debug for CdpConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CdpConfig")
            .field("api_key_name", &self.api_key_name)
            .field("api_key_private_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("network_id", &self.network_id)
            .finish()
    }
}
