use thiserror::Error;

/// Errors from wallet providers and wallets.
#[derive(Debug, Error)]
pub enum WalletError {
    /// The exported wallet blob could not be read.
    #[error("invalid wallet data: {0}")]
    InvalidWalletData(String),
    /// The API key could not be used to sign requests.
    #[error("invalid API key: {0}")]
    InvalidApiKey(String),
    /// The amount is not a positive decimal number the asset can hold.
    #[error("invalid amount `{0}`")]
    InvalidAmount(String),
    /// The asset is not known to the wallet.
    #[error("unsupported asset `{0}`")]
    UnsupportedAsset(String),
    /// The request never got a response.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// The API answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    Api {
        /// The HTTP status code.
        status: u16,
        /// The message from the response body.
        message: String,
    },
    /// The API answered with something we could not understand.
    #[error("unexpected response: {0}")]
    InvalidResponse(String),
    /// Encoding the exported wallet failed.
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}
