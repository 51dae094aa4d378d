use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::WalletError;

/// The exported form of a wallet, persisted between runs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletData {
    /// The backend id of the wallet.
    pub wallet_id: String,
    /// The key seed, absent for wallets signed by the backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<String>,
    /// The network the wallet lives on.
    pub network_id: String,
}

impl WalletData {
    /// Parses an exported wallet blob.
    pub fn parse(text: &str) -> Result<Self, WalletError> {
        serde_json::from_str(text)
            .map_err(|err| WalletError::InvalidWalletData(err.to_string()))
    }

    /// Encodes the wallet into the blob read by [`WalletData::parse`].
    #[inline]
    pub fn to_json(&self) -> Result<String, WalletError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// A transfer out of the wallet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transfer {
    /// Decimal amount, e.g. `"0.01"`.
    pub amount: String,
    /// Asset to send, e.g. `"eth"` or `"usdc"`.
    pub asset_id: String,
    /// Onchain address or name of the recipient.
    pub destination: String,
    /// Whether the backend pays the gas.
    pub gasless: bool,
}

/// What the backend reported for a submitted transaction.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransferReceipt {
    /// The backend status, e.g. `pending` or `complete`.
    pub status: Option<String>,
    /// The transaction hash, once broadcast.
    pub transaction_hash: Option<String>,
    /// A block explorer link, once broadcast.
    pub transaction_link: Option<String>,
}

/// An onchain wallet with a default address.
#[async_trait]
pub trait Wallet: Send + Sync {
    /// Returns the backend id of the wallet.
    fn id(&self) -> &str;

    /// Returns the network id, e.g. `base-sepolia`.
    fn network_id(&self) -> &str;

    /// Returns the default address.
    fn default_address(&self) -> &str;

    /// Returns the decimal balance of `asset_id` held by the default address.
    async fn balance(&self, asset_id: &str) -> Result<String, WalletError>;

    /// Sends funds from the default address.
    async fn transfer(
        &self,
        transfer: &Transfer,
    ) -> Result<TransferReceipt, WalletError>;

    /// Asks the testnet faucet for funds; the faucet picks its default asset
    /// when `asset_id` is `None`.
    async fn request_faucet_funds(
        &self,
        asset_id: Option<&str>,
    ) -> Result<TransferReceipt, WalletError>;

    /// Returns the opaque blob that [`WalletProvider::import_wallet`] accepts.
    fn export_data(&self) -> Result<String, WalletError>;
}

/// Creates and restores wallets.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Creates a new wallet.
    async fn create_wallet(&self) -> Result<Arc<dyn Wallet>, WalletError>;

    /// Restores a wallet from a blob produced by [`Wallet::export_data`].
    async fn import_wallet(
        &self,
        data: &str,
    ) -> Result<Arc<dyn Wallet>, WalletError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wallet_data() {
        let data = WalletData::parse(
            r#"{"wallet_id":"w-1","seed":"00ff","network_id":"base-sepolia"}"#,
        )
        .unwrap();
        assert_eq!(data.wallet_id, "w-1");
        assert_eq!(data.seed.as_deref(), Some("00ff"));
        assert_eq!(WalletData::parse(&data.to_json().unwrap()).unwrap(), data);

        let data = WalletData {
            wallet_id: "w-2".to_owned(),
            seed: None,
            network_id: "base-mainnet".to_owned(),
        };
        assert_eq!(
            data.to_json().unwrap(),
            r#"{"wallet_id":"w-2","network_id":"base-mainnet"}"#
        );

        assert!(matches!(
            WalletData::parse("abc123"),
            Err(WalletError::InvalidWalletData(_))
        ));
    }
}
