use serde::{Deserialize, Serialize};

// ------------------------------
// Types received from the server
// ------------------------------

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct WalletResource {
    pub id: String,
    pub network_id: String,
    pub default_address: Option<AddressResource>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct AddressResource {
    pub address_id: String,
}

/// A balance in atomic units.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct BalanceResource {
    pub amount: String,
    pub asset: AssetResource,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct AssetResource {
    pub asset_id: String,
    pub decimals: Option<u32>,
}

/// A transfer or faucet transaction. Server-signed transfers may not have
/// been broadcast yet, so every field is optional.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct TransactionResource {
    pub status: Option<String>,
    pub transaction_hash: Option<String>,
    pub transaction_link: Option<String>,
    pub transaction: Option<Box<TransactionResource>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ErrorBody {
    pub code: Option<String>,
    pub message: String,
}

// ------------------------
// Types sent to the server
// ------------------------

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CreateWalletRequest<'a> {
    pub wallet: NewWallet<'a>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NewWallet<'a> {
    pub network_id: &'a str,
    pub use_server_signer: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CreateTransferRequest<'a> {
    /// Atomic units.
    pub amount: String,
    pub network_id: &'a str,
    pub asset_id: &'a str,
    pub destination: &'a str,
    pub gasless: bool,
}
