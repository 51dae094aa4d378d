//! A wallet provider backed by the Coinbase Developer Platform REST API.
//!
//! Wallets are created in server-signer mode, so transfers are signed by the
//! platform and no key material is kept locally.

mod auth;
mod config;
mod proto;

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, Method, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::amount::{asset_decimals, from_atomic, to_atomic};
use crate::{Transfer, TransferReceipt, Wallet, WalletData, WalletError, WalletProvider};
use auth::Signer;
pub use config::{CdpConfig, CdpConfigBuilder};
use proto::{
    AddressResource, BalanceResource, CreateTransferRequest,
    CreateWalletRequest, ErrorBody, NewWallet, TransactionResource,
    WalletResource,
};

struct CdpClient {
    client: Client,
    config: CdpConfig,
    signer: Signer,
}

impl CdpClient {
    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, WalletError> {
        self.send::<(), T>(Method::GET, path, None).await
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, WalletError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        self.send(Method::POST, path, Some(body)).await
    }

    async fn send<B, T>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, WalletError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let url = self.config.endpoint(path);
        let token = self.signer.token(&method, &url)?;
        debug!("{method} {path}");
        let mut req = self
            .client
            .request(method, &url)
            .bearer_auth(token);
        if let Some(body) = body {
            req = req.json(body);
        }
        let resp = check_status(req.send().await?).await?;
        resp.json()
            .await
            .map_err(|err| WalletError::InvalidResponse(err.to_string()))
    }
}

/// Turns a non-success response into an error, preferring the message the
/// API put in the body.
async fn check_status(resp: Response) -> Result<Response, WalletError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .map(|body| match body.code {
            Some(code) => format!("{code}: {}", body.message),
            None => body.message,
        })
        .unwrap_or(body);
    warn!("wallet request failed with {status}: {message}");
    Err(WalletError::Api {
        status: status.as_u16(),
        message,
    })
}

/// CDP wallet provider.
pub struct CdpProvider {
    client: Arc<CdpClient>,
}

impl CdpProvider {
    /// Creates a provider. Fails if the private key is not a valid EC PEM.
    pub fn new(config: CdpConfig) -> Result<Self, WalletError> {
        let signer =
            Signer::new(&config.api_key_name, &config.api_key_private_key)?;
        Ok(Self {
            client: Arc::new(CdpClient {
                client: Client::new(),
                config,
                signer,
            }),
        })
    }

    /// Wraps a wallet resource, creating its default address if it has none.
    async fn open_wallet(
        &self,
        wallet: WalletResource,
        seed: Option<String>,
    ) -> Result<Arc<dyn Wallet>, WalletError> {
        let address = match wallet.default_address {
            Some(address) => address,
            None => {
                info!("creating default address for wallet {}", wallet.id);
                self.client
                    .post::<_, AddressResource>(
                        &format!("/v1/wallets/{}/addresses", wallet.id),
                        &serde_json::json!({}),
                    )
                    .await?
            }
        };
        Ok(Arc::new(CdpWallet {
            client: Arc::clone(&self.client),
            data: WalletData {
                wallet_id: wallet.id,
                seed,
                network_id: wallet.network_id,
            },
            default_address: address.address_id,
        }))
    }
}

#[async_trait]
impl WalletProvider for CdpProvider {
    async fn create_wallet(&self) -> Result<Arc<dyn Wallet>, WalletError> {
        let req = CreateWalletRequest {
            wallet: NewWallet {
                network_id: self.client.config.network_id(),
                use_server_signer: true,
            },
        };
        let wallet: WalletResource = self.client.post("/v1/wallets", &req).await?;
        info!("created wallet {} on {}", wallet.id, wallet.network_id);
        self.open_wallet(wallet, None).await
    }

    async fn import_wallet(
        &self,
        data: &str,
    ) -> Result<Arc<dyn Wallet>, WalletError> {
        let data = WalletData::parse(data)?;
        let wallet: WalletResource = self
            .client
            .get(&format!("/v1/wallets/{}", data.wallet_id))
            .await?;
        if wallet.network_id != data.network_id {
            return Err(WalletError::InvalidWalletData(format!(
                "wallet {} lives on {}, not {}",
                wallet.id, wallet.network_id, data.network_id
            )));
        }
        info!("imported wallet {} on {}", wallet.id, wallet.network_id);
        self.open_wallet(wallet, data.seed).await
    }
}

struct CdpWallet {
    client: Arc<CdpClient>,
    data: WalletData,
    default_address: String,
}

#[async_trait]
impl Wallet for CdpWallet {
    fn id(&self) -> &str {
        &self.data.wallet_id
    }

    fn network_id(&self) -> &str {
        &self.data.network_id
    }

    fn default_address(&self) -> &str {
        &self.default_address
    }

    async fn balance(&self, asset_id: &str) -> Result<String, WalletError> {
        let balance: BalanceResource = self
            .client
            .get(&format!(
                "/v1/wallets/{}/balances/{asset_id}",
                self.data.wallet_id
            ))
            .await?;
        let decimals = match balance.asset.decimals {
            Some(decimals) => decimals,
            None => asset_decimals(&balance.asset.asset_id)?,
        };
        from_atomic(&balance.amount, decimals)
    }

    async fn transfer(
        &self,
        transfer: &Transfer,
    ) -> Result<TransferReceipt, WalletError> {
        let amount =
            to_atomic(&transfer.amount, asset_decimals(&transfer.asset_id)?)?;
        let req = CreateTransferRequest {
            amount,
            network_id: &self.data.network_id,
            asset_id: &transfer.asset_id,
            destination: &transfer.destination,
            gasless: transfer.gasless,
        };
        let resource: TransactionResource = self
            .client
            .post(
                &format!(
                    "/v1/wallets/{}/addresses/{}/transfers",
                    self.data.wallet_id, self.default_address
                ),
                &req,
            )
            .await?;
        Ok(receipt(resource))
    }

    async fn request_faucet_funds(
        &self,
        asset_id: Option<&str>,
    ) -> Result<TransferReceipt, WalletError> {
        let mut path = format!(
            "/v1/networks/{}/addresses/{}/faucet",
            self.data.network_id, self.default_address
        );
        if let Some(asset_id) = asset_id {
            path.push_str("?asset_id=");
            path.push_str(asset_id);
        }
        let resource: TransactionResource =
            self.client.post(&path, &serde_json::json!({})).await?;
        Ok(receipt(resource))
    }

    fn export_data(&self) -> Result<String, WalletError> {
        self.data.to_json()
    }
}

/// Flattens a transaction resource, preferring the nested onchain
/// transaction for hash and link.
fn receipt(resource: TransactionResource) -> TransferReceipt {
    let onchain = resource.transaction.map(|tx| *tx).unwrap_or_default();
    TransferReceipt {
        status: resource.status.or(onchain.status),
        transaction_hash: onchain.transaction_hash.or(resource.transaction_hash),
        transaction_link: onchain.transaction_link.or(resource.transaction_link),
    }
}
