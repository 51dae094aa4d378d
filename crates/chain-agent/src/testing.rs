//! In-memory backends for tests.

use std::sync::Arc;

use async_trait::async_trait;
use chain_agent_wallet::{
    Transfer, TransferReceipt, Wallet, WalletError, WalletProvider,
};
use parking_lot::Mutex;

use crate::tools::{SearchBackend, SearchError};

#[derive(Default)]
pub struct FakeSearch {
    queries: Mutex<Vec<String>>,
}

impl FakeSearch {
    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().clone()
    }
}

#[async_trait]
impl SearchBackend for FakeSearch {
    async fn search(&self, query: &str) -> Result<String, SearchError> {
        self.queries.lock().push(query.to_owned());
        if query == "fail" {
            return Err(SearchError::Api {
                status: 500,
                message: "boom".to_owned(),
            });
        }
        Ok(format!("results for: {query}"))
    }
}

pub struct FakeWallet {
    data: String,
}

#[async_trait]
impl Wallet for FakeWallet {
    fn id(&self) -> &str {
        "w-1"
    }

    fn network_id(&self) -> &str {
        "base-sepolia"
    }

    fn default_address(&self) -> &str {
        "0xabc"
    }

    async fn balance(&self, _asset_id: &str) -> Result<String, WalletError> {
        Ok("0.5".to_owned())
    }

    async fn transfer(
        &self,
        _transfer: &Transfer,
    ) -> Result<TransferReceipt, WalletError> {
        Ok(TransferReceipt::default())
    }

    async fn request_faucet_funds(
        &self,
        _asset_id: Option<&str>,
    ) -> Result<TransferReceipt, WalletError> {
        Ok(TransferReceipt::default())
    }

    fn export_data(&self) -> Result<String, WalletError> {
        Ok(self.data.clone())
    }
}

/// Records what it was asked to do.
#[derive(Default)]
pub struct FakeWalletProvider {
    pub created: Mutex<usize>,
    pub imported: Mutex<Vec<String>>,
}

#[async_trait]
impl WalletProvider for FakeWalletProvider {
    async fn create_wallet(&self) -> Result<Arc<dyn Wallet>, WalletError> {
        *self.created.lock() += 1;
        Ok(Arc::new(FakeWallet {
            data: "created".to_owned(),
        }))
    }

    async fn import_wallet(
        &self,
        data: &str,
    ) -> Result<Arc<dyn Wallet>, WalletError> {
        self.imported.lock().push(data.to_owned());
        if data.is_empty() {
            return Err(WalletError::InvalidWalletData("empty".to_owned()));
        }
        Ok(Arc::new(FakeWallet {
            data: data.to_owned(),
        }))
    }
}
