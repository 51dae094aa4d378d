//! Wallet actions as tools.

use std::sync::Arc;

use chain_agent_core::tool::{DynTool, Error as ToolError, Tool, ToolResult};
use schemars::{JsonSchema, schema_for};
use serde::Deserialize;
use serde_json::Value;

use crate::{Transfer, TransferReceipt, Wallet, WalletError};

/// Every wallet action, in the order they are offered.
///
/// Callers usually pick a subset with
/// [`select_tools`](chain_agent_core::tool::select_tools).
pub struct WalletToolkit {
    wallet: Arc<dyn Wallet>,
}

impl WalletToolkit {
    /// Creates a toolkit acting on `wallet`.
    #[inline]
    pub fn new(wallet: Arc<dyn Wallet>) -> Self {
        Self { wallet }
    }

    /// Returns `get_wallet_details`, `get_balance`, `request_faucet_funds`
    /// and `transfer`.
    pub fn tools(&self) -> Vec<DynTool> {
        vec![
            DynTool::new(WalletActionTool::<GetWalletDetails>::new(&self.wallet)),
            DynTool::new(WalletActionTool::<GetBalance>::new(&self.wallet)),
            DynTool::new(WalletActionTool::<RequestFaucetFunds>::new(
                &self.wallet,
            )),
            DynTool::new(WalletActionTool::<TransferFunds>::new(&self.wallet)),
        ]
    }
}

/// One wallet action: its name, description, input and how it runs.
trait WalletAction: Send + Sync + 'static {
    type Input: for<'de> Deserialize<'de> + JsonSchema + Send + 'static;

    const NAME: &'static str;
    const DESCRIPTION: &'static str;

    fn run(
        wallet: Arc<dyn Wallet>,
        input: Self::Input,
    ) -> impl Future<Output = Result<String, WalletError>> + Send;
}

struct WalletActionTool<A> {
    wallet: Arc<dyn Wallet>,
    parameter_schema: Value,
    _action: std::marker::PhantomData<fn() -> A>,
}

impl<A: WalletAction> WalletActionTool<A> {
    fn new(wallet: &Arc<dyn Wallet>) -> Self {
        Self {
            wallet: Arc::clone(wallet),
            parameter_schema: schema_for!(A::Input).to_value(),
            _action: std::marker::PhantomData,
        }
    }
}

impl<A: WalletAction> Tool for WalletActionTool<A> {
    type Input = A::Input;

    fn name(&self) -> &str {
        A::NAME
    }

    fn description(&self) -> &str {
        A::DESCRIPTION
    }

    fn parameter_schema(&self) -> &Value {
        &self.parameter_schema
    }

    fn execute(
        &self,
        input: A::Input,
    ) -> impl Future<Output = ToolResult> + Send + 'static {
        let wallet = Arc::clone(&self.wallet);
        async move {
            A::run(wallet, input).await.map_err(|err| {
                ToolError::execution_error()
                    .with_reason(format!("{} failed: {err}", A::NAME))
            })
        }
    }
}

#[derive(Deserialize, JsonSchema)]
struct NoInput {}

struct GetWalletDetails;

impl WalletAction for GetWalletDetails {
    type Input = NoInput;

    const NAME: &'static str = "get_wallet_details";
    const DESCRIPTION: &'static str = "\
This tool will get details about the wallet: its id, the network it is on \
and its default address.";

    async fn run(
        wallet: Arc<dyn Wallet>,
        _input: NoInput,
    ) -> Result<String, WalletError> {
        Ok(format!(
            "Wallet: {} on network: {} with default address: {}",
            wallet.id(),
            wallet.network_id(),
            wallet.default_address()
        ))
    }
}

#[derive(Deserialize, JsonSchema)]
struct GetBalanceInput {
    #[schemars(description = "The asset ID to get the balance for, e.g. `eth` or `usdc`.")]
    asset_id: String,
}

struct GetBalance;

impl WalletAction for GetBalance {
    type Input = GetBalanceInput;

    const NAME: &'static str = "get_balance";
    const DESCRIPTION: &'static str = "\
This tool will get the balance of the wallet for a given asset. It takes the \
asset ID as input.";

    async fn run(
        wallet: Arc<dyn Wallet>,
        input: GetBalanceInput,
    ) -> Result<String, WalletError> {
        let asset_id = input.asset_id.to_lowercase();
        let balance = wallet.balance(&asset_id).await?;
        Ok(format!(
            "Balances for wallet {}:\n  {}: {balance} {asset_id}",
            wallet.id(),
            wallet.default_address()
        ))
    }
}

#[derive(Deserialize, JsonSchema)]
struct FaucetInput {
    #[schemars(description = "The optional asset ID to request, `eth` or `usdc`. Defaults to `eth`.")]
    #[serde(default)]
    asset_id: Option<String>,
}

struct RequestFaucetFunds;

impl WalletAction for RequestFaucetFunds {
    type Input = FaucetInput;

    const NAME: &'static str = "request_faucet_funds";
    const DESCRIPTION: &'static str = "\
This tool will request test tokens from the faucet for the default address in \
the wallet. If no asset ID is provided the faucet defaults to ETH. The faucet \
is only available on 'base-sepolia' and can only provide 'eth' or 'usdc'. On \
any other network, ask the user to send funds to your wallet instead.";

    async fn run(
        wallet: Arc<dyn Wallet>,
        input: FaucetInput,
    ) -> Result<String, WalletError> {
        let asset_id = input.asset_id.map(|id| id.to_lowercase());
        let receipt =
            wallet.request_faucet_funds(asset_id.as_deref()).await?;
        let asset = asset_id.as_deref().unwrap_or("eth");
        Ok(format!(
            "Received {asset} from the faucet. {}",
            describe_transaction(&receipt)
        ))
    }
}

#[derive(Deserialize, JsonSchema)]
struct TransferInput {
    #[schemars(description = "The decimal amount of the asset to transfer, e.g. `0.01`.")]
    amount: String,
    #[schemars(description = "The asset ID to transfer, e.g. `eth` or `usdc`.")]
    asset_id: String,
    #[schemars(description = "The destination: an onchain address, an ENS name or a Basename.")]
    destination: String,
    #[schemars(description = "Whether to send a gasless transfer. Only available for `usdc` on base networks.")]
    #[serde(default)]
    gasless: bool,
}

struct TransferFunds;

impl WalletAction for TransferFunds {
    type Input = TransferInput;

    const NAME: &'static str = "transfer";
    const DESCRIPTION: &'static str = "\
This tool will transfer an asset from the wallet to another onchain address. \
It takes the amount, the asset ID, the destination and whether to do a \
gasless transfer. Gasless transfers are available for 'usdc' on \
'base-sepolia' and 'base-mainnet'; always use them when available. Always use \
the asset ID 'usdc' when transferring USDC. Make sure the wallet holds enough \
of the asset before transferring.";

    async fn run(
        wallet: Arc<dyn Wallet>,
        input: TransferInput,
    ) -> Result<String, WalletError> {
        let transfer = Transfer {
            amount: input.amount,
            asset_id: input.asset_id.to_lowercase(),
            destination: input.destination,
            gasless: input.gasless,
        };
        let receipt = wallet.transfer(&transfer).await?;
        Ok(format!(
            "Transferred {} of {} to {}. {}",
            transfer.amount,
            transfer.asset_id,
            transfer.destination,
            describe_transaction(&receipt)
        ))
    }
}

fn describe_transaction(receipt: &TransferReceipt) -> String {
    match (&receipt.transaction_hash, &receipt.transaction_link) {
        (Some(hash), Some(link)) => {
            format!("Transaction hash: {hash}\nTransaction link: {link}")
        }
        (Some(hash), None) => format!("Transaction hash: {hash}"),
        (None, _) => format!(
            "Transaction status: {}",
            receipt.status.as_deref().unwrap_or("submitted")
        ),
    }
}
