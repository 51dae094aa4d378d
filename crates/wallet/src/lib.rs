//! Onchain wallet access for the agent.
//!
//! [`WalletProvider`] creates or imports a [`Wallet`], and [`WalletToolkit`]
//! exposes the wallet actions as tools the model can call. [`CdpProvider`]
//! talks to the Coinbase Developer Platform REST API.

#![deny(missing_docs)]

#[macro_use]
extern crate tracing;

mod amount;
mod cdp;
mod error;
mod toolkit;
mod wallet;

pub use cdp::{CdpConfig, CdpConfigBuilder, CdpProvider};
pub use error::WalletError;
pub use toolkit::WalletToolkit;
pub use wallet::{Transfer, TransferReceipt, Wallet, WalletData, WalletProvider};
