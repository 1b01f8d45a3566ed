//! Node RPC client, confirmation poller, and the account cycler.
//!
//! The cycler drives the whole tool: derive the funding account, then for
//! each iteration generate a fresh account, send funds forward, wait for
//! confirmation, and send a slightly smaller amount back. Everything that
//! touches the network goes through the [`ChainApi`] seam so the cycler can
//! be exercised against a mock chain in tests.

pub mod chain;
pub mod client;
pub mod config;
pub mod cycler;
pub mod endpoint;
pub mod error;
pub mod keystore;
pub mod poll;
pub mod transfer;

pub use chain::{ChainApi, SubmitReceipt};
pub use client::NodeClient;
pub use config::CyclerConfig;
pub use cycler::{Cycler, RunSummary};
pub use endpoint::resolve_endpoint;
pub use error::WalletError;
pub use poll::PollPolicy;
pub use transfer::{sign_transfer, SignedTransfer, TransferIntent};
