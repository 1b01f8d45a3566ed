//! The seam between the cycler and the network.
//!
//! Everything the cycler observes or submits goes through this trait, so the
//! whole transfer-and-return sequence can run against a mock chain in tests.
//! [`crate::NodeClient`] is the real implementation.

use spinup_types::{Address, Amount};

use crate::error::WalletError;
use crate::transfer::SignedTransfer;

/// Node acknowledgment of a submitted transfer.
#[derive(Clone, Debug)]
pub struct SubmitReceipt {
    /// Hash assigned by the node.
    pub hash: String,
}

/// Chain operations the cycler needs.
#[allow(async_fn_in_trait)]
pub trait ChainApi {
    /// The account's current sequence number.
    async fn sequence(&self, account: &Address) -> Result<u64, WalletError>;

    /// The account's current balance in raw units.
    async fn balance(&self, account: &Address) -> Result<Amount, WalletError>;

    /// Submit a signed transfer. A node-side rejection is an error.
    async fn submit(&self, transfer: &SignedTransfer) -> Result<SubmitReceipt, WalletError>;
}
