//! HTTP client for communicating with a Meridian node via JSON-RPC.

use serde::Deserialize;
use std::time::Duration;

use spinup_types::{Address, Amount};

use crate::chain::{ChainApi, SubmitReceipt};
use crate::error::WalletError;
use crate::transfer::SignedTransfer;

/// Wraps `reqwest::Client` with the node's base URL and provides typed
/// methods for each RPC action the cycler needs.
#[derive(Clone)]
pub struct NodeClient {
    http: reqwest::Client,
    node_url: String,
}

impl NodeClient {
    /// Create a new NodeClient targeting the given base URL.
    pub fn new(node_url: impl Into<String>) -> Result<Self, WalletError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| WalletError::Node(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            http,
            node_url: node_url.into(),
        })
    }

    /// The configured node URL.
    pub fn node_url(&self) -> &str {
        &self.node_url
    }

    /// Send a JSON-RPC request and return the `result` field.
    async fn rpc_call(
        &self,
        action: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, WalletError> {
        let mut body = params;
        body.as_object_mut()
            .ok_or_else(|| WalletError::Node("params must be a JSON object".into()))?
            .insert("action".to_string(), serde_json::json!(action));

        let response = self
            .http
            .post(&self.node_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| WalletError::Node(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(WalletError::Node(format!(
                "node returned HTTP {}",
                response.status()
            )));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| WalletError::Node(format!("invalid JSON response: {e}")))?;

        if let Some(err) = json.get("error").and_then(|e| e.as_str()) {
            return Err(WalletError::Node(format!("node error: {err}")));
        }

        Ok(json.get("result").cloned().unwrap_or(json))
    }

    /// Fetch an account's sequence number and balance in one call.
    ///
    /// Accounts the network has never seen report sequence 0 and an empty
    /// balance rather than an error.
    pub async fn account_info(&self, account: &Address) -> Result<AccountInfoResult, WalletError> {
        let result = self
            .rpc_call(
                "account_info",
                serde_json::json!({ "account": account.as_str() }),
            )
            .await?;

        serde_json::from_value(result)
            .map_err(|e| WalletError::Node(format!("invalid account_info response: {e}")))
    }

    /// Submit a signed transfer to the node for processing.
    pub async fn process(&self, transfer: &SignedTransfer) -> Result<ProcessResult, WalletError> {
        let transfer_json = serde_json::to_value(transfer)
            .map_err(|e| WalletError::Node(format!("transfer serialization failed: {e}")))?;
        let result = self
            .rpc_call("process", serde_json::json!({ "transfer": transfer_json }))
            .await?;

        serde_json::from_value(result)
            .map_err(|e| WalletError::Node(format!("invalid process response: {e}")))
    }
}

impl ChainApi for NodeClient {
    async fn sequence(&self, account: &Address) -> Result<u64, WalletError> {
        Ok(self.account_info(account).await?.sequence)
    }

    async fn balance(&self, account: &Address) -> Result<Amount, WalletError> {
        let info = self.account_info(account).await?;
        if info.balance.is_empty() {
            return Ok(Amount::ZERO);
        }
        info.balance
            .parse::<u128>()
            .map(Amount::from_raw)
            .map_err(|e| WalletError::Node(format!("invalid balance value: {e}")))
    }

    async fn submit(&self, transfer: &SignedTransfer) -> Result<SubmitReceipt, WalletError> {
        let result = self.process(transfer).await?;
        if !result.accepted {
            return Err(WalletError::Rejected(
                result.detail.unwrap_or_else(|| "no detail".into()),
            ));
        }
        Ok(SubmitReceipt { hash: result.hash })
    }
}

/// Account state response from the node.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountInfoResult {
    #[serde(default)]
    pub sequence: u64,
    /// Raw balance as a decimal string (u128 does not survive JSON numbers).
    #[serde(default)]
    pub balance: String,
}

/// Response from the `process` RPC (transfer submission).
#[derive(Debug, Clone, Deserialize)]
pub struct ProcessResult {
    pub hash: String,
    pub accepted: bool,
    #[serde(default)]
    pub detail: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_info_parses_node_response() {
        let info: AccountInfoResult = serde_json::from_value(serde_json::json!({
            "sequence": 5,
            "balance": "100000000"
        }))
        .unwrap();
        assert_eq!(info.sequence, 5);
        assert_eq!(info.balance, "100000000");
    }

    #[test]
    fn unseen_account_defaults() {
        let info: AccountInfoResult = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(info.sequence, 0);
        assert!(info.balance.is_empty());
    }

    #[test]
    fn process_result_carries_rejection_detail() {
        let result: ProcessResult = serde_json::from_value(serde_json::json!({
            "hash": "abc123",
            "accepted": false,
            "detail": "insufficient balance"
        }))
        .unwrap();
        assert!(!result.accepted);
        assert_eq!(result.detail.as_deref(), Some("insufficient balance"));
    }
}
