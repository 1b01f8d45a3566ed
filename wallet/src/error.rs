use thiserror::Error;

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("key error: {0}")]
    Key(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("node RPC error: {0}")]
    Node(String),

    #[error("transfer rejected by node: {0}")]
    Rejected(String),

    #[error("timed out waiting for {what} to change after {attempts} attempts")]
    PollTimeout { what: String, attempts: u32 },

    #[error("operation cancelled")]
    Cancelled,

    #[error("keystore error: {0}")]
    Keystore(String),
}
