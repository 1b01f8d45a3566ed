//! Cycler configuration.
//!
//! All knobs that the original operational script hard-coded live here as an
//! explicit structure: the funding mnemonic, the iteration count, the two
//! transfer amounts, the network target, and the poll policy. The CLI merges
//! a TOML file, environment variables, and flags into this struct and calls
//! [`CyclerConfig::validate`] before anything touches the network.

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use spinup_types::{Amount, NetworkId};

use crate::error::WalletError;
use crate::poll::PollPolicy;

fn default_accounts() -> u32 {
    1
}

fn default_forward() -> Amount {
    // 0.02 MRD
    Amount::from_raw(20_000_000)
}

fn default_return() -> Amount {
    // 0.01 MRD
    Amount::from_raw(10_000_000)
}

fn default_network() -> NetworkId {
    NetworkId::Test
}

fn default_poll_interval_ms() -> u64 {
    1500
}

fn default_poll_max_attempts() -> u32 {
    200
}

/// Configuration for one cycler run.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CyclerConfig {
    /// Funding account recovery phrase. Prefer supplying this via the
    /// `SPINUP_MNEMONIC` environment variable rather than a config file.
    #[serde(default)]
    pub mnemonic: String,

    /// Number of fresh accounts to cycle funds through.
    #[serde(default = "default_accounts")]
    pub accounts: u32,

    /// Amount sent funding → generated. Must exceed `return_amount` by enough
    /// to cover network fees.
    #[serde(default = "default_forward")]
    pub forward_amount: Amount,

    /// Amount sent generated → funding.
    #[serde(default = "default_return")]
    pub return_amount: Amount,

    /// Which network to run against.
    #[serde(default = "default_network")]
    pub network: NetworkId,

    /// RPC endpoint override; defaults to the network's well-known URL.
    #[serde(default)]
    pub rpc_url: Option<String>,

    /// Delay between confirmation poll attempts, in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Maximum poll attempts before a wait is declared timed out.
    #[serde(default = "default_poll_max_attempts")]
    pub poll_max_attempts: u32,

    /// Directory for encrypted keystores of generated accounts. When unset,
    /// generated phrases exist only in the log output.
    #[serde(default)]
    pub keystore_dir: Option<PathBuf>,

    /// Passphrase protecting the generated-account keystores.
    #[serde(default)]
    pub keystore_passphrase: Option<String>,
}

impl Default for CyclerConfig {
    fn default() -> Self {
        Self {
            mnemonic: String::new(),
            accounts: default_accounts(),
            forward_amount: default_forward(),
            return_amount: default_return(),
            network: default_network(),
            rpc_url: None,
            poll_interval_ms: default_poll_interval_ms(),
            poll_max_attempts: default_poll_max_attempts(),
            keystore_dir: None,
            keystore_passphrase: None,
        }
    }
}

impl CyclerConfig {
    /// Check the configuration before any network call is made.
    ///
    /// The return amount must be strictly below the forward amount — the gap
    /// is the fee buffer the return leg spends from.
    pub fn validate(&self) -> Result<(), WalletError> {
        if self.mnemonic.trim().is_empty() {
            return Err(WalletError::Config(
                "funding mnemonic is empty (set SPINUP_MNEMONIC or --mnemonic-file)".into(),
            ));
        }
        if self.accounts == 0 {
            return Err(WalletError::Config("accounts must be at least 1".into()));
        }
        if self.forward_amount.is_zero() || self.return_amount.is_zero() {
            return Err(WalletError::Config("transfer amounts must be nonzero".into()));
        }
        if self.return_amount >= self.forward_amount {
            return Err(WalletError::Config(format!(
                "return amount {} must be strictly below forward amount {}",
                self.return_amount, self.forward_amount
            )));
        }
        if self.poll_interval_ms == 0 || self.poll_max_attempts == 0 {
            return Err(WalletError::Config(
                "poll interval and max attempts must be nonzero".into(),
            ));
        }
        if self.keystore_dir.is_some() && self.keystore_passphrase.is_none() {
            return Err(WalletError::Config(
                "keystore_dir requires keystore_passphrase".into(),
            ));
        }
        Ok(())
    }

    /// The poll policy derived from the configured interval and bound.
    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy {
            interval: Duration::from_millis(self.poll_interval_ms),
            max_attempts: self.poll_max_attempts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> CyclerConfig {
        CyclerConfig {
            mnemonic: "abandon abandon ability".into(),
            ..Default::default()
        }
    }

    #[test]
    fn default_amounts_are_ordered() {
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn rejects_empty_mnemonic() {
        let cfg = CyclerConfig::default();
        assert!(matches!(cfg.validate(), Err(WalletError::Config(_))));
    }

    #[test]
    fn rejects_return_not_below_forward() {
        let mut cfg = valid();
        cfg.return_amount = cfg.forward_amount;
        assert!(matches!(cfg.validate(), Err(WalletError::Config(_))));

        cfg.return_amount = Amount::from_raw(cfg.forward_amount.raw() + 1);
        assert!(matches!(cfg.validate(), Err(WalletError::Config(_))));
    }

    #[test]
    fn rejects_zero_amounts() {
        let mut cfg = valid();
        cfg.return_amount = Amount::ZERO;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_zero_accounts() {
        let mut cfg = valid();
        cfg.accounts = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_keystore_dir_without_passphrase() {
        let mut cfg = valid();
        cfg.keystore_dir = Some("/tmp/keys".into());
        assert!(cfg.validate().is_err());

        cfg.keystore_passphrase = Some("hunter2".into());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn parses_from_toml_with_decimal_amounts() {
        let cfg: CyclerConfig = toml::from_str(
            r#"
            accounts = 3
            forward_amount = "0.02"
            return_amount = "0.01"
            network = "test"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.accounts, 3);
        assert_eq!(cfg.forward_amount.raw(), 20_000_000);
        assert_eq!(cfg.return_amount.raw(), 10_000_000);
        assert_eq!(cfg.network, NetworkId::Test);
    }
}
