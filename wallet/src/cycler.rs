//! The account cycler.
//!
//! One `Cycler` owns the funding account's keys and runs the configured
//! number of iterations. Each iteration generates a fresh mnemonic-derived
//! account and runs the transfer-and-return sequence against it:
//!
//! 1. send `forward_amount` funding → generated (bounce disabled),
//! 2. wait for the funding sequence number to move,
//! 3. wait for the generated balance to exceed its pre-transfer baseline,
//! 4. send `return_amount` generated → funding with a fixed body and a
//!    five-minute validity window,
//! 5. wait for the generated sequence number to move.
//!
//! An error inside one iteration is logged at the iteration boundary and the
//! next iteration proceeds with a brand-new account. There is no retry and
//! no compensation: a sequence that dies between the two legs leaves the
//! forward amount parked in the generated account, which is why persisting
//! the generated phrase (keystore) happens before the forward leg.

use std::time::{SystemTime, UNIX_EPOCH};

use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use spinup_crypto::{derive_address, generate_mnemonic, keypair_from_mnemonic, WordCount};
use spinup_types::{Address, KeyPair};

use crate::chain::ChainApi;
use crate::config::CyclerConfig;
use crate::error::WalletError;
use crate::keystore;
use crate::poll;
use crate::transfer::{sign_transfer, TransferIntent};

/// Words in every generated recovery phrase.
const GENERATED_WORDS: WordCount = WordCount::TwentyFour;
/// Body attached to the return transfer.
const RETURN_BODY: &str = "init";
/// Validity window for the return transfer, in seconds.
const RETURN_VALIDITY_SECS: u64 = 5 * 60;

/// What happened over one `run`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub attempted: u32,
    pub completed: u32,
    pub failed: u32,
}

/// Owns the funding keys and drives the per-account sequences.
pub struct Cycler<C: ChainApi + Clone> {
    config: CyclerConfig,
    chain: C,
    funding_keys: KeyPair,
    funding_address: Address,
    cancel: CancellationToken,
}

impl<C: ChainApi + Clone> Cycler<C> {
    /// Validate the configuration and derive the funding account.
    ///
    /// A key-derivation failure here is fatal: nothing can run without the
    /// funding account.
    pub fn new(
        config: CyclerConfig,
        chain: C,
        cancel: CancellationToken,
    ) -> Result<Self, WalletError> {
        config.validate()?;
        let funding_keys = keypair_from_mnemonic(&config.mnemonic)
            .map_err(|e| WalletError::Key(format!("funding mnemonic: {e}")))?;
        let funding_address = derive_address(&funding_keys.public);

        Ok(Self {
            config,
            chain,
            funding_keys,
            funding_address,
            cancel,
        })
    }

    /// The funding account's address.
    pub fn funding_address(&self) -> &Address {
        &self.funding_address
    }

    /// Run every configured iteration, strictly one at a time.
    ///
    /// Iteration failures are contained here; only cancellation stops the
    /// loop early.
    pub async fn run(&self) -> RunSummary {
        info!(address = %self.funding_address, "funding account");

        let mut summary = RunSummary::default();
        for iteration in 1..=self.config.accounts {
            if self.cancel.is_cancelled() {
                warn!(iteration, "cancelled, stopping run");
                break;
            }
            summary.attempted += 1;

            let phrase = match generate_mnemonic(GENERATED_WORDS) {
                Ok(p) => p,
                Err(e) => {
                    error!(iteration, error = %e, "mnemonic generation failed");
                    summary.failed += 1;
                    continue;
                }
            };
            // The phrase is the only handle on funds parked in the generated
            // account; without a keystore dir this log line is it.
            info!(iteration, phrase = %phrase, "generated recovery phrase");

            match self.cycle_account(&phrase).await {
                Ok(()) => {
                    info!(iteration, "account cycle complete");
                    summary.completed += 1;
                }
                Err(WalletError::Cancelled) => {
                    warn!(iteration, "cancelled mid-cycle, stopping run");
                    summary.failed += 1;
                    break;
                }
                Err(e) => {
                    error!(iteration, error = %e, "account cycle failed");
                    summary.failed += 1;
                }
            }
        }

        info!(
            attempted = summary.attempted,
            completed = summary.completed,
            failed = summary.failed,
            "run finished"
        );
        summary
    }

    /// The transfer-and-return sequence for one generated account.
    async fn cycle_account(&self, phrase: &str) -> Result<(), WalletError> {
        let keys = keypair_from_mnemonic(phrase)
            .map_err(|e| WalletError::Key(format!("generated mnemonic: {e}")))?;
        let generated = derive_address(&keys.public);
        info!(address = %generated, "generated account");

        if let (Some(dir), Some(passphrase)) = (
            self.config.keystore_dir.as_deref(),
            self.config.keystore_passphrase.as_deref(),
        ) {
            let path = keystore::save_generated(dir, &generated, phrase, passphrase)?;
            info!(path = %path.display(), "generated phrase persisted");
        }

        let policy = self.config.poll_policy();

        // Forward leg: funding → generated.
        let funding_seq = self.chain.sequence(&self.funding_address).await?;
        info!(sequence = funding_seq, "funding account sequence");

        let forward = TransferIntent {
            to: generated.clone(),
            amount: self.config.forward_amount,
            bounce: false,
            body: None,
        };
        let signed = sign_transfer(
            &forward,
            &self.funding_address,
            funding_seq,
            None,
            &self.funding_keys,
        );
        let receipt = self.chain.submit(&signed).await?;
        info!(hash = %receipt.hash, amount = %self.config.forward_amount, "forward transfer submitted");

        poll::wait_for_change(
            "funding sequence",
            funding_seq,
            self.reader_for(&self.funding_address, |chain, addr| async move {
                chain.sequence(&addr).await
            }),
            &policy,
            &self.cancel,
        )
        .await?;
        info!("forward transfer confirmed");

        // Deposit wait: the generated balance must rise above its baseline.
        let generated_seq = self.chain.sequence(&generated).await?;
        let balance = self.chain.balance(&generated).await?;
        info!(sequence = generated_seq, balance = %balance, "generated account state");

        poll::wait_for_increase(
            "generated balance",
            balance,
            self.reader_for(&generated, |chain, addr| async move {
                chain.balance(&addr).await
            }),
            &policy,
            &self.cancel,
        )
        .await?;
        info!("deposit arrived");

        // Return leg: generated → funding.
        let valid_until = unix_now() + RETURN_VALIDITY_SECS;
        let back = TransferIntent {
            to: self.funding_address.clone(),
            amount: self.config.return_amount,
            bounce: false,
            body: Some(RETURN_BODY.to_string()),
        };
        let signed = sign_transfer(&back, &generated, generated_seq, Some(valid_until), &keys);
        let receipt = self.chain.submit(&signed).await?;
        info!(hash = %receipt.hash, amount = %self.config.return_amount, "return transfer submitted");

        poll::wait_for_change(
            "generated sequence",
            generated_seq,
            self.reader_for(&generated, |chain, addr| async move {
                chain.sequence(&addr).await
            }),
            &policy,
            &self.cancel,
        )
        .await?;
        info!("return transfer confirmed");

        Ok(())
    }

    /// Build a poll closure reading one account through a cloned chain
    /// handle, so the returned future owns everything it touches.
    fn reader_for<F, Fut, T>(&self, account: &Address, read: F) -> impl FnMut() -> Fut
    where
        F: Fn(C, Address) -> Fut + Copy,
        Fut: std::future::Future<Output = Result<T, WalletError>>,
    {
        let chain = self.chain.clone();
        let addr = account.clone();
        move || read(chain.clone(), addr.clone())
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
