//! spinup — entry point.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

use spinup_crypto::{derive_address, generate_mnemonic, keypair_from_mnemonic, WordCount};
use spinup_types::{Amount, NetworkId};
use spinup_wallet::{resolve_endpoint, Cycler, CyclerConfig, NodeClient};

#[derive(Parser)]
#[command(name = "spinup", about = "Cycle funds through fresh accounts on a Meridian network")]
struct Cli {
    /// Network to run against: "live", "test", or "dev".
    /// When a config file is provided, defaults to the file's network value.
    #[arg(long, env = "SPINUP_NETWORK")]
    network: Option<NetworkId>,

    /// RPC endpoint override (defaults to the network's well-known URL).
    #[arg(long, env = "SPINUP_RPC_URL")]
    rpc_url: Option<String>,

    /// Funding account recovery phrase. Prefer the environment variable
    /// or --mnemonic-file over putting this on a command line.
    #[arg(long, env = "SPINUP_MNEMONIC", hide_env_values = true)]
    mnemonic: Option<String>,

    /// Read the funding recovery phrase from a file instead.
    #[arg(long, conflicts_with = "mnemonic")]
    mnemonic_file: Option<PathBuf>,

    /// Number of fresh accounts to cycle funds through.
    #[arg(long, env = "SPINUP_ACCOUNTS")]
    accounts: Option<u32>,

    /// Amount sent funding → generated, in MRD (e.g. "0.02").
    #[arg(long, value_parser = parse_amount)]
    forward_amount: Option<Amount>,

    /// Amount sent generated → funding, in MRD (e.g. "0.01").
    #[arg(long, value_parser = parse_amount)]
    return_amount: Option<Amount>,

    /// Delay between confirmation poll attempts, in milliseconds.
    #[arg(long)]
    poll_interval_ms: Option<u64>,

    /// Maximum poll attempts before a confirmation wait times out.
    #[arg(long)]
    poll_max_attempts: Option<u32>,

    /// Directory for encrypted keystores of generated accounts.
    #[arg(long, env = "SPINUP_KEYSTORE_DIR")]
    keystore_dir: Option<PathBuf>,

    /// Passphrase protecting generated-account keystores.
    #[arg(long, env = "SPINUP_KEYSTORE_PASSPHRASE", hide_env_values = true)]
    keystore_passphrase: Option<String>,

    /// Path to a TOML configuration file. If provided, file settings are
    /// used as the base; CLI flags and env vars override them.
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Run the cycler.
    Run,
    /// Print the funding address derived from the configured mnemonic.
    Address,
    /// Generate and print a fresh recovery phrase.
    Phrase {
        /// Word count: 12 or 24.
        #[arg(long, default_value_t = 24)]
        words: usize,
    },
}

fn parse_amount(s: &str) -> Result<Amount, String> {
    Amount::from_decimal_str(s).map_err(|e| e.to_string())
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}

/// File settings as the base, CLI flags and env vars on top.
fn build_config(cli: &Cli) -> anyhow::Result<CyclerConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("cannot read config file {}", path.display()))?;
            let cfg: CyclerConfig = toml::from_str(&contents)
                .with_context(|| format!("cannot parse config file {}", path.display()))?;
            tracing::info!("loaded config from {}", path.display());
            cfg
        }
        None => CyclerConfig::default(),
    };

    if let Some(file) = &cli.mnemonic_file {
        config.mnemonic = std::fs::read_to_string(file)
            .with_context(|| format!("cannot read mnemonic file {}", file.display()))?
            .trim()
            .to_string();
    } else if let Some(mnemonic) = &cli.mnemonic {
        config.mnemonic = mnemonic.clone();
    }

    if let Some(network) = cli.network {
        config.network = network;
    }
    if let Some(url) = &cli.rpc_url {
        config.rpc_url = Some(url.clone());
    }
    if let Some(accounts) = cli.accounts {
        config.accounts = accounts;
    }
    if let Some(amount) = cli.forward_amount {
        config.forward_amount = amount;
    }
    if let Some(amount) = cli.return_amount {
        config.return_amount = amount;
    }
    if let Some(interval) = cli.poll_interval_ms {
        config.poll_interval_ms = interval;
    }
    if let Some(attempts) = cli.poll_max_attempts {
        config.poll_max_attempts = attempts;
    }
    if let Some(dir) = &cli.keystore_dir {
        config.keystore_dir = Some(dir.clone());
    }
    if let Some(passphrase) = &cli.keystore_passphrase {
        config.keystore_passphrase = Some(passphrase.clone());
    }

    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    match cli.command {
        Command::Run => {
            let config = build_config(&cli)?;
            let endpoint = resolve_endpoint(config.network, config.rpc_url.as_deref());
            tracing::info!(
                network = config.network.as_str(),
                endpoint = %endpoint,
                accounts = config.accounts,
                "starting cycler"
            );

            let client = NodeClient::new(&endpoint)?;
            let cancel = CancellationToken::new();
            let cycler = Cycler::new(config, client, cancel.clone())?;

            let canceller = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::warn!("received SIGINT, finishing current wait and stopping");
                    canceller.cancel();
                }
            });

            let summary = cycler.run().await;
            if summary.failed > 0 {
                anyhow::bail!(
                    "{} of {} account cycles failed",
                    summary.failed,
                    summary.attempted
                );
            }
        }
        Command::Address => {
            let config = build_config(&cli)?;
            if config.mnemonic.trim().is_empty() {
                anyhow::bail!("no mnemonic configured (set SPINUP_MNEMONIC or --mnemonic-file)");
            }
            let keys = keypair_from_mnemonic(&config.mnemonic)?;
            println!("{}", derive_address(&keys.public));
        }
        Command::Phrase { words } => {
            let words = match words {
                12 => WordCount::Twelve,
                24 => WordCount::TwentyFour,
                other => anyhow::bail!("unsupported word count {other} (use 12 or 24)"),
            };
            println!("{}", generate_mnemonic(words)?);
        }
    }

    Ok(())
}
