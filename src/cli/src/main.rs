//! Command-line wallet for Solana-style test networks.

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::PathBuf;
use structopt::StructOpt;
use tracing::debug;
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use wallet_cli::commands::{self, address, airdrop, balance, generate, send};
use wallet_cli::{Commitment, RpcLedgerClient, WalletConfig};
use wallet_core::{KeyStore, WalletCore};

/// Command line arguments for the CLI wallet.
#[derive(Debug, StructOpt)]
#[structopt(name = "wallet", about = "Keypair-backed wallet for Solana-style test networks")]
struct Opt {
    /// Path to the configuration file
    #[structopt(short, long, parse(from_os_str))]
    config: Option<PathBuf>,

    /// Path to the keypair file
    #[structopt(short, long, parse(from_os_str))]
    keypair: Option<PathBuf>,

    /// RPC endpoint URL or moniker (devnet, testnet, mainnet-beta, localhost)
    #[structopt(short, long)]
    url: Option<String>,

    /// Confirmation level: processed, confirmed or finalized
    #[structopt(long)]
    commitment: Option<Commitment>,

    /// Encrypt the keypair file with a passphrase
    #[structopt(long)]
    encrypt: bool,

    /// Subcommand to run
    #[structopt(subcommand)]
    cmd: Command,
}

/// Subcommands for the CLI wallet.
#[derive(Debug, StructOpt)]
enum Command {
    /// Create the wallet keypair, or show the existing one
    #[structopt(name = "generate-keypair")]
    GenerateKeypair {
        /// Also print the secret key bytes
        #[structopt(long)]
        reveal: bool,
    },

    /// Request test-network funds
    #[structopt(name = "airdrop")]
    Airdrop {
        /// Amount in SOL
        #[structopt(allow_hyphen_values = true)]
        amount: String,
    },

    /// Check the wallet balance
    #[structopt(name = "balance")]
    Balance,

    /// Send SOL to an address
    #[structopt(name = "send")]
    Send {
        /// Amount in SOL
        #[structopt(allow_hyphen_values = true)]
        amount: String,

        /// Recipient address (base58)
        recipient: String,
    },

    /// Print the wallet address
    #[structopt(name = "address")]
    Address,
}

#[tokio::main]
async fn main() {
    // Logs go to stderr so command output stays clean
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("{} failed to initialize logging: {}", "Warning:".yellow(), e);
    }

    let opt = Opt::from_args();
    if let Err(e) = run(opt).await {
        eprintln!("{} {:#}", "Error:".red(), e);
        std::process::exit(1);
    }
}

async fn run(opt: Opt) -> Result<()> {
    // Load configuration
    let mut config = match &opt.config {
        Some(path) => WalletConfig::from_file(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => WalletConfig::default(),
    };

    // Command-line flags override the file
    if let Some(url) = opt.url {
        config.url = url;
    }
    if let Some(keypair) = opt.keypair {
        config.keypair_path = keypair;
    }
    if let Some(commitment) = opt.commitment {
        config.commitment = commitment;
    }
    if opt.encrypt {
        config.encrypt_keypair = true;
    }
    config.validate()?;
    debug!("Using config {:?}", config);

    let keystore = if config.encrypt_keypair {
        let passphrase = commands::read_passphrase(&config.keypair_path)?;
        KeyStore::with_passphrase(&config.keypair_path, passphrase.as_str())
    } else {
        KeyStore::new(&config.keypair_path)
    };
    let ledger = RpcLedgerClient::new(
        config.rpc_url(),
        config.commitment,
        config.request_timeout(),
    )?;
    let wallet = WalletCore::new(keystore, ledger).with_confirm_policy(config.confirm_policy());

    match opt.cmd {
        Command::GenerateKeypair { reveal } => {
            let output = generate::run(&wallet, reveal)?;
            println!("{} {}", "Public Key:".green(), output.pubkey);
            println!(
                "{} {}{}",
                "Keypair saved to".green(),
                output.path.display(),
                if output.encrypted { " (encrypted)" } else { "" }
            );
            if config.encrypt_keypair && !output.encrypted {
                println!(
                    "{}",
                    "WARNING: The existing keypair file is plaintext and was left unencrypted."
                        .yellow()
                );
            }
            if let Some(secret) = output.secret {
                println!("{} {:?}", "Secret Key:".green(), secret.as_slice());
                println!("{}", "WARNING: Keep this secret key safe and private!".red());
            }
        }
        Command::Airdrop { amount } => {
            let (pubkey, receipt) = airdrop::run(&wallet, &amount).await?;
            println!("{} {} SOL to {}", "Airdropped".green(), amount.trim(), pubkey);
            println!("{} {}", "Signature:".green(), receipt.signature);
        }
        Command::Balance => {
            let output = balance::run(&wallet).await?;
            println!("{} {}", "Address:".green(), output.pubkey);
            println!("{} {} SOL", "Balance:".green(), output.sol);
        }
        Command::Send { amount, recipient } => {
            let receipt = send::run(&wallet, &amount, &recipient).await?;
            println!(
                "{} {} SOL to {}",
                "Sent".green(),
                amount.trim(),
                recipient.trim()
            );
            println!("{} {}", "Transaction signature:".green(), receipt.signature);
        }
        Command::Address => {
            let pubkey = address::run(&wallet)?;
            println!("{}", pubkey);
        }
    }

    Ok(())
}
