//! Configuration for the CLI wallet.

use crate::rpc::Commitment;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;
use wallet_core::{ConfirmPolicy, WalletError, DEFAULT_KEYPAIR_PATH};

/// Public devnet RPC endpoint.
pub const DEVNET_URL: &str = "https://api.devnet.solana.com";
/// Public testnet RPC endpoint.
pub const TESTNET_URL: &str = "https://api.testnet.solana.com";
/// Public mainnet RPC endpoint.
pub const MAINNET_URL: &str = "https://api.mainnet-beta.solana.com";
/// Local test validator RPC endpoint.
pub const LOCALHOST_URL: &str = "http://127.0.0.1:8899";

/// Configuration for the CLI wallet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalletConfig {
    /// RPC endpoint URL or network moniker
    pub url: String,
    /// Path to the keypair file
    pub keypair_path: PathBuf,
    /// Confirmation level transactions must reach
    pub commitment: Commitment,
    /// Seconds to wait for a transaction to confirm
    pub confirm_timeout_secs: u64,
    /// Milliseconds between confirmation checks
    pub poll_interval_ms: u64,
    /// Seconds before a single RPC request is abandoned
    pub request_timeout_secs: u64,
    /// Whether the keypair file is encrypted with a passphrase
    pub encrypt_keypair: bool,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            url: DEVNET_URL.to_string(),
            keypair_path: PathBuf::from(DEFAULT_KEYPAIR_PATH),
            commitment: Commitment::Confirmed,
            confirm_timeout_secs: 60,
            poll_interval_ms: 500,
            request_timeout_secs: 30,
            encrypt_keypair: false,
        }
    }
}

impl WalletConfig {
    /// Loads configuration from a file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        let config = serde_json::from_str(&contents)?;
        Ok(config)
    }

    /// Gets the RPC endpoint, with network monikers resolved.
    pub fn rpc_url(&self) -> String {
        resolve_url(&self.url)
    }

    /// Checks the values that would only fail later, mid-operation.
    pub fn validate(&self) -> Result<(), WalletError> {
        let url = self.rpc_url();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(WalletError::Config(format!(
                "RPC url must be http(s) or a network moniker, got '{}'",
                self.url
            )));
        }

        let durations = [
            ("confirm_timeout_secs", self.confirm_timeout_secs),
            ("poll_interval_ms", self.poll_interval_ms),
            ("request_timeout_secs", self.request_timeout_secs),
        ];
        for (name, value) in durations {
            if value == 0 {
                return Err(WalletError::Config(format!("{} must be positive", name)));
            }
        }
        Ok(())
    }

    /// Gets the confirmation policy for the wallet core.
    pub fn confirm_policy(&self) -> ConfirmPolicy {
        ConfirmPolicy {
            timeout: Duration::from_secs(self.confirm_timeout_secs),
            poll_interval: Duration::from_millis(self.poll_interval_ms),
        }
    }

    /// Gets the per-request timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Resolves a network moniker to its RPC endpoint. Anything else is returned unchanged.
pub fn resolve_url(input: &str) -> String {
    match input {
        "devnet" | "d" => DEVNET_URL.to_string(),
        "testnet" | "t" => TESTNET_URL.to_string(),
        "mainnet-beta" | "m" => MAINNET_URL.to_string(),
        "localhost" | "l" => LOCALHOST_URL.to_string(),
        url => url.to_string(),
    }
}
