//! Generate keypair command for the CLI wallet.

use std::path::PathBuf;
use tracing::info;
use wallet_core::{LedgerClient, Pubkey, WalletCore, WalletError};
use zeroize::Zeroizing;

/// What `generate-keypair` reports.
pub struct GenerateOutput {
    /// The wallet address
    pub pubkey: Pubkey,
    /// Where the keypair is stored
    pub path: PathBuf,
    /// Whether the file on disk is encrypted
    pub encrypted: bool,
    /// The 64 keypair bytes, only when explicitly requested
    pub secret: Option<Zeroizing<Vec<u8>>>,
}

/// Runs the generate-keypair command.
pub fn run<L: LedgerClient>(
    wallet: &WalletCore<L>,
    reveal: bool,
) -> Result<GenerateOutput, WalletError> {
    let keypair = wallet.generate()?;
    let pubkey = Pubkey::from(&keypair.verifying_key());
    info!("Wallet address: {}", pubkey);

    let secret = if reveal {
        Some(Zeroizing::new(keypair.to_keypair_bytes().to_vec()))
    } else {
        None
    };

    Ok(GenerateOutput {
        pubkey,
        path: wallet.keystore().path().to_path_buf(),
        encrypted: wallet.keystore().file_is_encrypted()?,
        secret,
    })
}
