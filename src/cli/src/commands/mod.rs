//! Commands for the CLI wallet.
//!
//! Each handler takes the wallet core by reference and returns what `main`
//! prints; none of them writes to the terminal itself.

pub mod address;
pub mod airdrop;
pub mod balance;
pub mod generate;
pub mod send;

use anyhow::{bail, Result};
use std::env;
use std::path::Path;
use zeroize::Zeroizing;

/// Environment variable that supplies the keypair passphrase non-interactively.
pub const PASSPHRASE_ENV: &str = "WALLET_PASSPHRASE";

/// Reads the keypair passphrase from the environment, or prompts for it.
///
/// When no keypair file exists yet the prompt asks twice, since the
/// passphrase is about to encrypt a new key.
pub fn read_passphrase(keypair_path: &Path) -> Result<Zeroizing<String>> {
    if let Ok(passphrase) = env::var(PASSPHRASE_ENV) {
        let passphrase = Zeroizing::new(passphrase);
        if passphrase.is_empty() {
            bail!("{} is set but empty", PASSPHRASE_ENV);
        }
        return Ok(passphrase);
    }

    let passphrase = Zeroizing::new(rpassword::prompt_password("Keypair passphrase: ")?);
    if passphrase.is_empty() {
        bail!("passphrase must not be empty");
    }

    if !keypair_path.exists() {
        let confirm = Zeroizing::new(rpassword::prompt_password("Confirm passphrase: ")?);
        if *confirm != *passphrase {
            bail!("passphrases do not match");
        }
    }

    Ok(passphrase)
}
