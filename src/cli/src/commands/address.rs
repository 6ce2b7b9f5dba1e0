//! Address command for the CLI wallet.

use wallet_core::{LedgerClient, Pubkey, WalletCore, WalletError};

/// Runs the address command.
pub fn run<L: LedgerClient>(wallet: &WalletCore<L>) -> Result<Pubkey, WalletError> {
    wallet.address()
}
