//! Balance command for the CLI wallet.

use tracing::debug;
use wallet_core::{lamports_to_sol, LedgerClient, Pubkey, WalletCore, WalletError};

/// What `balance` reports.
pub struct BalanceOutput {
    /// The wallet address
    pub pubkey: Pubkey,
    /// Balance in base units
    pub lamports: u64,
    /// Balance in display units
    pub sol: f64,
}

/// Runs the balance command.
pub async fn run<L: LedgerClient>(wallet: &WalletCore<L>) -> Result<BalanceOutput, WalletError> {
    let pubkey = wallet.address()?;
    let lamports = wallet.get_balance_lamports().await?;
    debug!("Balance for {}: {} lamports", pubkey, lamports);

    Ok(BalanceOutput {
        pubkey,
        lamports,
        sol: lamports_to_sol(lamports),
    })
}
