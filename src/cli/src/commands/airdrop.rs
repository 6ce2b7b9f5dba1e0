//! Airdrop command for the CLI wallet.

use tracing::info;
use wallet_core::units::parse_amount;
use wallet_core::{LedgerClient, Pubkey, TransactionReceipt, WalletCore, WalletError};

/// Runs the airdrop command. `amount` is in display units as typed by the user.
pub async fn run<L: LedgerClient>(
    wallet: &WalletCore<L>,
    amount: &str,
) -> Result<(Pubkey, TransactionReceipt), WalletError> {
    let amount = parse_amount(amount)?;
    let receipt = wallet.request_funds(amount).await?;
    let pubkey = wallet.address()?;
    info!("Airdrop of {} confirmed: {}", amount, receipt.signature);

    Ok((pubkey, receipt))
}
