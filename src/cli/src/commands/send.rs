//! Send command for the CLI wallet.

use tracing::info;
use wallet_core::units::parse_amount;
use wallet_core::{LedgerClient, TransactionReceipt, WalletCore, WalletError};

/// Runs the send command. `amount` is in display units as typed by the user.
pub async fn run<L: LedgerClient>(
    wallet: &WalletCore<L>,
    amount: &str,
    recipient: &str,
) -> Result<TransactionReceipt, WalletError> {
    let amount = parse_amount(amount)?;
    let receipt = wallet.send(amount, recipient).await?;
    info!("Sent {} to {}: {}", amount, recipient, receipt.signature);

    Ok(receipt)
}
