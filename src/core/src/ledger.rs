//! The network boundary the wallet talks to.

use crate::errors::WalletError;
use crate::transaction::SignedTransaction;
use crate::types::{Hash, Pubkey, Signature};
use async_trait::async_trait;

/// A ledger the wallet can query and submit transactions to.
///
/// Implementations report transport and RPC failures as
/// [`WalletError::Network`]. The wallet core never retries a call.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Gets the balance of an account in base units.
    async fn get_balance(&self, pubkey: &Pubkey) -> Result<u64, WalletError>;

    /// Asks the network faucet to fund an account.
    async fn request_airdrop(&self, pubkey: &Pubkey, lamports: u64)
        -> Result<Signature, WalletError>;

    /// Gets a recent blockhash to sign transactions against.
    async fn latest_blockhash(&self) -> Result<Hash, WalletError>;

    /// Submits a signed transaction.
    async fn submit(&self, transaction: &SignedTransaction) -> Result<Signature, WalletError>;

    /// Checks whether a transaction has reached the configured confirmation level.
    ///
    /// Returns [`WalletError::TransactionRejected`] if the network processed
    /// the transaction and it failed.
    async fn confirm(&self, signature: &Signature) -> Result<bool, WalletError>;
}
