//! Keypair-backed transaction wallet core.
//!
//! This crate owns the single signing keypair of a local wallet, builds and
//! signs native transfers, and drives a [`LedgerClient`] through the four
//! wallet operations: generate, airdrop, balance and send.

pub mod crypto;
pub mod errors;
pub mod keystore;
pub mod ledger;
pub mod transaction;
pub mod types;
pub mod units;
pub mod wallet;

// Re-export commonly used types
pub use errors::{ParseError, WalletError};
pub use keystore::{KeyStore, DEFAULT_KEYPAIR_PATH};
pub use ledger::LedgerClient;
pub use transaction::SignedTransaction;
pub use types::{Hash, Pubkey, Signature, TransactionReceipt, TransferRequest};
pub use units::{lamports_to_sol, sol_to_lamports, LAMPORTS_PER_SOL};
pub use wallet::{ConfirmPolicy, WalletCore};
