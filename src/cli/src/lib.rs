//! Command-line wallet for Solana-style test networks.

pub mod commands;
pub mod config;
pub mod rpc;

// Re-export commonly used types and functions
pub use commands::{address, airdrop, balance, generate, send};
pub use config::WalletConfig;
pub use rpc::{Commitment, RpcLedgerClient};
