//! Error types for the wallet core.

use crate::types::Signature;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur in a wallet operation.
#[derive(Error, Debug)]
pub enum WalletError {
    /// The keypair file could not be read, decrypted or written.
    #[error("Storage error: {0}")]
    Storage(String),

    /// The amount is not a positive number of whole base units.
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// The recipient does not parse as an address.
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// A transport or RPC failure.
    #[error("Network error: {0}")]
    Network(String),

    /// The transaction was submitted but not confirmed before the deadline.
    #[error(
        "Transaction {signature} was not confirmed within {timeout:?}. \
         It may still be processed; check its status before retrying"
    )]
    ConfirmationTimeout {
        /// Signature of the submitted transaction
        signature: Signature,
        /// How long confirmation was awaited
        timeout: Duration,
    },

    /// The transaction was submitted but checking its status failed.
    #[error(
        "Transaction {signature} was submitted but its status could not be checked ({reason}). \
         It may still be processed; check its status before retrying"
    )]
    ConfirmationUnknown {
        /// Signature of the submitted transaction
        signature: Signature,
        /// Why the status check failed
        reason: String,
    },

    /// The network processed the transaction and reported it as failed.
    #[error("Transaction rejected: {0}")]
    TransactionRejected(String),

    /// The wallet configuration is unusable.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<std::io::Error> for WalletError {
    fn from(error: std::io::Error) -> Self {
        WalletError::Storage(error.to_string())
    }
}

/// Errors from decoding a base58 key, signature or hash.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The input is not valid base58.
    #[error("not valid base58: {0}")]
    Base58(String),

    /// The input decoded to the wrong number of bytes.
    #[error("expected {expected} bytes, got {actual}")]
    Length {
        /// The required length
        expected: usize,
        /// The decoded length
        actual: usize,
    },
}

impl From<bs58::decode::Error> for ParseError {
    fn from(error: bs58::decode::Error) -> Self {
        ParseError::Base58(error.to_string())
    }
}
