//! Core types for the wallet.

use crate::errors::ParseError;
use ed25519_dalek::VerifyingKey;
use std::fmt;
use std::str::FromStr;

/// Length of a public key, and therefore of an address, in bytes.
pub const PUBKEY_LENGTH: usize = 32;

/// Length of an ed25519 signature in bytes.
pub const SIGNATURE_LENGTH: usize = 64;

/// Length of a blockhash in bytes.
pub const HASH_LENGTH: usize = 32;

/// Decodes a base58 string into exactly `N` bytes.
fn decode_base58<const N: usize>(s: &str) -> Result<[u8; N], ParseError> {
    let bytes = bs58::decode(s).into_vec()?;
    if bytes.len() != N {
        return Err(ParseError::Length {
            expected: N,
            actual: bytes.len(),
        });
    }

    let mut out = [0u8; N];
    out.copy_from_slice(&bytes);
    Ok(out)
}

/// A 32-byte public key. Its base58 form is the account address.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pubkey(pub [u8; PUBKEY_LENGTH]);

impl Pubkey {
    /// Creates a public key from raw bytes.
    pub const fn new(bytes: [u8; PUBKEY_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Returns the raw bytes.
    pub fn as_bytes(&self) -> &[u8; PUBKEY_LENGTH] {
        &self.0
    }
}

impl From<&VerifyingKey> for Pubkey {
    fn from(key: &VerifyingKey) -> Self {
        Self(key.to_bytes())
    }
}

impl FromStr for Pubkey {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_base58(s).map(Self)
    }
}

impl fmt::Display for Pubkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bs58::encode(self.0).into_string())
    }
}

impl fmt::Debug for Pubkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pubkey({})", self)
    }
}

/// A 64-byte transaction signature. Its base58 form identifies the transaction.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Signature(pub [u8; SIGNATURE_LENGTH]);

impl Signature {
    /// Returns the raw bytes.
    pub fn as_bytes(&self) -> &[u8; SIGNATURE_LENGTH] {
        &self.0
    }
}

impl From<ed25519_dalek::Signature> for Signature {
    fn from(signature: ed25519_dalek::Signature) -> Self {
        Self(signature.to_bytes())
    }
}

impl FromStr for Signature {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_base58(s).map(Self)
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bs58::encode(self.0).into_string())
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({})", self)
    }
}

/// A recent blockhash, which bounds how long a signed transaction stays valid.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Hash(pub [u8; HASH_LENGTH]);

impl FromStr for Hash {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_base58(s).map(Self)
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bs58::encode(self.0).into_string())
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash({})", self)
    }
}

/// A native transfer from the wallet's keypair, built per `send` and never persisted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransferRequest {
    /// The recipient
    pub to: Pubkey,
    /// The amount in base units
    pub lamports: u64,
}

/// The outcome of a submitted transaction, for display only.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransactionReceipt {
    /// The transaction signature
    pub signature: Signature,
    /// Whether the network confirmed the transaction
    pub confirmed: bool,
}

impl fmt::Display for TransactionReceipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = if self.confirmed { "confirmed" } else { "unconfirmed" };
        write!(f, "{} ({})", self.signature, status)
    }
}
