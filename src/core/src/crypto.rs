//! Passphrase encryption of keypair bytes at rest.
//!
//! The key is derived with Argon2id and the secret is sealed with
//! ChaCha20-Poly1305. The KDF cost is stored in the envelope so files written
//! with other parameters stay readable.

use crate::errors::WalletError;
use argon2::{Algorithm, Argon2, Params, Version};
use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Nonce,
};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

/// Current envelope format version.
const ENVELOPE_VERSION: u32 = 1;

const KDF_ALGORITHM: &str = "argon2id";
const SALT_LENGTH: usize = 16;
const NONCE_LENGTH: usize = 12;
const KEY_LENGTH: usize = 32;

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KdfParams {
    /// Memory cost in KiB
    pub memory_kib: u32,
    /// Number of passes
    pub iterations: u32,
    /// Degree of parallelism
    pub parallelism: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            memory_kib: 65536, // 64 MiB
            iterations: 3,
            parallelism: 4,
        }
    }
}

/// An encrypted keypair file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncryptedKeypair {
    /// Envelope format version
    version: u32,
    /// Name of the key derivation function
    kdf: String,
    /// Key derivation cost
    kdf_params: KdfParams,
    /// Argon2 salt (hex)
    salt: String,
    /// ChaCha20-Poly1305 nonce (hex)
    nonce: String,
    /// Sealed secret key bytes (hex)
    ciphertext: String,
}

impl EncryptedKeypair {
    /// Seals `secret` under a key derived from `passphrase`.
    pub fn seal(secret: &[u8], passphrase: &str, params: KdfParams) -> Result<Self, WalletError> {
        let mut salt = [0u8; SALT_LENGTH];
        OsRng.fill_bytes(&mut salt);
        let mut nonce = [0u8; NONCE_LENGTH];
        OsRng.fill_bytes(&mut nonce);

        let key = derive_key(passphrase, &salt, params)?;
        let cipher = ChaCha20Poly1305::new_from_slice(&key[..])
            .map_err(|_| WalletError::Storage("failed to initialize cipher".to_string()))?;
        let ciphertext = cipher
            .encrypt(Nonce::from_slice(&nonce), secret)
            .map_err(|_| WalletError::Storage("failed to encrypt keypair".to_string()))?;

        Ok(Self {
            version: ENVELOPE_VERSION,
            kdf: KDF_ALGORITHM.to_string(),
            kdf_params: params,
            salt: hex::encode(salt),
            nonce: hex::encode(nonce),
            ciphertext: hex::encode(ciphertext),
        })
    }

    /// Opens the envelope, returning the secret key bytes.
    pub fn open(&self, passphrase: &str) -> Result<Zeroizing<Vec<u8>>, WalletError> {
        if self.version != ENVELOPE_VERSION {
            return Err(WalletError::Storage(format!(
                "unsupported keypair envelope version {} (expected {})",
                self.version, ENVELOPE_VERSION
            )));
        }
        if self.kdf != KDF_ALGORITHM {
            return Err(WalletError::Storage(format!(
                "unsupported key derivation function '{}'",
                self.kdf
            )));
        }

        let salt = decode_field("salt", &self.salt)?;
        let nonce = decode_field("nonce", &self.nonce)?;
        let ciphertext = decode_field("ciphertext", &self.ciphertext)?;
        if nonce.len() != NONCE_LENGTH {
            return Err(WalletError::Storage(format!(
                "invalid nonce length {} (expected {})",
                nonce.len(),
                NONCE_LENGTH
            )));
        }

        let key = derive_key(passphrase, &salt, self.kdf_params)?;
        let cipher = ChaCha20Poly1305::new_from_slice(&key[..])
            .map_err(|_| WalletError::Storage("failed to initialize cipher".to_string()))?;
        let plaintext = cipher
            .decrypt(Nonce::from_slice(&nonce), ciphertext.as_slice())
            .map_err(|_| {
                WalletError::Storage("failed to decrypt keypair (wrong passphrase?)".to_string())
            })?;

        Ok(Zeroizing::new(plaintext))
    }
}

fn decode_field(name: &str, value: &str) -> Result<Vec<u8>, WalletError> {
    hex::decode(value).map_err(|e| WalletError::Storage(format!("invalid {} encoding: {}", name, e)))
}

/// Derives a 32-byte cipher key from a passphrase with Argon2id.
fn derive_key(
    passphrase: &str,
    salt: &[u8],
    params: KdfParams,
) -> Result<Zeroizing<[u8; KEY_LENGTH]>, WalletError> {
    let params = Params::new(
        params.memory_kib,
        params.iterations,
        params.parallelism,
        Some(KEY_LENGTH),
    )
    .map_err(|e| WalletError::Storage(format!("invalid key derivation parameters: {}", e)))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut key = Zeroizing::new([0u8; KEY_LENGTH]);
    argon2
        .hash_password_into(passphrase.as_bytes(), salt, &mut key[..])
        .map_err(|e| WalletError::Storage(format!("key derivation failed: {}", e)))?;

    Ok(key)
}
