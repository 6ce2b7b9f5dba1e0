//! Durable storage for the wallet's single signing keypair.
//!
//! The plaintext file format is a JSON array of the 64 keypair bytes (the
//! 32-byte secret seed followed by the 32-byte public key). This is the
//! format of `solana-keygen`, so existing keypair files can be reused.

use crate::crypto::{EncryptedKeypair, KdfParams};
use crate::errors::WalletError;
use crate::types::Pubkey;
use ed25519_dalek::{SigningKey, KEYPAIR_LENGTH, SECRET_KEY_LENGTH};
use rand::rngs::OsRng;
use serde::Deserialize;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

/// Default location of the keypair file.
pub const DEFAULT_KEYPAIR_PATH: &str = "./wallet-keypair.json";

/// On-disk keypair representations.
#[derive(Deserialize)]
#[serde(untagged)]
enum KeypairFile {
    Plain(Vec<u8>),
    Sealed(EncryptedKeypair),
}

/// Why a keypair could not be read.
enum ReadError {
    /// No file at the path.
    Missing,
    /// The file exists but does not hold a keypair.
    Malformed(String),
    /// The file holds a keypair that cannot be unlocked or read. It must not be overwritten.
    Unavailable(String),
}

/// Loads, generates and persists the wallet keypair.
pub struct KeyStore {
    path: PathBuf,
    passphrase: Option<Zeroizing<String>>,
    kdf_params: KdfParams,
}

impl KeyStore {
    /// Creates a plaintext keystore at the given path.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            passphrase: None,
            kdf_params: KdfParams::default(),
        }
    }

    /// Creates a keystore that encrypts the keypair with a passphrase.
    pub fn with_passphrase<P: AsRef<Path>>(path: P, passphrase: impl Into<String>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            passphrase: Some(Zeroizing::new(passphrase.into())),
            kdf_params: KdfParams::default(),
        }
    }

    /// Overrides the key derivation cost used when encrypting.
    pub fn with_kdf_params(mut self, params: KdfParams) -> Self {
        self.kdf_params = params;
        self
    }

    /// Gets the path of the keypair file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether newly written keypairs are encrypted.
    pub fn is_encrypted(&self) -> bool {
        self.passphrase.is_some()
    }

    /// Whether the keypair file currently on disk is passphrase-encrypted.
    ///
    /// This can differ from [`KeyStore::is_encrypted`]: an existing plaintext
    /// file is read as is by an encrypting store. A missing file counts as
    /// not encrypted.
    pub fn file_is_encrypted(&self) -> Result<bool, WalletError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => Zeroizing::new(contents),
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
            Err(e) => {
                return Err(WalletError::Storage(format!(
                    "cannot read keypair at {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        Ok(matches!(
            serde_json::from_str::<KeypairFile>(&contents),
            Ok(KeypairFile::Sealed(_))
        ))
    }

    /// Returns the stored keypair, generating and persisting one if the file
    /// is missing or malformed.
    ///
    /// A file that exists but cannot be unlocked (wrong passphrase, or
    /// encrypted while no passphrase is configured) is never overwritten; it
    /// surfaces as [`WalletError::Storage`], as does a failed write.
    pub fn ensure_keypair(&self) -> Result<SigningKey, WalletError> {
        match self.read() {
            Ok(keypair) => {
                debug!(
                    "Loaded keypair {} from {}",
                    Pubkey::from(&keypair.verifying_key()),
                    self.path.display()
                );
                Ok(keypair)
            }
            Err(ReadError::Missing) => {
                info!("No keypair at {}, generating a new one", self.path.display());
                self.create()
            }
            Err(ReadError::Malformed(reason)) => {
                warn!(
                    "Keypair file {} is malformed ({}), replacing it with a new keypair",
                    self.path.display(),
                    reason
                );
                self.create()
            }
            Err(ReadError::Unavailable(reason)) => Err(WalletError::Storage(format!(
                "cannot read keypair at {}: {}",
                self.path.display(),
                reason
            ))),
        }
    }

    /// Loads the stored keypair without any fallback.
    pub fn load(&self) -> Result<SigningKey, WalletError> {
        self.read().map_err(|e| {
            let reason = match e {
                ReadError::Missing => "file not found".to_string(),
                ReadError::Malformed(reason) | ReadError::Unavailable(reason) => reason,
            };
            WalletError::Storage(format!(
                "cannot read keypair at {}: {}",
                self.path.display(),
                reason
            ))
        })
    }

    /// Writes a keypair atomically: to a temporary file in the target
    /// directory, which is then renamed over the keypair path.
    pub fn save(&self, keypair: &SigningKey) -> Result<(), WalletError> {
        let bytes = Zeroizing::new(keypair.to_keypair_bytes());
        let contents = match &self.passphrase {
            Some(passphrase) => {
                let envelope = EncryptedKeypair::seal(&bytes[..], passphrase, self.kdf_params)?;
                serde_json::to_string_pretty(&envelope)
            }
            None => serde_json::to_string(&bytes[..]),
        }
        .map(Zeroizing::new)
        .map_err(|e| WalletError::Storage(format!("failed to serialize keypair: {}", e)))?;

        self.write_atomic(contents.as_bytes()).map_err(|e| {
            WalletError::Storage(format!(
                "failed to write keypair to {}: {}",
                self.path.display(),
                e
            ))
        })?;

        info!(
            "Saved {} keypair to {}",
            if self.is_encrypted() { "encrypted" } else { "plaintext" },
            self.path.display()
        );
        Ok(())
    }

    fn create(&self) -> Result<SigningKey, WalletError> {
        let keypair = generate_keypair();
        self.save(&keypair)?;
        Ok(keypair)
    }

    fn read(&self) -> Result<SigningKey, ReadError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => Zeroizing::new(contents),
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(ReadError::Missing),
            Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                return Err(ReadError::Malformed(e.to_string()))
            }
            Err(e) => return Err(ReadError::Unavailable(e.to_string())),
        };

        let file: KeypairFile = serde_json::from_str(&contents)
            .map_err(|e| ReadError::Malformed(format!("not a keypair file: {}", e)))?;

        match file {
            KeypairFile::Plain(bytes) => {
                let bytes = Zeroizing::new(bytes);
                keypair_from_bytes(&bytes).map_err(ReadError::Malformed)
            }
            KeypairFile::Sealed(envelope) => {
                let passphrase = self.passphrase.as_ref().ok_or_else(|| {
                    ReadError::Unavailable(
                        "keypair is encrypted and no passphrase was provided".to_string(),
                    )
                })?;
                let bytes = envelope
                    .open(passphrase)
                    .map_err(|e| ReadError::Unavailable(e.to_string()))?;
                keypair_from_bytes(&bytes).map_err(ReadError::Unavailable)
            }
        }
    }

    fn write_atomic(&self, data: &[u8]) -> io::Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        // NamedTempFile is created with mode 0600 on unix
        let mut file = NamedTempFile::new_in(&dir)?;
        file.write_all(data)?;
        file.as_file().sync_all()?;
        file.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }
}

/// Generates a keypair from the operating system's CSPRNG.
pub fn generate_keypair() -> SigningKey {
    SigningKey::generate(&mut OsRng)
}

/// Parses the 64-byte keypair layout, checking that the public half is the
/// one the secret derives.
pub fn keypair_from_bytes(bytes: &[u8]) -> Result<SigningKey, String> {
    if bytes.len() != KEYPAIR_LENGTH {
        return Err(format!(
            "expected {} bytes, got {}",
            KEYPAIR_LENGTH,
            bytes.len()
        ));
    }

    let mut secret = Zeroizing::new([0u8; SECRET_KEY_LENGTH]);
    secret.copy_from_slice(&bytes[..SECRET_KEY_LENGTH]);
    let keypair = SigningKey::from_bytes(&secret);
    if keypair.verifying_key().as_bytes()[..] != bytes[SECRET_KEY_LENGTH..] {
        return Err("public key does not match secret key".to_string());
    }

    Ok(keypair)
}
