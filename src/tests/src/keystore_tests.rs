//! Tests for keypair persistence.

use ed25519_dalek::SigningKey;
use std::fs;
use tempfile::tempdir;
use wallet_core::crypto::KdfParams;
use wallet_core::keystore::{generate_keypair, keypair_from_bytes};
use wallet_core::{KeyStore, WalletError};

const FAST_KDF: KdfParams = KdfParams {
    memory_kib: 8,
    iterations: 1,
    parallelism: 1,
};

/// Tests the first-run file layout and that the public key follows from the secret.
#[test]
fn test_fresh_keypair_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("wallet-keypair.json");
    let keypair = KeyStore::new(&path).ensure_keypair().unwrap();

    let bytes: Vec<u8> = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(bytes.len(), 64);

    // Derive the public key again, independently of the keystore
    let mut secret = [0u8; 32];
    secret.copy_from_slice(&bytes[..32]);
    let derived = SigningKey::from_bytes(&secret).verifying_key();
    assert_eq!(derived, keypair.verifying_key());
    assert_eq!(&bytes[32..], keypair.verifying_key().as_bytes());
}

/// Tests that repeated loads of a populated file are bit-identical.
#[test]
fn test_ensure_keypair_idempotent() {
    let dir = tempdir().unwrap();
    let store = KeyStore::new(dir.path().join("wallet-keypair.json"));

    let first = store.ensure_keypair().unwrap().to_keypair_bytes();
    let second = store.ensure_keypair().unwrap().to_keypair_bytes();
    let third = KeyStore::new(store.path()).load().unwrap().to_keypair_bytes();
    assert_eq!(first[..], second[..]);
    assert_eq!(first[..], third[..]);
}

/// Tests that a keypair written by one store is read back by another.
#[test]
fn test_save_then_load() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("id.json");
    let keypair = generate_keypair();

    KeyStore::new(&path).save(&keypair).unwrap();
    let loaded = KeyStore::new(&path).load().unwrap();
    assert_eq!(loaded.verifying_key(), keypair.verifying_key());
    assert_eq!(loaded.to_bytes(), keypair.to_bytes());
}

/// Tests that a file written by the reference keygen format is accepted as is.
#[test]
fn test_reads_existing_keygen_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("id.json");
    let keypair = generate_keypair();
    let contents = serde_json::to_string(&keypair.to_keypair_bytes().to_vec()).unwrap();
    fs::write(&path, &contents).unwrap();

    let loaded = KeyStore::new(&path).ensure_keypair().unwrap();
    assert_eq!(loaded.to_keypair_bytes()[..], keypair.to_keypair_bytes()[..]);
    // The file is left untouched
    assert_eq!(fs::read_to_string(&path).unwrap(), contents);
}

/// Tests that unusable files are replaced with a fresh keypair.
#[test]
fn test_malformed_files_are_replaced() {
    let dir = tempdir().unwrap();
    let cases = [
        "",
        "{}",
        "[1, 2, 3]",
        "[300, 1]",
        "\"not an array\"",
    ];

    for (i, contents) in cases.iter().enumerate() {
        let path = dir.path().join(format!("bad-{}.json", i));
        fs::write(&path, contents).unwrap();

        let keypair = KeyStore::new(&path).ensure_keypair().unwrap();
        let bytes: Vec<u8> = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(bytes, keypair.to_keypair_bytes().to_vec(), "case {:?}", contents);
    }
}

/// Tests that the public half must match the secret.
#[test]
fn test_inconsistent_keypair_is_rejected() {
    let a = generate_keypair().to_keypair_bytes();
    let b = generate_keypair().to_keypair_bytes();
    let mut mixed = [0u8; 64];
    mixed[..32].copy_from_slice(&a[..32]);
    mixed[32..].copy_from_slice(&b[32..]);

    assert!(keypair_from_bytes(&a).is_ok());
    assert!(keypair_from_bytes(&mixed).is_err());
}

/// Tests the encrypted mode from creation to reload.
#[test]
fn test_encrypted_keypair_lifecycle() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("id.json");

    let store = KeyStore::with_passphrase(&path, "passphrase").with_kdf_params(FAST_KDF);
    assert!(store.is_encrypted());
    let keypair = store.ensure_keypair().unwrap();

    let contents = fs::read_to_string(&path).unwrap();
    let envelope: serde_json::Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(envelope["version"], 1);
    assert_eq!(envelope["kdf"], "argon2id");

    let reloaded = KeyStore::with_passphrase(&path, "passphrase")
        .ensure_keypair()
        .unwrap();
    assert_eq!(reloaded.to_keypair_bytes()[..], keypair.to_keypair_bytes()[..]);

    assert!(matches!(
        KeyStore::with_passphrase(&path, "other").load(),
        Err(WalletError::Storage(_))
    ));
    assert_eq!(fs::read_to_string(&path).unwrap(), contents);
}

/// Tests that an unwritable location surfaces as a storage error.
#[cfg(unix)]
#[test]
fn test_unwritable_directory() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    let locked = dir.path().join("locked");
    fs::create_dir(&locked).unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o500)).unwrap();

    // Root ignores directory permissions, so only check when the lock holds
    let enforced = fs::write(locked.join("probe"), b"x").is_err();
    let result = KeyStore::new(locked.join("id.json")).ensure_keypair();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o700)).unwrap();

    if enforced {
        assert!(matches!(result, Err(WalletError::Storage(_))));
    }
}
