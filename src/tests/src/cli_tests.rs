//! Tests for the CLI command handlers.

use crate::mock::MockLedger;
use std::fs;
use tempfile::{tempdir, TempDir};
use wallet_cli::{airdrop, balance, generate, send, WalletConfig};
use wallet_core::crypto::KdfParams;
use wallet_core::{KeyStore, Pubkey, WalletCore, WalletError};

fn wallet_with(ledger: MockLedger) -> (TempDir, WalletCore<MockLedger>) {
    let dir = tempdir().unwrap();
    let config = WalletConfig {
        keypair_path: dir.path().join("wallet-keypair.json"),
        ..WalletConfig::default()
    };
    let wallet = WalletCore::new(KeyStore::new(&config.keypair_path), ledger)
        .with_confirm_policy(config.confirm_policy());
    (dir, wallet)
}

/// Tests that the secret is only returned when asked for.
#[test]
fn test_generate_hides_secret_by_default() {
    let (dir, wallet) = wallet_with(MockLedger::new(0));

    let output = generate::run(&wallet, false).unwrap();
    assert!(output.secret.is_none());
    assert!(!output.encrypted);
    assert_eq!(output.path, dir.path().join("wallet-keypair.json"));

    let revealed = generate::run(&wallet, true).unwrap();
    assert_eq!(revealed.pubkey, output.pubkey);
    let secret = revealed.secret.unwrap();
    assert_eq!(secret.len(), 64);
    assert_eq!(&secret[32..], output.pubkey.as_bytes());
}

/// Tests that the encryption flag reflects the file, not the requested mode.
#[test]
fn test_generate_reports_stored_encryption() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("wallet-keypair.json");
    let kdf = KdfParams {
        memory_kib: 8,
        iterations: 1,
        parallelism: 1,
    };

    // A plaintext file stays plaintext under an encrypting store
    KeyStore::new(&path).ensure_keypair().unwrap();
    let store = KeyStore::with_passphrase(&path, "pass").with_kdf_params(kdf);
    let output = generate::run(&WalletCore::new(store, MockLedger::new(0)), false).unwrap();
    assert!(!output.encrypted);
    let bytes: Vec<u8> = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(bytes.len(), 64);

    // A fresh file is written encrypted
    let fresh = dir.path().join("fresh.json");
    let store = KeyStore::with_passphrase(&fresh, "pass").with_kdf_params(kdf);
    let output = generate::run(&WalletCore::new(store, MockLedger::new(0)), false).unwrap();
    assert!(output.encrypted);
}

/// Tests that unparsable amounts are reported as invalid amounts.
#[tokio::test]
async fn test_unparsable_amounts() {
    let (_dir, wallet) = wallet_with(MockLedger::new(0));
    let recipient = Pubkey::new([3u8; 32]).to_string();

    assert!(matches!(
        airdrop::run(&wallet, "lots").await,
        Err(WalletError::InvalidAmount(_))
    ));
    assert!(matches!(
        send::run(&wallet, "1,5", &recipient).await,
        Err(WalletError::InvalidAmount(_))
    ));
    assert!(matches!(
        send::run(&wallet, "-2", &recipient).await,
        Err(WalletError::InvalidAmount(_))
    ));
    assert_eq!(wallet.ledger().calls().total(), 0);
}

/// Tests the airdrop handler end to end.
#[tokio::test]
async fn test_airdrop() {
    let (_dir, wallet) = wallet_with(MockLedger::new(0));

    let (pubkey, receipt) = airdrop::run(&wallet, "2").await.unwrap();
    assert!(receipt.confirmed);
    assert_eq!(wallet.ledger().airdrops(), vec![(pubkey, 2_000_000_000)]);
}

/// Tests the balance handler output in both units.
#[tokio::test]
async fn test_balance() {
    let (_dir, wallet) = wallet_with(MockLedger::new(2_500_000_000));

    let output = balance::run(&wallet).await.unwrap();
    assert_eq!(output.lamports, 2_500_000_000);
    assert_eq!(output.sol, 2.5);
    assert_eq!(output.pubkey, wallet.address().unwrap());
}

/// Tests that an invalid recipient never reaches submission.
#[tokio::test]
async fn test_send_invalid_address() {
    let (_dir, wallet) = wallet_with(MockLedger::new(2_500_000_000));

    let result = send::run(&wallet, "1.0", "invalid-address").await;
    assert!(matches!(result, Err(WalletError::InvalidAddress(_))));
    assert_eq!(wallet.ledger().calls().submit, 0);
}

/// Tests the send handler end to end.
#[tokio::test]
async fn test_send() {
    let (_dir, wallet) = wallet_with(MockLedger::new(2_500_000_000));
    let recipient = Pubkey::new([3u8; 32]).to_string();

    let receipt = send::run(&wallet, "1.25", &recipient).await.unwrap();
    assert!(receipt.confirmed);
    assert_eq!(wallet.ledger().calls().submit, 1);
}
