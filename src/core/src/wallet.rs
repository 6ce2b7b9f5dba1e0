//! The wallet core: one keypair, one ledger, four operations.

use crate::errors::WalletError;
use crate::keystore::KeyStore;
use crate::ledger::LedgerClient;
use crate::transaction::SignedTransaction;
use crate::types::{Pubkey, Signature, TransactionReceipt, TransferRequest};
use crate::units::{lamports_to_sol, sol_to_lamports};
use ed25519_dalek::SigningKey;
use std::sync::OnceLock;
use std::time::Duration;
use tokio::time::{sleep, timeout_at, Instant};
use tracing::{debug, info, warn};

/// How long to wait for a submitted transaction to confirm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmPolicy {
    /// Deadline for confirmation, measured from submission
    pub timeout: Duration,
    /// Delay between status checks
    pub poll_interval: Duration,
}

impl Default for ConfirmPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            poll_interval: Duration::from_millis(500),
        }
    }
}

/// A wallet bound to a keystore and a ledger.
///
/// Every operation validates its input before touching the keystore or the
/// network, and none of them retries. A failed operation is retried by
/// invoking it again. The keypair is read from the keystore at most once.
pub struct WalletCore<L> {
    keystore: KeyStore,
    ledger: L,
    confirm: ConfirmPolicy,
    keypair: OnceLock<SigningKey>,
}

impl<L: LedgerClient> WalletCore<L> {
    /// Creates a wallet with the default confirmation policy.
    pub fn new(keystore: KeyStore, ledger: L) -> Self {
        Self {
            keystore,
            ledger,
            confirm: ConfirmPolicy::default(),
            keypair: OnceLock::new(),
        }
    }

    /// Sets the confirmation policy.
    pub fn with_confirm_policy(mut self, confirm: ConfirmPolicy) -> Self {
        self.confirm = confirm;
        self
    }

    /// Gets the keystore.
    pub fn keystore(&self) -> &KeyStore {
        &self.keystore
    }

    /// Gets the ledger client.
    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Gets the confirmation policy.
    pub fn confirm_policy(&self) -> ConfirmPolicy {
        self.confirm
    }

    /// Returns the wallet keypair, creating it on first use. No network call is made.
    pub fn generate(&self) -> Result<&SigningKey, WalletError> {
        if let Some(keypair) = self.keypair.get() {
            return Ok(keypair);
        }
        let keypair = self.keystore.ensure_keypair()?;
        Ok(self.keypair.get_or_init(|| keypair))
    }

    /// Gets the wallet's address.
    pub fn address(&self) -> Result<Pubkey, WalletError> {
        Ok(Pubkey::from(&self.generate()?.verifying_key()))
    }

    /// Requests `amount` display units from the network faucet and waits for confirmation.
    pub async fn request_funds(&self, amount: f64) -> Result<TransactionReceipt, WalletError> {
        let lamports = sol_to_lamports(amount)?;
        let pubkey = self.address()?;

        info!("Requesting airdrop of {} lamports to {}", lamports, pubkey);
        let signature = self.ledger.request_airdrop(&pubkey, lamports).await?;
        debug!("Airdrop submitted: {}", signature);

        self.await_confirmation(signature).await
    }

    /// Gets the wallet balance in display units.
    pub async fn get_balance(&self) -> Result<f64, WalletError> {
        Ok(lamports_to_sol(self.get_balance_lamports().await?))
    }

    /// Gets the wallet balance in base units.
    pub async fn get_balance_lamports(&self) -> Result<u64, WalletError> {
        let pubkey = self.address()?;
        let lamports = self.ledger.get_balance(&pubkey).await?;
        debug!("Balance of {}: {} lamports", pubkey, lamports);
        Ok(lamports)
    }

    /// Transfers `amount` display units to `recipient` and waits for confirmation.
    pub async fn send(
        &self,
        amount: f64,
        recipient: &str,
    ) -> Result<TransactionReceipt, WalletError> {
        let lamports = sol_to_lamports(amount)?;
        let to: Pubkey = recipient
            .trim()
            .parse()
            .map_err(|e| WalletError::InvalidAddress(format!("'{}': {}", recipient, e)))?;
        let request = TransferRequest { to, lamports };

        let keypair = self.generate()?;
        let recent_blockhash = self.ledger.latest_blockhash().await?;
        let transaction = SignedTransaction::transfer(keypair, &request, recent_blockhash);

        info!(
            "Sending {} lamports from {} to {}",
            lamports,
            Pubkey::from(&keypair.verifying_key()),
            to
        );
        let signature = self.ledger.submit(&transaction).await?;
        if signature != *transaction.signature() {
            warn!(
                "Ledger returned signature {} for transaction {}",
                signature,
                transaction.signature()
            );
        }

        self.await_confirmation(signature).await
    }

    /// Polls the ledger until the transaction confirms or the deadline passes.
    async fn await_confirmation(
        &self,
        signature: Signature,
    ) -> Result<TransactionReceipt, WalletError> {
        let deadline = Instant::now() + self.confirm.timeout;
        let timed_out = || {
            warn!(
                "Transaction {} not confirmed within {:?}",
                signature, self.confirm.timeout
            );
            WalletError::ConfirmationTimeout {
                signature,
                timeout: self.confirm.timeout,
            }
        };

        loop {
            match timeout_at(deadline, self.ledger.confirm(&signature)).await {
                Ok(Ok(true)) => {
                    debug!("Transaction {} confirmed", signature);
                    return Ok(TransactionReceipt {
                        signature,
                        confirmed: true,
                    });
                }
                Ok(Ok(false)) => {}
                Ok(Err(WalletError::TransactionRejected(reason))) => {
                    return Err(WalletError::TransactionRejected(reason))
                }
                // Submission already succeeded, so the signature must reach the caller
                Ok(Err(e)) => {
                    warn!("Status check for transaction {} failed: {}", signature, e);
                    return Err(WalletError::ConfirmationUnknown {
                        signature,
                        reason: e.to_string(),
                    });
                }
                Err(_) => return Err(timed_out()),
            }

            let now = Instant::now();
            if now >= deadline {
                return Err(timed_out());
            }
            sleep(self.confirm.poll_interval.min(deadline - now)).await;
        }
    }
}
