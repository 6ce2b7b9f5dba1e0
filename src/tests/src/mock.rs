//! An in-memory ledger that records every call made to it.

use async_trait::async_trait;
use std::sync::Mutex;
use wallet_core::{Hash, LedgerClient, Pubkey, Signature, SignedTransaction, WalletError};

/// Number of calls made to each ledger method.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CallCounts {
    pub get_balance: usize,
    pub request_airdrop: usize,
    pub latest_blockhash: usize,
    pub submit: usize,
    pub confirm: usize,
}

impl CallCounts {
    /// Total calls across all methods.
    pub fn total(&self) -> usize {
        self.get_balance + self.request_airdrop + self.latest_blockhash + self.submit + self.confirm
    }
}

#[derive(Default)]
struct State {
    calls: CallCounts,
    airdrops: Vec<(Pubkey, u64)>,
    submitted: Vec<SignedTransaction>,
}

/// What a status check reports for a submitted transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfirmOutcome {
    Confirmed,
    Pending,
    Unreachable,
    Rejected,
}

/// A scripted [`LedgerClient`].
pub struct MockLedger {
    balance: u64,
    confirm: ConfirmOutcome,
    network_down: bool,
    blockhash: Hash,
    state: Mutex<State>,
}

impl MockLedger {
    /// A healthy ledger holding `balance` lamports that confirms every transaction.
    pub fn new(balance: u64) -> Self {
        Self {
            balance,
            confirm: ConfirmOutcome::Confirmed,
            network_down: false,
            blockhash: Hash([7u8; 32]),
            state: Mutex::new(State::default()),
        }
    }

    /// A ledger that accepts transactions but never confirms them.
    pub fn never_confirming() -> Self {
        Self {
            confirm: ConfirmOutcome::Pending,
            ..Self::new(0)
        }
    }

    /// A ledger that accepts transactions, then fails every status check.
    pub fn losing_status() -> Self {
        Self {
            confirm: ConfirmOutcome::Unreachable,
            ..Self::new(0)
        }
    }

    /// A ledger that accepts transactions, then reports them as failed.
    pub fn rejecting() -> Self {
        Self {
            confirm: ConfirmOutcome::Rejected,
            ..Self::new(0)
        }
    }

    /// A ledger whose every call fails with a network error.
    pub fn unreachable() -> Self {
        Self {
            network_down: true,
            ..Self::new(0)
        }
    }

    /// The blockhash handed out to signers.
    pub fn blockhash(&self) -> Hash {
        self.blockhash
    }

    /// Snapshot of the call counts.
    pub fn calls(&self) -> CallCounts {
        self.state.lock().unwrap().calls.clone()
    }

    /// Airdrops requested so far.
    pub fn airdrops(&self) -> Vec<(Pubkey, u64)> {
        self.state.lock().unwrap().airdrops.clone()
    }

    /// Transactions submitted so far.
    pub fn submitted(&self) -> Vec<SignedTransaction> {
        self.state.lock().unwrap().submitted.clone()
    }

    fn check_network(&self) -> Result<(), WalletError> {
        if self.network_down {
            return Err(WalletError::Network("connection refused".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl LedgerClient for MockLedger {
    async fn get_balance(&self, _pubkey: &Pubkey) -> Result<u64, WalletError> {
        self.state.lock().unwrap().calls.get_balance += 1;
        self.check_network()?;
        Ok(self.balance)
    }

    async fn request_airdrop(
        &self,
        pubkey: &Pubkey,
        lamports: u64,
    ) -> Result<Signature, WalletError> {
        let mut state = self.state.lock().unwrap();
        state.calls.request_airdrop += 1;
        self.check_network()?;
        state.airdrops.push((*pubkey, lamports));
        Ok(Signature([state.airdrops.len() as u8; 64]))
    }

    async fn latest_blockhash(&self) -> Result<Hash, WalletError> {
        self.state.lock().unwrap().calls.latest_blockhash += 1;
        self.check_network()?;
        Ok(self.blockhash)
    }

    async fn submit(&self, transaction: &SignedTransaction) -> Result<Signature, WalletError> {
        let mut state = self.state.lock().unwrap();
        state.calls.submit += 1;
        self.check_network()?;
        state.submitted.push(transaction.clone());
        Ok(*transaction.signature())
    }

    async fn confirm(&self, _signature: &Signature) -> Result<bool, WalletError> {
        self.state.lock().unwrap().calls.confirm += 1;
        self.check_network()?;
        match self.confirm {
            ConfirmOutcome::Confirmed => Ok(true),
            ConfirmOutcome::Pending => Ok(false),
            ConfirmOutcome::Unreachable => {
                Err(WalletError::Network("connection reset".to_string()))
            }
            ConfirmOutcome::Rejected => Err(WalletError::TransactionRejected(
                "insufficient funds for fee".to_string(),
            )),
        }
    }
}
