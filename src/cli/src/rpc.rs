//! JSON-RPC ledger client.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, trace};
use wallet_core::{Hash, LedgerClient, Pubkey, Signature, SignedTransaction, WalletError};

/// How far a transaction must progress before it counts as confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Commitment {
    /// Processed by the connected node
    Processed,
    /// Voted on by a supermajority
    Confirmed,
    /// Rooted by a supermajority
    Finalized,
}

impl Commitment {
    /// Name used in RPC requests and responses.
    pub fn as_str(&self) -> &'static str {
        match self {
            Commitment::Processed => "processed",
            Commitment::Confirmed => "confirmed",
            Commitment::Finalized => "finalized",
        }
    }
}

impl fmt::Display for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Commitment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "processed" => Ok(Commitment::Processed),
            "confirmed" => Ok(Commitment::Confirmed),
            "finalized" => Ok(Commitment::Finalized),
            other => Err(format!("unknown commitment level '{}'", other)),
        }
    }
}

/// A [`LedgerClient`] that talks JSON-RPC 2.0 over HTTP.
pub struct RpcLedgerClient {
    client: reqwest::Client,
    url: String,
    commitment: Commitment,
    next_id: AtomicU64,
}

impl RpcLedgerClient {
    /// Creates a client for the given endpoint.
    pub fn new(
        url: impl Into<String>,
        commitment: Commitment,
        request_timeout: Duration,
    ) -> Result<Self, WalletError> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| WalletError::Network(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: url.into(),
            commitment,
            next_id: AtomicU64::new(1),
        })
    }

    /// Gets the endpoint URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Sends one JSON-RPC request and returns its `result`.
    async fn call(&self, method: &str, params: Value) -> Result<Value, WalletError> {
        let request = json!({
            "jsonrpc": "2.0",
            "id": self.next_id.fetch_add(1, Ordering::Relaxed),
            "method": method,
            "params": params,
        });
        debug!("RPC {} -> {}", method, self.url);

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| WalletError::Network(format!("{} request failed: {}", method, e)))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            WalletError::Network(format!("failed to read {} response: {}", method, e))
        })?;
        trace!("RPC {} <- {} {}", method, status, body);

        if !status.is_success() {
            return Err(WalletError::Network(format!(
                "{} returned HTTP {}: {}",
                method,
                status,
                body.trim()
            )));
        }

        parse_response(method, &body)
    }

    fn commitment_config(&self) -> Value {
        json!({ "commitment": self.commitment.as_str() })
    }
}

#[async_trait]
impl LedgerClient for RpcLedgerClient {
    async fn get_balance(&self, pubkey: &Pubkey) -> Result<u64, WalletError> {
        let result = self
            .call(
                "getBalance",
                json!([pubkey.to_string(), self.commitment_config()]),
            )
            .await?;
        parse_balance(&result)
    }

    async fn request_airdrop(
        &self,
        pubkey: &Pubkey,
        lamports: u64,
    ) -> Result<Signature, WalletError> {
        let result = self
            .call(
                "requestAirdrop",
                json!([pubkey.to_string(), lamports, self.commitment_config()]),
            )
            .await?;
        parse_signature(&result)
    }

    async fn latest_blockhash(&self) -> Result<Hash, WalletError> {
        let result = self
            .call("getLatestBlockhash", json!([self.commitment_config()]))
            .await?;
        parse_blockhash(&result)
    }

    async fn submit(&self, transaction: &SignedTransaction) -> Result<Signature, WalletError> {
        let encoded = STANDARD.encode(transaction.serialize());
        let result = self
            .call(
                "sendTransaction",
                json!([
                    encoded,
                    {
                        "encoding": "base64",
                        "preflightCommitment": self.commitment.as_str(),
                    }
                ]),
            )
            .await?;
        parse_signature(&result)
    }

    async fn confirm(&self, signature: &Signature) -> Result<bool, WalletError> {
        let result = self
            .call("getSignatureStatuses", json!([[signature.to_string()]]))
            .await?;
        parse_signature_status(&result, self.commitment)
    }
}

/// Extracts `result` from a JSON-RPC response body, mapping an `error` object to a failure.
pub fn parse_response(method: &str, body: &str) -> Result<Value, WalletError> {
    if body.trim().is_empty() {
        return Err(WalletError::Network(format!("empty {} response", method)));
    }

    let mut response: Value = serde_json::from_str(body).map_err(|e| {
        WalletError::Network(format!("failed to parse {} response: {}", method, e))
    })?;

    if let Some(error) = response.get("error") {
        if !error.is_null() {
            let message = error
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| error.to_string());
            return Err(WalletError::Network(format!("{} failed: {}", method, message)));
        }
    }

    match response.get_mut("result") {
        Some(result) => Ok(result.take()),
        None => Err(WalletError::Network(format!(
            "no result in {} response: {}",
            method, body
        ))),
    }
}

/// Parses a `getBalance` result: `{ context, value: <lamports> }`.
pub fn parse_balance(result: &Value) -> Result<u64, WalletError> {
    result
        .get("value")
        .and_then(Value::as_u64)
        .ok_or_else(|| WalletError::Network(format!("invalid balance: {}", result)))
}

/// Parses a bare base58 signature result.
pub fn parse_signature(result: &Value) -> Result<Signature, WalletError> {
    let text = result
        .as_str()
        .ok_or_else(|| WalletError::Network(format!("invalid signature: {}", result)))?;
    text.parse()
        .map_err(|e| WalletError::Network(format!("invalid signature '{}': {}", text, e)))
}

/// Parses a `getLatestBlockhash` result: `{ context, value: { blockhash, .. } }`.
pub fn parse_blockhash(result: &Value) -> Result<Hash, WalletError> {
    let text = result
        .get("value")
        .and_then(|value| value.get("blockhash"))
        .and_then(Value::as_str)
        .ok_or_else(|| WalletError::Network(format!("invalid blockhash: {}", result)))?;
    text.parse()
        .map_err(|e| WalletError::Network(format!("invalid blockhash '{}': {}", text, e)))
}

/// Parses a single-signature `getSignatureStatuses` result.
///
/// An unknown signature (`null` status) is not yet confirmed. A status with a
/// non-null `err` means the transaction failed on chain.
pub fn parse_signature_status(result: &Value, commitment: Commitment) -> Result<bool, WalletError> {
    let status = match result
        .get("value")
        .and_then(Value::as_array)
        .and_then(|statuses| statuses.first())
    {
        Some(status) if !status.is_null() => status,
        Some(_) => return Ok(false),
        None => {
            return Err(WalletError::Network(format!(
                "invalid signature status: {}",
                result
            )))
        }
    };

    if let Some(err) = status.get("err") {
        if !err.is_null() {
            return Err(WalletError::TransactionRejected(err.to_string()));
        }
    }

    let reached = match status.get("confirmationStatus").and_then(Value::as_str) {
        Some(level) => level.parse::<Commitment>().map_err(WalletError::Network)?,
        // Older nodes omit the level; null confirmations means rooted
        None if status.get("confirmations").map_or(false, Value::is_null) => {
            Commitment::Finalized
        }
        None => Commitment::Processed,
    };

    Ok(reached >= commitment)
}
