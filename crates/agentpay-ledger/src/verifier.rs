//! Ledger verifier trait.

use async_trait::async_trait;
use agentpay_core::{Result, Verification};

/// Answers whether a transaction paid enough to an address.
///
/// Implementations return `verified = false` when the transaction is unknown
/// or pays too little, and `AgentPayError::TransientLookup` only when the
/// ledger could not be asked.
#[async_trait]
pub trait LedgerVerifier: Send + Sync {
    /// Check `tx_hash` for at least `min_amount` lovelace sent to `destination`.
    async fn verify(&self, tx_hash: &str, destination: &str, min_amount: u64) -> Result<Verification>;

    /// Short name used in logs.
    fn name(&self) -> &'static str;
}
