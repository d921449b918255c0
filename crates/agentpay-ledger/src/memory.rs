//! In-process ledger for development and tests.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use agentpay_core::{AgentPayError, Result, Verification};
use dashmap::DashMap;

use crate::verifier::LedgerVerifier;

/// A ledger whose transactions are recorded by hand.
#[derive(Default)]
pub struct InMemoryLedger {
    /// tx hash -> (address, lovelace) outputs.
    transactions: DashMap<String, Vec<(String, u64)>>,
    unavailable: AtomicBool,
    lookups: AtomicU64,
}

impl InMemoryLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an output of `amount` lovelace to `address` in `tx_hash`.
    pub fn record(&self, tx_hash: impl Into<String>, address: impl Into<String>, amount: u64) {
        self.transactions
            .entry(tx_hash.into())
            .or_default()
            .push((address.into(), amount));
    }

    /// Make every lookup fail with a transient error until switched back.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of lookups served, including failed ones.
    pub fn lookups(&self) -> u64 {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LedgerVerifier for InMemoryLedger {
    async fn verify(&self, tx_hash: &str, destination: &str, min_amount: u64) -> Result<Verification> {
        self.lookups.fetch_add(1, Ordering::SeqCst);

        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AgentPayError::transient("in-memory ledger marked unavailable"));
        }

        let Some(outputs) = self.transactions.get(tx_hash) else {
            return Ok(Verification::not_found());
        };

        let received = outputs
            .iter()
            .filter(|(address, _)| address == destination)
            .fold(0u64, |sum, (_, amount)| sum.saturating_add(*amount));

        Ok(Verification::observed(received, min_amount))
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
