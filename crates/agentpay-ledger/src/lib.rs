//! # AgentPay Ledger
//!
//! Payment verification against a Cardano ledger.

pub mod blockfrost;
pub mod memory;
pub mod verifier;

pub use blockfrost::{BlockfrostConfig, BlockfrostVerifier, PREPROD_BASE_URL};
pub use memory::InMemoryLedger;
pub use verifier::LedgerVerifier;
