//! # AgentPay State
//!
//! Concurrent in-memory job store with a retention sweep.

pub mod retention;
pub mod store;

pub use retention::RetentionPolicy;
pub use store::{InMemoryJobStore, JobMutator, JobStore, SweepGuard};
