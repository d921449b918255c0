//! # AgentPay Core
//!
//! Core primitives and types for AgentPay.
//!
//! This crate provides the fundamental building blocks:
//! - [`Job`] - One request/payment/execution lifecycle
//! - [`JobState`] - The lifecycle graph
//! - [`Certificate`] - Receipt issued for a completed job
//! - [`AgentPayError`] - Error taxonomy shared by every crate

pub mod certificate;
pub mod error;
pub mod job;
pub mod types;

// Re-exports for convenience
pub use certificate::{Certificate, CertificateRequest};
pub use error::{AgentPayError, Result, PAYMENT_NOT_FOUND};
pub use job::{Job, JobId, PaymentReceipt, StateTransition};
pub use types::*;

/// Prelude module for common imports
pub mod prelude {
    pub use crate::certificate::{Certificate, CertificateRequest};
    pub use crate::error::{AgentPayError, Result};
    pub use crate::job::{Job, JobId};
    pub use crate::types::{JobState, PaymentTerms, TaskInput, TaskKind, TaskOutput, Verification};
}
