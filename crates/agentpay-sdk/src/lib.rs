//! # AgentPay SDK
//!
//! Client SDK for interacting with AgentPay nodes.

pub mod client;

pub use client::{AgentPayClient, CreatedJob, JobSummary, JobView, PaymentOutcome};

/// Prelude module for common imports.
pub mod prelude {
    pub use crate::client::{AgentPayClient, JobView};
    pub use agentpay_core::prelude::*;
}
