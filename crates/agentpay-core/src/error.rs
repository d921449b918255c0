//! Error types for AgentPay.

use thiserror::Error;

use crate::types::JobState;

/// Message stored on a job whose payment did not verify.
pub const PAYMENT_NOT_FOUND: &str = "payment not found/insufficient";

/// Main error type for AgentPay operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AgentPayError {
    /// No job with the given id exists.
    #[error("Job {id} not found")]
    NotFound { id: String },

    /// The job's current state does not allow the requested operation.
    #[error("Invalid transition for job {id}: {message} (current state: {state})")]
    InvalidTransition {
        id: String,
        state: JobState,
        message: String,
    },

    /// The ledger could not be queried. The job is left untouched.
    #[error("Ledger lookup failed, retry later: {message}")]
    TransientLookup { message: String },

    /// The ledger answered but the payment did not match.
    #[error("payment not found/insufficient")]
    VerificationFailed {
        tx_hash: String,
        observed_amount: Option<u64>,
        required_amount: u64,
    },

    /// The task executor failed. The cause is kept verbatim.
    #[error("{cause}")]
    Execution { cause: String },

    /// Request payload was rejected.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Process configuration is unusable.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Certificate minting failed.
    #[error("Certificate minting failed: {0}")]
    Minting(String),

    /// Could not reach a remote AgentPay node or service.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal error (should not happen).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AgentPayError {
    /// Returns true if the caller may retry the same request later.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AgentPayError::TransientLookup { .. } | AgentPayError::Connection(_)
        )
    }

    /// Short machine-readable code used in API error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            AgentPayError::NotFound { .. } => "not_found",
            AgentPayError::InvalidTransition { .. } => "invalid_transition",
            AgentPayError::TransientLookup { .. } => "transient_lookup",
            AgentPayError::VerificationFailed { .. } => "verification_failed",
            AgentPayError::Execution { .. } => "execution_error",
            AgentPayError::InvalidInput(_) => "invalid_input",
            AgentPayError::Configuration(_) => "configuration",
            AgentPayError::Minting(_) => "minting",
            AgentPayError::Connection(_) => "connection",
            AgentPayError::Serialization(_) => "serialization",
            AgentPayError::Internal(_) => "internal",
        }
    }

    /// Shorthand for a missing job.
    pub fn not_found(id: impl ToString) -> Self {
        AgentPayError::NotFound { id: id.to_string() }
    }

    /// Shorthand for a transient ledger failure.
    pub fn transient(message: impl Into<String>) -> Self {
        AgentPayError::TransientLookup {
            message: message.into(),
        }
    }

    /// Shorthand for an executor failure.
    pub fn execution(cause: impl Into<String>) -> Self {
        AgentPayError::Execution {
            cause: cause.into(),
        }
    }
}

/// Convenience Result type for AgentPay operations.
pub type Result<T> = std::result::Result<T, AgentPayError>;

impl From<serde_json::Error> for AgentPayError {
    fn from(err: serde_json::Error) -> Self {
        AgentPayError::Serialization(err.to_string())
    }
}
