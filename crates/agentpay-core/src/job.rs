//! Job records and their lifecycle.
//!
//! A [`Job`] moves along a fixed graph (see [`JobState::can_transition_to`]).
//! Every mutation goes through a method on the record so the write-once
//! fields and the monotonic state order cannot be bypassed.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::certificate::Certificate;
use crate::error::{AgentPayError, Result};
use crate::types::{JobState, PaymentTerms, TaskInput, TaskOutput, Verification};

/// Unique identifier of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub Uuid);

impl JobId {
    /// Allocate a fresh random id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an id received from a caller. Malformed ids cannot name an
    /// existing job, so they are reported as not found.
    pub fn parse(raw: &str) -> Result<Self> {
        raw.parse().map_err(|_| AgentPayError::not_found(raw))
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for JobId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Uuid::parse_str(s).map(JobId)
    }
}

/// One recorded edge of the lifecycle graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateTransition {
    pub from: JobState,
    pub to: JobState,
    pub at: DateTime<Utc>,
}

/// Proof of payment attached to a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentReceipt {
    /// Transaction hash submitted by the purchaser.
    pub tx_hash: String,

    /// Whether the ledger accepted the payment.
    pub verified: bool,

    /// Amount the ledger reported for the destination address.
    pub observed_amount: Option<u64>,

    /// When the ledger answered.
    pub checked_at: DateTime<Utc>,
}

/// A pay-per-task job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    /// Unique identifier for this job.
    pub id: JobId,

    /// Free-text reference supplied by the purchaser.
    pub purchaser_ref: String,

    /// The task to run once paid.
    pub input_payload: TaskInput,

    /// Price in lovelace.
    pub required_amount: u64,

    /// Address that must receive the payment.
    pub destination_address: String,

    state: JobState,
    tx_hash: Option<String>,
    payment: Option<PaymentReceipt>,
    result: Option<TaskOutput>,
    error: Option<String>,
    certificate: Option<Certificate>,
    history: Vec<StateTransition>,

    /// Timestamp when the job was created.
    pub created_at: DateTime<Utc>,

    /// Timestamp of the last mutation.
    pub updated_at: DateTime<Utc>,
}

impl Job {
    /// Create a job in the `Created` state.
    pub fn new(purchaser_ref: impl Into<String>, input: TaskInput, terms: &PaymentTerms) -> Result<Self> {
        input.validate()?;

        let now = Utc::now();
        Ok(Self {
            id: JobId::new(),
            purchaser_ref: purchaser_ref.into(),
            input_payload: input,
            required_amount: terms.required_amount,
            destination_address: terms.destination_address.clone(),
            state: JobState::Created,
            tx_hash: None,
            payment: None,
            result: None,
            error: None,
            certificate: None,
            history: Vec::new(),
            created_at: now,
            updated_at: now,
        })
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    pub fn tx_hash(&self) -> Option<&str> {
        self.tx_hash.as_deref()
    }

    pub fn payment(&self) -> Option<&PaymentReceipt> {
        self.payment.as_ref()
    }

    pub fn result(&self) -> Option<&TaskOutput> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn certificate(&self) -> Option<&Certificate> {
        self.certificate.as_ref()
    }

    /// Transitions taken so far, oldest first.
    pub fn history(&self) -> &[StateTransition] {
        &self.history
    }

    fn invalid(&self, message: impl Into<String>) -> AgentPayError {
        AgentPayError::InvalidTransition {
            id: self.id.to_string(),
            state: self.state,
            message: message.into(),
        }
    }

    /// Move to `next` if it is a direct edge from the current state.
    pub fn transition(&mut self, next: JobState) -> Result<()> {
        if !self.state.can_transition_to(next) {
            return Err(self.invalid(format!("cannot move to {}", next)));
        }

        let now = Utc::now();
        self.history.push(StateTransition {
            from: self.state,
            to: next,
            at: now,
        });
        self.state = next;
        self.updated_at = now;
        Ok(())
    }

    /// Check that a payment may still be submitted.
    pub fn ensure_accepts_payment(&self) -> Result<()> {
        if let Some(existing) = &self.tx_hash {
            return Err(self.invalid(format!("payment already submitted with tx {}", existing)));
        }
        if self.state != JobState::AwaitingPayment {
            return Err(self.invalid("payment is only accepted while awaiting payment"));
        }
        Ok(())
    }

    /// Record the ledger's answer for `tx_hash`. The hash is write-once.
    pub fn record_payment(&mut self, tx_hash: impl Into<String>, verification: Verification) -> Result<()> {
        self.ensure_accepts_payment()?;

        let tx_hash = tx_hash.into();
        self.payment = Some(PaymentReceipt {
            tx_hash: tx_hash.clone(),
            verified: verification.verified,
            observed_amount: verification.observed_amount,
            checked_at: Utc::now(),
        });
        self.tx_hash = Some(tx_hash);
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Store the task output and move to `Completed`.
    pub fn complete(&mut self, output: TaskOutput) -> Result<()> {
        if self.result.is_some() || self.error.is_some() {
            return Err(self.invalid("outcome already recorded"));
        }
        self.transition(JobState::Completed)?;
        self.result = Some(output);
        Ok(())
    }

    /// Store the failure cause and move to `Failed`.
    pub fn fail(&mut self, cause: impl Into<String>) -> Result<()> {
        if self.result.is_some() || self.error.is_some() {
            return Err(self.invalid("outcome already recorded"));
        }
        self.transition(JobState::Failed)?;
        self.error = Some(cause.into());
        Ok(())
    }

    /// Attach the certificate issued for a completed job.
    pub fn attach_certificate(&mut self, certificate: Certificate) -> Result<()> {
        if self.state != JobState::Completed {
            return Err(self.invalid("certificates are only issued for completed jobs"));
        }
        if self.certificate.is_some() {
            return Err(self.invalid("certificate already issued"));
        }
        self.certificate = Some(certificate);
        self.updated_at = Utc::now();
        Ok(())
    }
}
