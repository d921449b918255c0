//! Common types used across AgentPay.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{AgentPayError, Result};

/// Longest input prefix written to logs.
const PREVIEW_CHARS: usize = 100;

/// Lifecycle state of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    /// Record allocated, not yet offered for payment.
    Created,
    /// Payment instructions issued, waiting for a transaction hash.
    AwaitingPayment,
    /// The ledger confirmed the payment.
    PaymentVerified,
    /// The task executor is running.
    Executing,
    /// The task finished and a result is stored.
    Completed,
    /// The job cannot make further progress.
    Failed,
}

impl JobState {
    /// Returns true if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Completed | JobState::Failed)
    }

    /// Returns true if the job is past payment and not yet finished.
    pub fn is_active(&self) -> bool {
        matches!(self, JobState::PaymentVerified | JobState::Executing)
    }

    /// Returns true if `next` is a direct edge of the lifecycle graph.
    pub fn can_transition_to(&self, next: JobState) -> bool {
        use JobState::*;
        matches!(
            (self, next),
            (Created, AwaitingPayment)
                | (AwaitingPayment, PaymentVerified)
                | (AwaitingPayment, Failed)
                | (PaymentVerified, Executing)
                | (PaymentVerified, Failed)
                | (Executing, Completed)
                | (Executing, Failed)
        )
    }

    /// The snake_case name used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            JobState::Created => "created",
            JobState::AwaitingPayment => "awaiting_payment",
            JobState::PaymentVerified => "payment_verified",
            JobState::Executing => "executing",
            JobState::Completed => "completed",
            JobState::Failed => "failed",
        }
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The kind of text task requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    /// Extract key points and facts.
    Research,
    /// Produce a concise summary.
    Summarize,
    /// Compose an email reply or draft (default).
    #[default]
    Reply,
}

impl TaskKind {
    /// Name sent to the agent service.
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::Research => "research",
            TaskKind::Summarize => "summarize",
            TaskKind::Reply => "reply",
        }
    }
}

/// Input payload of a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskInput {
    /// Text to process.
    pub text: String,

    /// What to do with the text.
    #[serde(default)]
    pub task_type: TaskKind,
}

impl TaskInput {
    /// Create a reply task for the given text.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            task_type: TaskKind::default(),
        }
    }

    /// Set the task kind.
    pub fn with_kind(mut self, kind: TaskKind) -> Self {
        self.task_type = kind;
        self
    }

    /// Validate the payload.
    pub fn validate(&self) -> Result<()> {
        if self.text.trim().is_empty() {
            return Err(AgentPayError::InvalidInput(
                "input_payload.text must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Prefix of the text suitable for log lines.
    pub fn preview(&self) -> String {
        if self.text.chars().count() > PREVIEW_CHARS {
            let head: String = self.text.chars().take(PREVIEW_CHARS).collect();
            format!("{}...", head)
        } else {
            self.text.clone()
        }
    }
}

/// Output of a completed task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskOutput {
    /// The task that produced this output.
    pub task_type: TaskKind,

    /// Generated text.
    pub content: String,
}

/// Answer of a ledger lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verification {
    /// Whether the payment satisfies the requirement.
    pub verified: bool,

    /// Amount sent to the destination, if the transaction was found.
    pub observed_amount: Option<u64>,
}

impl Verification {
    /// The transaction does not exist.
    pub fn not_found() -> Self {
        Self {
            verified: false,
            observed_amount: None,
        }
    }

    /// The transaction exists and sent `observed` to the destination.
    pub fn observed(observed: u64, required: u64) -> Self {
        Self {
            verified: observed >= required,
            observed_amount: Some(observed),
        }
    }
}

/// Payment terms offered for every job of this process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentTerms {
    /// Address that must receive the payment.
    pub destination_address: String,

    /// Minimum amount in lovelace.
    pub required_amount: u64,
}

impl PaymentTerms {
    /// Create payment terms, rejecting an empty address or zero amount.
    pub fn new(destination_address: impl Into<String>, required_amount: u64) -> Result<Self> {
        let destination_address = destination_address.into();
        if destination_address.trim().is_empty() {
            return Err(AgentPayError::Configuration(
                "destination address must be set".to_string(),
            ));
        }
        if required_amount == 0 {
            return Err(AgentPayError::Configuration(
                "required amount must be positive".to_string(),
            ));
        }
        Ok(Self {
            destination_address,
            required_amount,
        })
    }
}
