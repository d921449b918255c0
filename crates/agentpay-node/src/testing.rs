//! Test doubles shared by the orchestrator and API tests.

use std::sync::Arc;
use std::time::Duration;

use agentpay_core::{
    AgentPayError, Certificate, CertificateRequest, Job, JobId, JobState, PaymentTerms, Result,
    TaskInput, TaskOutput, Verification,
};
use agentpay_executor::{CertificateMinter, LocalTaskExecutor, TaskExecutor};
use agentpay_ledger::{InMemoryLedger, LedgerVerifier};
use agentpay_state::InMemoryJobStore;
use async_trait::async_trait;
use tokio::sync::Notify;

use crate::orchestrator::Orchestrator;

pub const SELLER: &str = "addr_test1qseller";
pub const PRICE: u64 = 2_000_000;

/// Ledger that answers after a fixed delay.
pub struct DelayedLedger {
    inner: Arc<InMemoryLedger>,
    delay: Duration,
}

#[async_trait]
impl LedgerVerifier for DelayedLedger {
    async fn verify(&self, tx_hash: &str, destination: &str, min_amount: u64) -> Result<Verification> {
        tokio::time::sleep(self.delay).await;
        self.inner.verify(tx_hash, destination, min_amount).await
    }

    fn name(&self) -> &'static str {
        "delayed"
    }
}

pub struct FailingExecutor(String);

impl FailingExecutor {
    pub fn new(cause: &str) -> Self {
        Self(cause.to_string())
    }
}

#[async_trait]
impl TaskExecutor for FailingExecutor {
    async fn execute(&self, _input: &TaskInput) -> Result<TaskOutput> {
        Err(AgentPayError::execution(self.0.clone()))
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}

pub struct SlowExecutor(pub Duration);

#[async_trait]
impl TaskExecutor for SlowExecutor {
    async fn execute(&self, input: &TaskInput) -> Result<TaskOutput> {
        tokio::time::sleep(self.0).await;
        LocalTaskExecutor::new().execute(input).await
    }

    fn name(&self) -> &'static str {
        "slow"
    }
}

pub struct PanickingExecutor;

#[async_trait]
impl TaskExecutor for PanickingExecutor {
    async fn execute(&self, _input: &TaskInput) -> Result<TaskOutput> {
        panic!("agent blew up");
    }

    fn name(&self) -> &'static str {
        "panicking"
    }
}

/// Executor that holds every task until released.
#[derive(Default)]
pub struct GatedExecutor {
    released: Notify,
}

impl GatedExecutor {
    pub fn release(&self) {
        self.released.notify_one();
    }
}

#[async_trait]
impl TaskExecutor for GatedExecutor {
    async fn execute(&self, input: &TaskInput) -> Result<TaskOutput> {
        self.released.notified().await;
        LocalTaskExecutor::new().execute(input).await
    }

    fn name(&self) -> &'static str {
        "gated"
    }
}

pub struct FailingMinter;

#[async_trait]
impl CertificateMinter for FailingMinter {
    async fn mint(&self, _request: CertificateRequest) -> Result<Certificate> {
        Err(AgentPayError::Minting("chain unavailable".to_string()))
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}

pub struct Harness {
    pub ledger: Arc<InMemoryLedger>,
    pub orchestrator: Orchestrator,
}

impl Harness {
    pub fn new() -> Self {
        Self::build(Duration::ZERO, Arc::new(LocalTaskExecutor::new()), None)
    }

    pub fn with_verifier_delay(delay: Duration) -> Self {
        Self::build(delay, Arc::new(LocalTaskExecutor::new()), None)
    }

    pub fn with_executor(executor: Arc<dyn TaskExecutor>) -> Self {
        Self::build(Duration::ZERO, executor, None)
    }

    pub fn build(
        verifier_delay: Duration,
        executor: Arc<dyn TaskExecutor>,
        execution_timeout: Option<Duration>,
    ) -> Self {
        let ledger = Arc::new(InMemoryLedger::new());
        let verifier: Arc<dyn LedgerVerifier> = if verifier_delay.is_zero() {
            ledger.clone() as Arc<dyn LedgerVerifier>
        } else {
            Arc::new(DelayedLedger {
                inner: ledger.clone(),
                delay: verifier_delay,
            })
        };

        let terms = PaymentTerms::new(SELLER, PRICE).unwrap();
        let mut orchestrator =
            Orchestrator::new(Arc::new(InMemoryJobStore::new()), verifier, executor, terms);
        if let Some(timeout) = execution_timeout {
            orchestrator = orchestrator.with_execution_timeout(timeout);
        }

        Self { ledger, orchestrator }
    }

    pub async fn create(&self) -> Job {
        self.orchestrator
            .create_job("w1", TaskInput::new("draft an email"))
            .await
            .unwrap()
    }
}

/// Poll until `done` holds for the job, failing after five seconds.
pub async fn wait_for(orchestrator: &Orchestrator, id: &JobId, done: impl Fn(&Job) -> bool) -> Job {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    loop {
        let job = orchestrator.get_status(id).await.unwrap();
        if done(&job) {
            return job;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "job {} stuck in {}",
            id,
            job.state()
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

pub async fn wait_for_terminal(orchestrator: &Orchestrator, id: &JobId) -> Job {
    wait_for(orchestrator, id, |job| job.state().is_terminal()).await
}

/// States the job went through, starting from `Created`.
pub fn state_path(job: &Job) -> Vec<JobState> {
    let mut path: Vec<JobState> = job.history().iter().map(|t| t.from).take(1).collect();
    path.extend(job.history().iter().map(|t| t.to));
    path
}
