//! Job orchestrator.
//!
//! Sequences ledger lookups against job store mutations and hands paid jobs
//! to the task executor. Payment submission for one job runs under a per-job
//! gate; task execution runs on its own task and never holds the gate.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use agentpay_core::{
    AgentPayError, CertificateRequest, Job, JobId, JobState, PaymentTerms, Result, TaskInput,
    TaskOutput, Verification,
};
use agentpay_executor::{CertificateMinter, TaskExecutor};
use agentpay_ledger::LedgerVerifier;
use agentpay_state::{JobStore, RetentionPolicy};
use dashmap::DashMap;
use futures::FutureExt;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

/// Failure cause recorded when the executor exceeds its deadline.
pub const EXECUTION_TIMEOUT: &str = "execution timeout";

/// Failure cause recorded when the executor panics.
pub const EXECUTOR_PANICKED: &str = "task executor panicked";

/// The job orchestrator.
#[derive(Clone)]
pub struct Orchestrator {
    store: Arc<dyn JobStore>,
    verifier: Arc<dyn LedgerVerifier>,
    executor: Arc<dyn TaskExecutor>,
    minter: Option<Arc<dyn CertificateMinter>>,
    terms: PaymentTerms,
    execution_timeout: Option<Duration>,
    certificate_owner: Option<String>,
    payment_gates: Arc<DashMap<JobId, Arc<Mutex<()>>>>,
}

impl Orchestrator {
    /// Create an orchestrator over the given collaborators.
    pub fn new(
        store: Arc<dyn JobStore>,
        verifier: Arc<dyn LedgerVerifier>,
        executor: Arc<dyn TaskExecutor>,
        terms: PaymentTerms,
    ) -> Self {
        Self {
            store,
            verifier,
            executor,
            minter: None,
            terms,
            execution_timeout: None,
            certificate_owner: None,
            payment_gates: Arc::new(DashMap::new()),
        }
    }

    /// Issue a certificate after every completed job.
    pub fn with_minter(mut self, minter: Arc<dyn CertificateMinter>) -> Self {
        self.minter = Some(minter);
        self
    }

    /// Fail jobs whose task runs longer than `timeout`.
    pub fn with_execution_timeout(mut self, timeout: Duration) -> Self {
        self.execution_timeout = Some(timeout);
        self
    }

    /// Send certificates to this address instead of the purchaser ref.
    pub fn with_certificate_owner(mut self, owner: impl Into<String>) -> Self {
        self.certificate_owner = Some(owner.into());
        self
    }

    pub fn terms(&self) -> &PaymentTerms {
        &self.terms
    }

    pub fn store(&self) -> Arc<dyn JobStore> {
        self.store.clone()
    }

    /// Create a job and return it in `AwaitingPayment`.
    pub async fn create_job(&self, purchaser_ref: impl Into<String>, input: TaskInput) -> Result<Job> {
        let mut job = Job::new(purchaser_ref, input, &self.terms)?;
        job.transition(JobState::AwaitingPayment)?;

        info!(
            job_id = %job.id,
            task = job.input_payload.task_type.as_str(),
            input = %job.input_payload.preview(),
            "Job created"
        );

        self.store.put(job.clone()).await?;
        Ok(job)
    }

    /// Read the current record of a job.
    pub async fn get_status(&self, id: &JobId) -> Result<Job> {
        self.store.get(id).await
    }

    /// All jobs, oldest first.
    pub async fn list_jobs(&self) -> Result<Vec<Job>> {
        let mut jobs = self.store.list().await?;
        jobs.sort_by_key(|job| job.created_at);
        Ok(jobs)
    }

    /// Verify `tx_hash` as the payment for job `id`.
    ///
    /// Returns the job after the decisive transition: `Executing` when the
    /// payment verified, `Failed` when it did not. A transient ledger error
    /// leaves the job untouched and is returned to the caller.
    pub async fn submit_payment(&self, id: &JobId, tx_hash: &str) -> Result<Job> {
        let tx_hash = tx_hash.trim();
        if tx_hash.is_empty() {
            return Err(AgentPayError::InvalidInput("tx_hash must not be empty".to_string()));
        }

        // Unknown ids never get a gate.
        self.store.get(id).await?;

        let gate = self.payment_gates.entry(*id).or_default().clone();
        let result = {
            let _guard = gate.lock().await;
            self.submit_payment_locked(id, tx_hash).await
        };

        // While the job still awaits payment the gate must stay shared by all
        // callers; once decided, the state check alone rejects newcomers.
        if !matches!(&result, Err(e) if e.is_retryable()) {
            self.payment_gates.remove(id);
        }

        result
    }

    async fn submit_payment_locked(&self, id: &JobId, tx_hash: &str) -> Result<Job> {
        let job = self.store.get(id).await?;
        if let Err(e) = job.ensure_accepts_payment() {
            warn!(job_id = %id, tx_hash, state = %job.state(), "Payment submission rejected");
            return Err(e);
        }

        let verification = self
            .verifier
            .verify(tx_hash, &job.destination_address, job.required_amount)
            .await
            .map_err(|e| {
                warn!(
                    job_id = %id,
                    tx_hash,
                    verifier = self.verifier.name(),
                    error = %e,
                    "Payment lookup failed, job left awaiting payment"
                );
                if e.is_retryable() {
                    e
                } else {
                    AgentPayError::transient(e.to_string())
                }
            })?;

        if verification.verified {
            self.accept_payment(id, tx_hash, verification).await
        } else {
            self.reject_payment(id, tx_hash, verification).await
        }
    }

    async fn accept_payment(&self, id: &JobId, tx_hash: &str, verification: Verification) -> Result<Job> {
        let tx = tx_hash.to_string();
        self.store
            .update(
                id,
                Box::new(move |job| {
                    job.record_payment(tx, verification)?;
                    job.transition(JobState::PaymentVerified)
                }),
            )
            .await?;

        info!(
            job_id = %id,
            tx_hash,
            received = ?verification.observed_amount,
            "Payment verified"
        );

        let job = self
            .store
            .update(id, Box::new(|job| job.transition(JobState::Executing)))
            .await?;

        self.spawn_execution(job.clone());
        Ok(job)
    }

    async fn reject_payment(&self, id: &JobId, tx_hash: &str, verification: Verification) -> Result<Job> {
        let cause = AgentPayError::VerificationFailed {
            tx_hash: tx_hash.to_string(),
            observed_amount: verification.observed_amount,
            required_amount: self.terms.required_amount,
        };

        info!(
            job_id = %id,
            tx_hash,
            received = ?verification.observed_amount,
            required = self.terms.required_amount,
            "Payment not verified, job failed"
        );

        let tx = tx_hash.to_string();
        let reason = cause.to_string();
        self.store
            .update(
                id,
                Box::new(move |job| {
                    job.record_payment(tx, verification)?;
                    job.fail(reason)
                }),
            )
            .await
    }

    /// Evict jobs that expired under `policy`.
    ///
    /// A job whose payment is being verified right now is kept. Payment gates
    /// of evicted jobs go with them.
    pub async fn sweep_expired(&self, policy: &RetentionPolicy) -> Vec<JobId> {
        let gates = &self.payment_gates;
        let verifying = |id: &JobId| gates.get(id).is_some_and(|gate| gate.try_lock().is_err());

        let evicted = policy.sweep_once(self.store.as_ref(), &verifying).await;
        for id in &evicted {
            self.payment_gates.remove(id);
        }
        if !evicted.is_empty() {
            debug!(count = evicted.len(), gates = self.payment_gates.len(), "Expired jobs swept");
        }
        evicted
    }

    /// Sweep on the policy's interval until the task is dropped.
    pub async fn run_sweeper(self, policy: RetentionPolicy) {
        if !policy.is_enabled() {
            info!("Job retention disabled");
            return;
        }

        info!(
            retention_secs = policy.retention.as_secs(),
            interval_secs = policy.sweep_interval.as_secs(),
            "Job sweeper started"
        );

        let mut ticker = tokio::time::interval(policy.sweep_interval);
        loop {
            ticker.tick().await;
            self.sweep_expired(&policy).await;
        }
    }

    #[cfg(test)]
    pub(crate) fn open_gates(&self) -> usize {
        self.payment_gates.len()
    }

    fn spawn_execution(&self, job: Job) {
        let this = self.clone();
        tokio::spawn(async move {
            this.run_task(job).await;
        });
    }

    /// Run the executor for a job in `Executing` and record the outcome.
    pub(crate) async fn run_task(&self, job: Job) {
        let id = job.id;
        let started = Instant::now();
        debug!(job_id = %id, executor = self.executor.name(), "Task started");

        let outcome = self.execute_guarded(&job.input_payload).await;

        match outcome {
            Ok(output) => {
                match self
                    .store
                    .update(&id, Box::new(move |job| job.complete(output)))
                    .await
                {
                    Ok(job) => {
                        info!(
                            job_id = %id,
                            elapsed_ms = started.elapsed().as_millis() as u64,
                            "Job completed"
                        );
                        self.issue_certificate(job).await;
                    }
                    Err(e) => error!(job_id = %id, error = %e, "Could not record job result"),
                }
            }
            Err(e) => {
                let cause = e.to_string();
                warn!(job_id = %id, cause = %cause, "Task failed");
                if let Err(e) = self
                    .store
                    .update(&id, Box::new(move |job| job.fail(cause)))
                    .await
                {
                    error!(job_id = %id, error = %e, "Could not record job failure");
                }
            }
        }
    }

    async fn execute_guarded(&self, input: &TaskInput) -> Result<TaskOutput> {
        let execution = AssertUnwindSafe(self.executor.execute(input)).catch_unwind();

        let outcome = match self.execution_timeout {
            Some(limit) => match tokio::time::timeout(limit, execution).await {
                Ok(outcome) => outcome,
                Err(_) => return Err(AgentPayError::execution(EXECUTION_TIMEOUT)),
            },
            None => execution.await,
        };

        outcome.unwrap_or_else(|_| Err(AgentPayError::execution(EXECUTOR_PANICKED)))
    }

    async fn issue_certificate(&self, job: Job) {
        let Some(minter) = &self.minter else {
            return;
        };
        let Some(output) = job.result().cloned() else {
            return;
        };

        let request = CertificateRequest {
            job_id: job.id,
            owner: self
                .certificate_owner
                .clone()
                .unwrap_or_else(|| job.purchaser_ref.clone()),
            purchaser_ref: job.purchaser_ref.clone(),
            output,
        };

        let certificate = match minter.mint(request).await {
            Ok(certificate) => certificate,
            Err(e) => {
                warn!(job_id = %job.id, minter = minter.name(), error = %e, "Certificate minting failed");
                return;
            }
        };

        if let Err(e) = self
            .store
            .update(&job.id, Box::new(move |job| job.attach_certificate(certificate)))
            .await
        {
            warn!(job_id = %job.id, error = %e, "Could not attach certificate");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;
    use agentpay_core::PAYMENT_NOT_FOUND;

    #[tokio::test]
    async fn test_happy_path() {
        let harness = Harness::new();
        harness.ledger.record("abc123", SELLER, 2_000_000);

        let job = harness
            .orchestrator
            .create_job("w1", TaskInput::new("draft an email"))
            .await
            .unwrap();
        assert_eq!(job.state(), JobState::AwaitingPayment);
        assert_eq!(job.required_amount, 2_000_000);
        assert_eq!(job.destination_address, SELLER);

        let submitted = harness.orchestrator.submit_payment(&job.id, "abc123").await.unwrap();
        assert!(matches!(submitted.state(), JobState::Executing | JobState::Completed));

        let done = wait_for_terminal(&harness.orchestrator, &job.id).await;
        assert_eq!(done.state(), JobState::Completed);
        assert!(!done.result().unwrap().content.is_empty());
        assert!(done.error().is_none());
        assert_eq!(done.tx_hash(), Some("abc123"));
        assert_eq!(
            state_path(&done),
            vec![
                JobState::Created,
                JobState::AwaitingPayment,
                JobState::PaymentVerified,
                JobState::Executing,
                JobState::Completed
            ]
        );
    }

    #[tokio::test]
    async fn test_verification_failure_is_terminal() {
        let harness = Harness::new();
        let job = harness.create().await;

        let failed = harness.orchestrator.submit_payment(&job.id, "deadbeef").await.unwrap();

        assert_eq!(failed.state(), JobState::Failed);
        assert_eq!(failed.error(), Some(PAYMENT_NOT_FOUND));
        assert!(failed.result().is_none());
        assert_eq!(failed.tx_hash(), Some("deadbeef"));
        assert_eq!(
            state_path(&failed),
            vec![JobState::Created, JobState::AwaitingPayment, JobState::Failed]
        );
    }

    #[tokio::test]
    async fn test_insufficient_payment_fails() {
        let harness = Harness::new();
        harness.ledger.record("abc123", SELLER, 1_000_000);
        let job = harness.create().await;

        let failed = harness.orchestrator.submit_payment(&job.id, "abc123").await.unwrap();

        assert_eq!(failed.state(), JobState::Failed);
        assert_eq!(failed.payment().unwrap().observed_amount, Some(1_000_000));
        assert!(!failed.payment().unwrap().verified);
    }

    #[tokio::test]
    async fn test_unknown_job() {
        let harness = Harness::new();

        let status = harness.orchestrator.get_status(&JobId::new()).await;
        assert!(matches!(status, Err(AgentPayError::NotFound { .. })));

        assert!(matches!(
            JobId::parse("nonexistent"),
            Err(AgentPayError::NotFound { .. })
        ));

        let payment = harness.orchestrator.submit_payment(&JobId::new(), "abc123").await;
        assert!(matches!(payment, Err(AgentPayError::NotFound { .. })));
        assert_eq!(harness.ledger.lookups(), 0);
    }

    #[tokio::test]
    async fn test_transient_error_leaves_job_awaiting() {
        let harness = Harness::new();
        harness.ledger.record("abc123", SELLER, 2_000_000);
        harness.ledger.set_unavailable(true);
        let job = harness.create().await;

        let err = harness
            .orchestrator
            .submit_payment(&job.id, "abc123")
            .await
            .unwrap_err();
        assert!(err.is_retryable());

        let current = harness.orchestrator.get_status(&job.id).await.unwrap();
        assert_eq!(current.state(), JobState::AwaitingPayment);
        assert!(current.tx_hash().is_none());

        // Same hash, same job, later.
        harness.ledger.set_unavailable(false);
        harness.orchestrator.submit_payment(&job.id, "abc123").await.unwrap();
        let done = wait_for_terminal(&harness.orchestrator, &job.id).await;
        assert_eq!(done.state(), JobState::Completed);
    }

    #[tokio::test]
    async fn test_second_submission_rejected() {
        let harness = Harness::new();
        harness.ledger.record("abc123", SELLER, 2_000_000);
        harness.ledger.record("other", SELLER, 2_000_000);
        let job = harness.create().await;

        harness.orchestrator.submit_payment(&job.id, "abc123").await.unwrap();
        wait_for_terminal(&harness.orchestrator, &job.id).await;

        let err = harness
            .orchestrator
            .submit_payment(&job.id, "other")
            .await
            .unwrap_err();
        match err {
            AgentPayError::InvalidTransition { state, .. } => assert_eq!(state, JobState::Completed),
            other => panic!("unexpected error: {other:?}"),
        }

        let current = harness.orchestrator.get_status(&job.id).await.unwrap();
        assert_eq!(current.tx_hash(), Some("abc123"));
        assert_eq!(harness.ledger.lookups(), 1);
    }

    #[tokio::test]
    async fn test_resubmission_after_failure_rejected() {
        let harness = Harness::new();
        harness.ledger.record("good", SELLER, 2_000_000);
        let job = harness.create().await;

        harness.orchestrator.submit_payment(&job.id, "deadbeef").await.unwrap();
        let err = harness
            .orchestrator
            .submit_payment(&job.id, "good")
            .await
            .unwrap_err();

        assert!(matches!(err, AgentPayError::InvalidTransition { .. }));
        let current = harness.orchestrator.get_status(&job.id).await.unwrap();
        assert_eq!(current.state(), JobState::Failed);
        assert_eq!(current.tx_hash(), Some("deadbeef"));
    }

    #[tokio::test]
    async fn test_get_status_is_pure() {
        let harness = Harness::new();
        let job = harness.create().await;

        for _ in 0..10 {
            let current = harness.orchestrator.get_status(&job.id).await.unwrap();
            assert_eq!(current.state(), JobState::AwaitingPayment);
            assert_eq!(current.updated_at, job.updated_at);
            assert_eq!(current.history().len(), job.history().len());
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_submissions_single_winner() {
        let harness = Harness::with_verifier_delay(Duration::from_millis(50));
        harness.ledger.record("hash-a", SELLER, 2_000_000);
        harness.ledger.record("hash-b", SELLER, 2_000_000);
        let job = harness.create().await;

        let (a, b) = tokio::join!(
            harness.orchestrator.submit_payment(&job.id, "hash-a"),
            harness.orchestrator.submit_payment(&job.id, "hash-b"),
        );

        let outcomes = [a, b];
        let winners = outcomes.iter().filter(|r| r.is_ok()).count();
        let rejected = outcomes
            .iter()
            .filter(|r| matches!(r, Err(AgentPayError::InvalidTransition { .. })))
            .count();
        assert_eq!(winners, 1);
        assert_eq!(rejected, 1);
        assert_eq!(harness.ledger.lookups(), 1);

        let done = wait_for_terminal(&harness.orchestrator, &job.id).await;
        let verified = done
            .history()
            .iter()
            .filter(|t| t.to == JobState::PaymentVerified)
            .count();
        assert_eq!(verified, 1);
    }

    #[tokio::test]
    async fn test_execution_error_preserved() {
        let harness = Harness::with_executor(Arc::new(FailingExecutor::new("agent crashed: rate limited")));
        harness.ledger.record("abc123", SELLER, 2_000_000);
        let job = harness.create().await;

        harness.orchestrator.submit_payment(&job.id, "abc123").await.unwrap();
        let done = wait_for_terminal(&harness.orchestrator, &job.id).await;

        assert_eq!(done.state(), JobState::Failed);
        assert_eq!(done.error(), Some("agent crashed: rate limited"));
        assert!(done.result().is_none());
    }

    #[tokio::test]
    async fn test_execution_timeout() {
        let harness = Harness::build(
            Duration::ZERO,
            Arc::new(SlowExecutor(Duration::from_secs(5))),
            Some(Duration::from_millis(50)),
        );
        harness.ledger.record("abc123", SELLER, 2_000_000);
        let job = harness.create().await;

        harness.orchestrator.submit_payment(&job.id, "abc123").await.unwrap();
        let done = wait_for_terminal(&harness.orchestrator, &job.id).await;

        assert_eq!(done.state(), JobState::Failed);
        assert_eq!(done.error(), Some(EXECUTION_TIMEOUT));
    }

    #[tokio::test]
    async fn test_executor_panic_fails_job() {
        let harness = Harness::with_executor(Arc::new(PanickingExecutor));
        harness.ledger.record("abc123", SELLER, 2_000_000);
        let job = harness.create().await;

        harness.orchestrator.submit_payment(&job.id, "abc123").await.unwrap();
        let done = wait_for_terminal(&harness.orchestrator, &job.id).await;

        assert_eq!(done.state(), JobState::Failed);
        assert_eq!(done.error(), Some(EXECUTOR_PANICKED));
    }

    #[tokio::test]
    async fn test_status_readable_while_executing() {
        let gate = Arc::new(GatedExecutor::default());
        let harness = Harness::with_executor(gate.clone());
        harness.ledger.record("abc123", SELLER, 2_000_000);
        let job = harness.create().await;

        harness.orchestrator.submit_payment(&job.id, "abc123").await.unwrap();

        let status = tokio::time::timeout(
            Duration::from_secs(1),
            harness.orchestrator.get_status(&job.id),
        )
        .await
        .expect("status read blocked behind execution")
        .unwrap();
        assert_eq!(status.state(), JobState::Executing);

        gate.release();
        let done = wait_for_terminal(&harness.orchestrator, &job.id).await;
        assert_eq!(done.state(), JobState::Completed);
    }

    #[tokio::test]
    async fn test_certificate_issued_after_completion() {
        let harness = Harness::new();
        let orchestrator = harness
            .orchestrator
            .clone()
            .with_minter(Arc::new(agentpay_executor::MockCertificateMinter::default()));
        harness.ledger.record("abc123", SELLER, 2_000_000);

        let job = orchestrator
            .create_job("addr_test1qbuyer", TaskInput::new("draft an email"))
            .await
            .unwrap();
        orchestrator.submit_payment(&job.id, "abc123").await.unwrap();

        let done = wait_for(&orchestrator, &job.id, |job| job.certificate().is_some()).await;
        let certificate = done.certificate().unwrap();
        assert_eq!(certificate.owner, "addr_test1qbuyer");
        assert!(certificate.matches(&done.id, done.result().unwrap()));
    }

    #[tokio::test]
    async fn test_minting_failure_keeps_completed() {
        let harness = Harness::new();
        let orchestrator = harness
            .orchestrator
            .clone()
            .with_minter(Arc::new(FailingMinter));
        harness.ledger.record("abc123", SELLER, 2_000_000);

        let job = orchestrator
            .create_job("w1", TaskInput::new("draft an email"))
            .await
            .unwrap();
        orchestrator.submit_payment(&job.id, "abc123").await.unwrap();

        let done = wait_for_terminal(&orchestrator, &job.id).await;
        // Give the hook time to run and fail.
        tokio::time::sleep(Duration::from_millis(50)).await;
        let done = orchestrator.get_status(&done.id).await.unwrap();

        assert_eq!(done.state(), JobState::Completed);
        assert!(done.certificate().is_none());
        assert!(done.error().is_none());
    }

    async fn age(orchestrator: &Orchestrator, id: &JobId) {
        orchestrator
            .store()
            .update(
                id,
                Box::new(|job| {
                    job.updated_at = job.updated_at - chrono::Duration::hours(2);
                    Ok(())
                }),
            )
            .await
            .unwrap();
    }

    fn hourly() -> RetentionPolicy {
        RetentionPolicy {
            retention: Duration::from_secs(3600),
            sweep_interval: Duration::from_secs(60),
        }
    }

    #[tokio::test]
    async fn test_sweep_spares_job_under_verification() {
        let harness = Harness::with_verifier_delay(Duration::from_millis(200));
        harness.ledger.record("abc123", SELLER, 2_000_000);
        let job = harness.create().await;

        let orchestrator = harness.orchestrator.clone();
        let id = job.id;
        let submit = tokio::spawn(async move { orchestrator.submit_payment(&id, "abc123").await });

        tokio::time::sleep(Duration::from_millis(50)).await;
        age(&harness.orchestrator, &job.id).await;
        let evicted = harness.orchestrator.sweep_expired(&hourly()).await;
        assert!(evicted.is_empty());

        let submitted = submit.await.unwrap().unwrap();
        assert_ne!(submitted.state(), JobState::Failed);
        let done = wait_for_terminal(&harness.orchestrator, &job.id).await;
        assert_eq!(done.state(), JobState::Completed);
        assert_eq!(harness.orchestrator.open_gates(), 0);
    }

    #[tokio::test]
    async fn test_sweep_drops_idle_gate_with_job() {
        let harness = Harness::new();
        harness.ledger.set_unavailable(true);
        let job = harness.create().await;

        let err = harness
            .orchestrator
            .submit_payment(&job.id, "abc123")
            .await
            .unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(harness.orchestrator.open_gates(), 1);

        age(&harness.orchestrator, &job.id).await;
        let evicted = harness.orchestrator.sweep_expired(&hourly()).await;

        assert_eq!(evicted, vec![job.id]);
        assert_eq!(harness.orchestrator.open_gates(), 0);
        assert!(matches!(
            harness.orchestrator.get_status(&job.id).await,
            Err(AgentPayError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_sweep_keeps_fresh_jobs() {
        let harness = Harness::new();
        let job = harness.create().await;

        assert!(harness.orchestrator.sweep_expired(&hourly()).await.is_empty());
        assert!(harness.orchestrator.get_status(&job.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_invalid_input_not_stored() {
        let harness = Harness::new();

        let err = harness
            .orchestrator
            .create_job("w1", TaskInput::new("  "))
            .await
            .unwrap_err();

        assert!(matches!(err, AgentPayError::InvalidInput(_)));
        assert!(harness.orchestrator.list_jobs().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_tx_hash_rejected() {
        let harness = Harness::new();
        let job = harness.create().await;

        let err = harness
            .orchestrator
            .submit_payment(&job.id, " ")
            .await
            .unwrap_err();

        assert!(matches!(err, AgentPayError::InvalidInput(_)));
        assert_eq!(
            harness.orchestrator.get_status(&job.id).await.unwrap().state(),
            JobState::AwaitingPayment
        );
    }
}
