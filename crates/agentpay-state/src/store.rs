//! Job store implementations.

use async_trait::async_trait;
use agentpay_core::{AgentPayError, Job, JobId, JobState, Result};
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

/// Mutation applied by [`JobStore::update`].
pub type JobMutator<'a> = Box<dyn FnOnce(&mut Job) -> Result<()> + Send + 'a>;

/// Jobs for which this returns true survive a sweep regardless of age.
pub type SweepGuard<'a> = &'a (dyn Fn(&JobId) -> bool + Send + Sync);

/// Trait for job stores.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Insert a new job. Fails if the id is already taken.
    async fn put(&self, job: Job) -> Result<()>;

    /// Get a job by id.
    async fn get(&self, id: &JobId) -> Result<Job>;

    /// Atomically apply `mutator` to a job and return the committed record.
    ///
    /// The mutator works on a draft; if it returns an error nothing is written.
    async fn update(&self, id: &JobId, mutator: JobMutator<'_>) -> Result<Job>;

    /// All jobs, in no particular order.
    async fn list(&self) -> Result<Vec<Job>>;

    /// Remove a job.
    async fn remove(&self, id: &JobId) -> Result<Option<Job>>;

    /// Evict jobs that are finished or still unpaid and were last touched
    /// before `cutoff`, except those `pinned` keeps. Returns the evicted ids.
    ///
    /// `pinned` is consulted while the job's entry is locked, so a job it
    /// keeps cannot be evicted by this call.
    async fn sweep(&self, cutoff: DateTime<Utc>, pinned: SweepGuard<'_>) -> Result<Vec<JobId>>;

    /// Number of stored jobs.
    async fn len(&self) -> usize;
}

/// Whether a job may be dropped by the retention sweep.
pub fn is_evictable(job: &Job, cutoff: DateTime<Utc>) -> bool {
    if job.updated_at >= cutoff {
        return false;
    }
    match job.state() {
        JobState::Completed | JobState::Failed => true,
        JobState::Created => true,
        JobState::AwaitingPayment => job.tx_hash().is_none(),
        JobState::PaymentVerified | JobState::Executing => false,
    }
}

/// In-memory implementation of JobStore.
///
/// Backed by a sharded map: calls for different ids only contend when they
/// hash to the same shard, and then only for the length of a clone.
#[derive(Default)]
pub struct InMemoryJobStore {
    jobs: DashMap<JobId, Job>,
}

impl InMemoryJobStore {
    /// Create a new in-memory job store.
    pub fn new() -> Self {
        Self {
            jobs: DashMap::new(),
        }
    }
}

#[async_trait]
impl JobStore for InMemoryJobStore {
    async fn put(&self, job: Job) -> Result<()> {
        match self.jobs.entry(job.id) {
            Entry::Occupied(_) => Err(AgentPayError::Internal(format!(
                "job {} already exists",
                job.id
            ))),
            Entry::Vacant(slot) => {
                slot.insert(job);
                Ok(())
            }
        }
    }

    async fn get(&self, id: &JobId) -> Result<Job> {
        self.jobs
            .get(id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| AgentPayError::not_found(id))
    }

    async fn update(&self, id: &JobId, mutator: JobMutator<'_>) -> Result<Job> {
        let mut entry = self
            .jobs
            .get_mut(id)
            .ok_or_else(|| AgentPayError::not_found(id))?;

        let mut draft = entry.value().clone();
        mutator(&mut draft)?;
        *entry.value_mut() = draft.clone();

        Ok(draft)
    }

    async fn list(&self) -> Result<Vec<Job>> {
        Ok(self.jobs.iter().map(|entry| entry.value().clone()).collect())
    }

    async fn remove(&self, id: &JobId) -> Result<Option<Job>> {
        Ok(self.jobs.remove(id).map(|(_, job)| job))
    }

    async fn sweep(&self, cutoff: DateTime<Utc>, pinned: SweepGuard<'_>) -> Result<Vec<JobId>> {
        let mut evicted = Vec::new();
        self.jobs.retain(|id, job| {
            if is_evictable(job, cutoff) && !pinned(id) {
                evicted.push(*id);
                false
            } else {
                true
            }
        });

        if !evicted.is_empty() {
            tracing::info!(count = evicted.len(), "Evicted expired jobs");
        }

        Ok(evicted)
    }

    async fn len(&self) -> usize {
        self.jobs.len()
    }
}
