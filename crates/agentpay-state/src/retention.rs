//! Retention policy for stored jobs.

use std::time::Duration;

use agentpay_core::JobId;
use chrono::{DateTime, Utc};
use tracing::warn;

use crate::store::{JobStore, SweepGuard};

/// How long finished or abandoned jobs are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionPolicy {
    /// Age after which an evictable job is dropped. Zero disables eviction.
    pub retention: Duration,

    /// How often the sweeper runs.
    pub sweep_interval: Duration,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            retention: Duration::from_secs(24 * 60 * 60),
            sweep_interval: Duration::from_secs(60),
        }
    }
}

impl RetentionPolicy {
    /// A policy that never evicts.
    pub fn disabled() -> Self {
        Self {
            retention: Duration::ZERO,
            ..Self::default()
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.retention.is_zero()
    }

    /// Jobs last touched before the returned instant are evictable.
    pub fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        chrono::Duration::from_std(self.retention)
            .ok()
            .and_then(|retention| now.checked_sub_signed(retention))
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Run one sweep now, sparing jobs `pinned` keeps. Returns the evicted ids.
    pub async fn sweep_once(&self, store: &dyn JobStore, pinned: SweepGuard<'_>) -> Vec<JobId> {
        if !self.is_enabled() {
            return Vec::new();
        }
        match store.sweep(self.cutoff(Utc::now()), pinned).await {
            Ok(evicted) => evicted,
            Err(e) => {
                warn!(error = %e, "Job sweep failed");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryJobStore;
    use agentpay_core::{Job, JobState, PaymentTerms, TaskInput};

    #[test]
    fn test_cutoff() {
        let policy = RetentionPolicy {
            retention: Duration::from_secs(60),
            sweep_interval: Duration::from_secs(1),
        };
        let now = Utc::now();
        assert_eq!(now - policy.cutoff(now), chrono::Duration::seconds(60));
    }

    #[tokio::test]
    async fn test_disabled_policy_keeps_everything() {
        let store = InMemoryJobStore::new();
        let terms = PaymentTerms::new("addr_test1qseller", 1).unwrap();
        let mut job = Job::new("w1", TaskInput::new("text"), &terms).unwrap();
        job.transition(JobState::AwaitingPayment).unwrap();
        store.put(job).await.unwrap();

        assert!(RetentionPolicy::disabled()
            .sweep_once(&store, &|_| false)
            .await
            .is_empty());
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_sweep_once_evicts_stale() {
        let store = InMemoryJobStore::new();
        let terms = PaymentTerms::new("addr_test1qseller", 1).unwrap();
        let mut job = Job::new("w1", TaskInput::new("text"), &terms).unwrap();
        job.transition(JobState::AwaitingPayment).unwrap();
        job.updated_at = Utc::now() - chrono::Duration::hours(2);
        let id = job.id;
        store.put(job).await.unwrap();

        let policy = RetentionPolicy {
            retention: Duration::from_secs(3600),
            sweep_interval: Duration::from_secs(1),
        };
        assert_eq!(policy.sweep_once(&store, &|_| false).await, vec![id]);
        assert_eq!(store.len().await, 0);
    }
}
