//! Application state.

use agentpay_core::Result;
use agentpay_state::{InMemoryJobStore, RetentionPolicy};
use std::sync::Arc;

use crate::config::NodeConfig;
use crate::orchestrator::Orchestrator;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// The job orchestrator.
    pub orchestrator: Orchestrator,

    /// Retention applied by the background sweeper.
    pub retention: RetentionPolicy,
}

impl AppState {
    /// Create state around an existing orchestrator.
    pub fn new(orchestrator: Orchestrator) -> Self {
        Self {
            orchestrator,
            retention: RetentionPolicy::default(),
        }
    }

    /// Wire the configured collaborators into a fresh orchestrator.
    pub fn from_config(config: &NodeConfig) -> Result<Self> {
        let mut orchestrator = Orchestrator::new(
            Arc::new(InMemoryJobStore::new()),
            config.ledger_verifier()?,
            config.task_executor()?,
            config.payment_terms()?,
        );

        if let Some(timeout) = config.execution_timeout() {
            orchestrator = orchestrator.with_execution_timeout(timeout);
        }
        if let Some(minter) = config.certificate_minter() {
            orchestrator = orchestrator.with_minter(minter);
        }
        if let Some(owner) = config
            .certificate
            .cert_owner_address
            .as_deref()
            .filter(|owner| !owner.trim().is_empty())
        {
            orchestrator = orchestrator.with_certificate_owner(owner);
        }

        Ok(Self {
            retention: config.retention_policy(),
            ..Self::new(orchestrator)
        })
    }

    /// Run the retention sweeper until the runtime shuts down.
    pub fn spawn_sweeper(&self) {
        tokio::spawn(self.orchestrator.clone().run_sweeper(self.retention));
    }
}
