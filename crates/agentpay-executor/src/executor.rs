//! Task executor trait.

use async_trait::async_trait;
use agentpay_core::{Result, TaskInput, TaskOutput};

/// Runs a paid text task.
///
/// Failures are reported as `AgentPayError::Execution` whose cause is stored
/// on the job as-is, so it should read well to the purchaser.
#[async_trait]
pub trait TaskExecutor: Send + Sync {
    /// Run the task described by `input`.
    async fn execute(&self, input: &TaskInput) -> Result<TaskOutput>;

    /// Short name used in logs.
    fn name(&self) -> &'static str;
}
