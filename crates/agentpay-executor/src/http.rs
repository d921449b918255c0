//! Executor that delegates to an external agent service over HTTP.

use std::time::Duration;

use async_trait::async_trait;
use agentpay_core::{AgentPayError, Result, TaskInput, TaskOutput};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::executor::TaskExecutor;

/// Request body sent to the agent service.
#[derive(Debug, Serialize)]
struct AgentRequest<'a> {
    text: &'a str,
    task: &'a str,
}

/// Response body expected from the agent service.
#[derive(Debug, Deserialize)]
struct AgentResponse {
    result: String,
}

/// Calls `POST <endpoint>` with `{text, task}` and expects `{result}`.
pub struct HttpTaskExecutor {
    endpoint: String,
    http_client: reqwest::Client,
}

impl HttpTaskExecutor {
    /// Create an executor for the given endpoint.
    ///
    /// `timeout` bounds a single request; the orchestrator applies its own
    /// execution deadline on top.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let endpoint = endpoint.into();
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(AgentPayError::Configuration(format!(
                "agent service URL must be http(s), got '{}'",
                endpoint
            )));
        }

        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AgentPayError::Configuration(e.to_string()))?;

        Ok(Self {
            endpoint,
            http_client,
        })
    }
}

#[async_trait]
impl TaskExecutor for HttpTaskExecutor {
    async fn execute(&self, input: &TaskInput) -> Result<TaskOutput> {
        let request = AgentRequest {
            text: &input.text,
            task: input.task_type.as_str(),
        };

        let response = self
            .http_client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| AgentPayError::execution(format!("agent service unreachable: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(%status, body = %body, "Agent service returned an error");
            return Err(AgentPayError::execution(format!(
                "agent service returned {}: {}",
                status, body
            )));
        }

        let body: AgentResponse = response
            .json()
            .await
            .map_err(|e| AgentPayError::execution(format!("invalid agent response: {}", e)))?;

        if body.result.trim().is_empty() {
            return Err(AgentPayError::execution("agent returned an empty result"));
        }

        debug!(task = input.task_type.as_str(), chars = body.result.len(), "Agent task finished");

        Ok(TaskOutput {
            task_type: input.task_type,
            content: body.result,
        })
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
