//! AgentPay client implementation.

use std::time::Duration;

use agentpay_core::{
    AgentPayError, Certificate, JobId, JobState, Result, StateTransition, TaskInput, TaskOutput,
};
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

/// Client for interacting with an AgentPay node.
#[derive(Clone)]
pub struct AgentPayClient {
    /// Base URL of the node.
    base_url: String,

    /// HTTP client.
    http_client: reqwest::Client,
}

/// A freshly created job and its payment instructions.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedJob {
    pub id: JobId,
    pub state: JobState,
    pub destination_address: String,
    pub required_amount: u64,
    pub message: String,
}

/// Result of a payment submission.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentOutcome {
    pub id: JobId,
    pub state: JobState,
    pub tx_hash: Option<String>,
    pub error: Option<String>,
}

/// Job details as reported by the node.
#[derive(Debug, Clone, Deserialize)]
pub struct JobView {
    pub id: JobId,
    pub state: JobState,
    pub purchaser_ref: String,
    pub required_amount: u64,
    pub destination_address: String,
    pub tx_hash: Option<String>,
    pub result: Option<TaskOutput>,
    pub error: Option<String>,
    pub certificate: Option<Certificate>,
    #[serde(default)]
    pub history: Vec<StateTransition>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Job list entry.
#[derive(Debug, Clone, Deserialize)]
pub struct JobSummary {
    pub id: JobId,
    pub state: JobState,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
struct CreateRequest<'a> {
    purchaser_ref: &'a str,
    input_payload: &'a TaskInput,
}

#[derive(Debug, Serialize)]
struct PaymentRequest<'a> {
    tx_hash: &'a str,
}

/// Error body returned by the node.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    state: Option<JobState>,
}

fn connection_error(e: reqwest::Error) -> AgentPayError {
    AgentPayError::Connection(e.to_string())
}

impl AgentPayClient {
    /// Connect to an AgentPay node.
    pub async fn connect(url: &str) -> Result<Self> {
        let base_url = url.trim_end_matches('/').to_string();
        let http_client = reqwest::Client::new();

        // Verify connection with health check
        http_client
            .get(format!("{}/health", base_url))
            .send()
            .await
            .map_err(connection_error)?
            .error_for_status()
            .map_err(connection_error)?;

        Ok(Self {
            base_url,
            http_client,
        })
    }

    /// Create a job for `input`, billed to `purchaser_ref`.
    pub async fn create_job(&self, purchaser_ref: &str, input: &TaskInput) -> Result<CreatedJob> {
        let response = self
            .http_client
            .post(format!("{}/jobs", self.base_url))
            .json(&CreateRequest {
                purchaser_ref,
                input_payload: input,
            })
            .send()
            .await
            .map_err(connection_error)?;

        parse_response(response, None).await
    }

    /// Submit the payment transaction for a job.
    pub async fn submit_payment(&self, id: &JobId, tx_hash: &str) -> Result<PaymentOutcome> {
        let response = self
            .http_client
            .post(format!("{}/jobs/{}/payment", self.base_url, id))
            .json(&PaymentRequest { tx_hash })
            .send()
            .await
            .map_err(connection_error)?;

        parse_response(response, Some(id)).await
    }

    /// Get the status of a job.
    pub async fn get_status(&self, id: &JobId) -> Result<JobView> {
        let response = self
            .http_client
            .get(format!("{}/jobs/{}", self.base_url, id))
            .send()
            .await
            .map_err(connection_error)?;

        parse_response(response, Some(id)).await
    }

    /// List all jobs known to the node.
    pub async fn list_jobs(&self) -> Result<Vec<JobSummary>> {
        let response = self
            .http_client
            .get(format!("{}/jobs", self.base_url))
            .send()
            .await
            .map_err(connection_error)?;

        parse_response(response, None).await
    }

    /// Poll a job until it is `Completed` or `Failed`.
    pub async fn wait_for_terminal(
        &self,
        id: &JobId,
        poll_interval: Duration,
        timeout: Duration,
    ) -> Result<JobView> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let job = self.get_status(id).await?;
            if job.state.is_terminal() {
                return Ok(job);
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(AgentPayError::Internal(format!(
                    "job {} still {} after {:?}",
                    id, job.state, timeout
                )));
            }
            debug!(job_id = %id, state = %job.state, "Waiting for job");
            tokio::time::sleep(poll_interval).await;
        }
    }
}

async fn parse_response<T: DeserializeOwned>(
    response: reqwest::Response,
    id: Option<&JobId>,
) -> Result<T> {
    let status = response.status();
    if status.is_success() {
        return response
            .json()
            .await
            .map_err(|e| AgentPayError::Serialization(e.to_string()));
    }

    let text = response.text().await.unwrap_or_default();
    let body: ErrorBody = serde_json::from_str(&text).unwrap_or(ErrorBody {
        message: text,
        state: None,
    });
    let id = id.map(ToString::to_string).unwrap_or_default();

    Err(match status {
        StatusCode::NOT_FOUND => AgentPayError::NotFound { id },
        StatusCode::CONFLICT => match body.state {
            Some(state) => AgentPayError::InvalidTransition {
                id,
                state,
                message: body.message,
            },
            None => AgentPayError::Internal(format!("{} without job state: {}", status, body.message)),
        },
        StatusCode::SERVICE_UNAVAILABLE => AgentPayError::TransientLookup {
            message: body.message,
        },
        StatusCode::BAD_REQUEST => AgentPayError::InvalidInput(body.message),
        _ => AgentPayError::Internal(format!("{}: {}", status, body.message)),
    })
}
