//! Job API endpoints.

use agentpay_core::{
    AgentPayError, Certificate, Job, JobId, JobState, StateTransition, TaskInput, TaskOutput,
};
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::ApiError;
use crate::state::AppState;

/// Request to create a job.
#[derive(Debug, Deserialize)]
pub struct CreateJobRequest {
    /// Opaque purchaser identifier.
    #[serde(alias = "identifier_from_purchaser")]
    pub purchaser_ref: String,

    /// The task to run once paid.
    #[serde(alias = "input_data")]
    pub input_payload: TaskInput,
}

/// Response after creating a job.
#[derive(Debug, Serialize)]
pub struct CreateJobResponse {
    pub id: JobId,
    pub state: JobState,
    pub destination_address: String,
    pub required_amount: u64,
    pub message: String,
}

/// Payment reference, from the JSON body or the query string.
#[derive(Debug, Default, Deserialize)]
pub struct PaymentRequest {
    pub tx_hash: Option<String>,
}

/// Response after a payment submission.
#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    pub id: JobId,
    pub state: JobState,
    pub tx_hash: Option<String>,
    pub error: Option<String>,
}

/// Full job view.
#[derive(Debug, Serialize)]
pub struct JobResponse {
    pub id: JobId,
    pub state: JobState,
    pub purchaser_ref: String,
    pub required_amount: u64,
    pub destination_address: String,
    pub tx_hash: Option<String>,
    pub result: Option<TaskOutput>,
    pub error: Option<String>,
    pub certificate: Option<Certificate>,
    pub history: Vec<StateTransition>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Job> for JobResponse {
    fn from(job: Job) -> Self {
        Self {
            id: job.id,
            state: job.state(),
            tx_hash: job.tx_hash().map(str::to_string),
            result: job.result().cloned(),
            error: job.error().map(str::to_string),
            certificate: job.certificate().cloned(),
            history: job.history().to_vec(),
            purchaser_ref: job.purchaser_ref,
            required_amount: job.required_amount,
            destination_address: job.destination_address,
            created_at: job.created_at,
            updated_at: job.updated_at,
        }
    }
}

/// Job list entry.
#[derive(Debug, Serialize)]
pub struct JobSummary {
    pub id: JobId,
    pub state: JobState,
    pub created_at: DateTime<Utc>,
}

/// Create a job awaiting payment.
pub async fn create_job(
    State(state): State<AppState>,
    request: Result<Json<CreateJobRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateJobResponse>), ApiError> {
    let Json(req) = request.map_err(|e| AgentPayError::InvalidInput(e.body_text()))?;

    let job = state
        .orchestrator
        .create_job(req.purchaser_ref, req.input_payload)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateJobResponse {
            id: job.id,
            state: job.state(),
            message: format!(
                "Send {} lovelace to {} and submit the transaction hash",
                job.required_amount, job.destination_address
            ),
            destination_address: job.destination_address,
            required_amount: job.required_amount,
        }),
    ))
}

/// Submit the payment transaction for a job.
pub async fn submit_payment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<PaymentRequest>,
    body: Option<Json<PaymentRequest>>,
) -> Result<Json<PaymentResponse>, ApiError> {
    let id = JobId::parse(&id)?;
    let tx_hash = body
        .and_then(|Json(body)| body.tx_hash)
        .or(query.tx_hash)
        .ok_or_else(|| AgentPayError::InvalidInput("tx_hash is required".to_string()))?;

    let job = state.orchestrator.submit_payment(&id, &tx_hash).await?;

    Ok(Json(PaymentResponse {
        id: job.id,
        state: job.state(),
        tx_hash: job.tx_hash().map(str::to_string),
        error: job.error().map(str::to_string),
    }))
}

/// Get a job by ID.
pub async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<JobResponse>, ApiError> {
    let id = JobId::parse(&id)?;
    let job = state.orchestrator.get_status(&id).await?;
    Ok(Json(job.into()))
}

/// List all jobs.
pub async fn list_jobs(State(state): State<AppState>) -> Result<Json<Vec<JobSummary>>, ApiError> {
    let jobs = state.orchestrator.list_jobs().await?;

    Ok(Json(
        jobs.into_iter()
            .map(|job| JobSummary {
                id: job.id,
                state: job.state(),
                created_at: job.created_at,
            })
            .collect(),
    ))
}
