//! Error responses.

use agentpay_core::{AgentPayError, JobState};
use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;

/// Seconds a client should wait before retrying a transient failure.
const RETRY_AFTER_SECS: &str = "5";

/// JSON body of every error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Stable error code.
    pub error: String,
    pub message: String,
    /// Whether the same request may succeed later.
    pub retryable: bool,
    /// Current job state, for transition errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<JobState>,
}

/// An `AgentPayError` rendered as an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub AgentPayError);

impl From<AgentPayError> for ApiError {
    fn from(err: AgentPayError) -> Self {
        Self(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            AgentPayError::NotFound { .. } => StatusCode::NOT_FOUND,
            AgentPayError::InvalidTransition { .. } => StatusCode::CONFLICT,
            AgentPayError::TransientLookup { .. } | AgentPayError::Connection(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            AgentPayError::InvalidInput(_) | AgentPayError::Serialization(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() && !self.0.is_retryable() {
            error!(error = %self.0, "Request failed");
        }

        let state = match &self.0 {
            AgentPayError::InvalidTransition { state, .. } => Some(*state),
            _ => None,
        };
        let body = ErrorBody {
            error: self.0.code().to_string(),
            message: self.0.to_string(),
            retryable: self.0.is_retryable(),
            state,
        };

        if body.retryable {
            (status, [(header::RETRY_AFTER, RETRY_AFTER_SECS)], Json(body)).into_response()
        } else {
            (status, Json(body)).into_response()
        }
    }
}
