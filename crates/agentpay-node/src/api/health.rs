//! Service endpoints: health, availability and input schema.

use axum::Json;
use serde::Serialize;
use serde_json::{json, Value};

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub service: String,
}

/// Health check endpoint.
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        service: "agentpay".to_string(),
    })
}

/// Availability response.
#[derive(Serialize)]
pub struct AvailabilityResponse {
    pub status: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
}

/// Whether the agent accepts new jobs.
pub async fn availability() -> Json<AvailabilityResponse> {
    Json(AvailabilityResponse {
        status: "available".to_string(),
        kind: "masumi-agent".to_string(),
        message: "Server operational.".to_string(),
    })
}

/// Fields accepted in `input_payload` when creating a job.
pub async fn input_schema() -> Json<Value> {
    Json(json!({
        "input_data": [
            {
                "id": "text",
                "type": "string",
                "name": "Task Description",
                "data": {
                    "description": "The text input for the AI task",
                    "placeholder": "Enter your task description here"
                }
            },
            {
                "id": "task_type",
                "type": "option",
                "name": "Task Type",
                "data": {
                    "description": "What the agent should do with the text",
                    "values": ["research", "summarize", "reply"],
                    "default": "reply"
                }
            }
        ]
    }))
}
