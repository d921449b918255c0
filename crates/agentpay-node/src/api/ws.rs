//! WebSocket job status stream.

use agentpay_core::{JobId, JobState};
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    response::Response,
};
use serde::{Deserialize, Serialize};
use tokio::time::{interval, Duration};
use tracing::debug;

use super::error::ApiError;
use crate::state::AppState;

/// WebSocket message for job updates.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JobStreamMessage {
    /// The job changed state.
    StatusUpdate {
        job_id: JobId,
        state: JobState,
        error: Option<String>,
    },
    /// The job is gone or could not be read.
    Error { message: String },
}

/// Stream state changes of one job until it finishes.
pub async fn job_stream(
    ws: WebSocketUpgrade,
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Response, ApiError> {
    let id = JobId::parse(&id)?;
    Ok(ws.on_upgrade(move |socket| handle_job_stream(socket, id, state)))
}

async fn send(socket: &mut WebSocket, msg: &JobStreamMessage) -> bool {
    match serde_json::to_string(msg) {
        Ok(json) => socket.send(Message::Text(json.into())).await.is_ok(),
        Err(_) => false,
    }
}

async fn handle_job_stream(mut socket: WebSocket, job_id: JobId, state: AppState) {
    let mut poll_interval = interval(Duration::from_millis(500));
    let mut last_state: Option<JobState> = None;

    loop {
        tokio::select! {
            _ = poll_interval.tick() => {
                let job = match state.orchestrator.get_status(&job_id).await {
                    Ok(job) => job,
                    Err(e) => {
                        let msg = JobStreamMessage::Error { message: e.to_string() };
                        send(&mut socket, &msg).await;
                        break;
                    }
                };

                // Only send if state changed
                if last_state == Some(job.state()) {
                    continue;
                }
                last_state = Some(job.state());

                let msg = JobStreamMessage::StatusUpdate {
                    job_id,
                    state: job.state(),
                    error: job.error().map(str::to_string),
                };
                if !send(&mut socket, &msg).await || job.state().is_terminal() {
                    break;
                }
            }
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(Message::Ping(data))) => {
                        let _ = socket.send(Message::Pong(data)).await;
                    }
                    _ => {}
                }
            }
        }
    }

    debug!(job_id = %job_id, "Job stream closed");
    let _ = socket.send(Message::Close(None)).await;
}
