use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::chat::ChatMessage;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct SendMessageRequest {
    #[serde(default)]
    pub content: String,
}

#[derive(Serialize)]
pub struct TranscriptResponse {
    pub problem_id: String,
    pub messages: Vec<ChatMessage>,
}

async fn ensure_problem(state: &AppState, id: &str) -> Result<(), AppError> {
    match state.problems.get_problem_by_id(id).await {
        Some(_) => Ok(()),
        None => Err(AppError::NotFound(format!("Problem {id} not found"))),
    }
}

/// GET /api/v1/problems/:id/chat
pub async fn handle_transcript(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TranscriptResponse>, AppError> {
    ensure_problem(&state, &id).await?;
    Ok(Json(TranscriptResponse {
        messages: state.assistant.transcript(&id).await,
        problem_id: id,
    }))
}

/// POST /api/v1/problems/:id/chat
///
/// Resolves once the assistant's reply has been appended.
pub async fn handle_send_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<SendMessageRequest>,
) -> Result<Json<TranscriptResponse>, AppError> {
    ensure_problem(&state, &id).await?;
    if state.assistant.send_message(&id, &req.content).await.is_none() {
        return Err(AppError::Validation("Message cannot be empty".to_string()));
    }
    Ok(Json(TranscriptResponse {
        messages: state.assistant.transcript(&id).await,
        problem_id: id,
    }))
}

/// DELETE /api/v1/problems/:id/chat
pub async fn handle_clear_history(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    ensure_problem(&state, &id).await?;
    state.assistant.clear_chat_history(&id).await;
    Ok(StatusCode::NO_CONTENT)
}
