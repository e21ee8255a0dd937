//! Axum route handlers for the chat assistant and the toxicity lookup.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::assistant::chat::ChatSession;
use crate::assistant::forms::LookupForm;
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct ToxicityRequest {
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct ToxicityResponse {
    pub name: String,
    pub toxicity: String,
}

/// POST /api/v1/chat/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
) -> (StatusCode, Json<ChatSession>) {
    let session = state.chat_sessions.create().await;
    debug!(session_id = %session.id, "Chat session created");
    (StatusCode::CREATED, Json(session))
}

/// GET /api/v1/chat/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<ChatSession>, AppError> {
    state
        .chat_sessions
        .get(session_id)
        .await
        .map(Json)
        .ok_or_else(|| session_not_found(session_id))
}

/// DELETE /api/v1/chat/sessions/:id
pub async fn handle_delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.chat_sessions.remove(session_id).await {
        debug!(session_id = %session_id, "Chat session closed");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(session_not_found(session_id))
    }
}

/// POST /api/v1/chat/sessions/:id/messages
///
/// Appends the user's message and the assistant's answer. A backend failure is
/// recorded in the transcript as an error message rather than returned as an HTTP error.
/// Only one message per session may be in flight; a second one gets 409.
pub async fn handle_send_message(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<SendMessageRequest>,
) -> Result<Json<ChatSession>, AppError> {
    let outgoing = state
        .chat_sessions
        .update(session_id, |session| {
            if session.is_typing {
                return Err(AppError::Conflict(
                    "a reply is still pending for this session".to_string(),
                ));
            }
            session.set_input(request.message);
            session
                .begin_send()
                .ok_or_else(|| AppError::Validation("message cannot be empty".to_string()))
        })
        .await
        .ok_or_else(|| session_not_found(session_id))??;

    // The exchange runs in its own task so that a dropped request still clears `is_typing`.
    // The session lock is not held while the backend answers.
    let task_state = state.clone();
    let exchange = tokio::spawn(async move {
        let reply = task_state.backend.chat(&outgoing).await;
        task_state
            .chat_sessions
            .update(session_id, |session| {
                match reply {
                    Ok(text) => session.receive_reply(text),
                    Err(e) => {
                        warn!(session_id = %session_id, "Chat backend call failed: {e}");
                        session.receive_failure();
                    }
                }
                session.clone()
            })
            .await
    });

    exchange
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("chat exchange task failed: {e}")))?
        .map(Json)
        .ok_or_else(|| session_not_found(session_id))
}

/// POST /api/v1/toxicity
pub async fn handle_toxicity(
    State(state): State<AppState>,
    Json(request): Json<ToxicityRequest>,
) -> Result<Json<ToxicityResponse>, AppError> {
    let name = LookupForm::with_query(request.name)
        .submission()
        .ok_or_else(|| AppError::Validation("name cannot be empty".to_string()))?;

    let toxicity = state.backend.fetch_toxicity(&name).await?;
    Ok(Json(ToxicityResponse { name, toxicity }))
}

fn session_not_found(session_id: Uuid) -> AppError {
    AppError::NotFound(format!("Chat session {session_id} not found"))
}
