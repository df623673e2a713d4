//! Chat turn handler

use super::types::{ApiError, ChatTurnRequest, ChatTurnResponse};
use crate::AppState;
use axum::{extract::State, response::Json, Json as JsonExtractor};
use tracing::info;

/// Submit one conversation turn
#[utoipa::path(
    post,
    path = "/api/chat",
    tag = "Chat",
    summary = "Submit a message",
    description = "Run one conversation turn: echo, generation call, mode-selected rendering, \
                   and the all-or-nothing append. A failed turn returns the echo plus a \
                   sanitized notice; the stored log stays unchanged.",
    request_body = ChatTurnRequest,
    responses(
        (status = 200, description = "Turn finished (committed or failed)", body = ChatTurnResponse),
        (status = 400, description = "Empty message"),
        (status = 404, description = "Session not found"),
        (status = 409, description = "A generation call is already outstanding")
    )
)]
pub async fn chat_turn(
    State(state): State<AppState>,
    JsonExtractor(request): JsonExtractor<ChatTurnRequest>,
) -> Result<Json<ChatTurnResponse>, ApiError> {
    info!(session_id = %request.session_id, "Processing chat turn");

    let outcome = state
        .dispatcher
        .handle(&request.session_id, &request.message)
        .await?;

    Ok(Json(ChatTurnResponse::from(outcome)))
}
