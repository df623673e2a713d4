//! Session lifecycle and mode selector handlers

use super::types::{
    ApiError, CreateSessionResponse, ModeCardDto, ModeSelectRequest, ModeSelectResponse,
    SessionListResponse, SessionSummary,
};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    Json as JsonExtractor,
};
use refdesk_app::{render, FailureKind};
use tracing::info;

/// Create a new session (browser connect)
#[utoipa::path(
    post,
    path = "/api/sessions",
    tag = "Sessions",
    summary = "Create a session",
    description = "Create a new chat session; runs the one-time backend initialization first",
    responses(
        (status = 200, description = "Session created", body = CreateSessionResponse),
        (status = 503, description = "Initialization failed")
    )
)]
pub async fn create_session(
    State(state): State<AppState>,
) -> Result<Json<CreateSessionResponse>, ApiError> {
    // Initialization is the first risky step of the first render pass. On
    // failure it is reported once and halts this pass; the process keeps
    // serving and the next connect retries.
    if let Err(err) = state.ensure_initialized().await {
        let notice = state
            .dispatcher
            .reporter()
            .report(FailureKind::Initialization, &err);
        return Err(ApiError::Failure(notice));
    }

    let session_id = state.store.create_session().await;
    let info = state.store.get_info(&session_id).await?;

    info!(session_id = %session_id, "Session created");
    Ok(Json(CreateSessionResponse {
        session_id,
        mode_label: state.catalog.label_for_mode(info.mode).to_string(),
    }))
}

/// List active sessions
#[utoipa::path(
    get,
    path = "/api/sessions",
    tag = "Sessions",
    summary = "List sessions",
    responses(
        (status = 200, description = "Active sessions", body = SessionListResponse)
    )
)]
pub async fn list_sessions(State(state): State<AppState>) -> Json<SessionListResponse> {
    let sessions: Vec<SessionSummary> = state
        .store
        .list_sessions()
        .await
        .iter()
        .map(|info| SessionSummary::from_info(info, &state.catalog))
        .collect();

    let count = sessions.len();
    Json(SessionListResponse { sessions, count })
}

/// Remove a session (browser disconnect)
#[utoipa::path(
    delete,
    path = "/api/sessions/{session_id}",
    tag = "Sessions",
    summary = "Remove a session",
    params(
        ("session_id" = String, Path, description = "Session ID")
    ),
    responses(
        (status = 204, description = "Session removed"),
        (status = 404, description = "Session not found")
    )
)]
pub async fn remove_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.store.remove_session(&session_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Apply a mode-selector event
#[utoipa::path(
    post,
    path = "/api/mode",
    tag = "Sessions",
    summary = "Select the answer mode",
    description = "Bind the sidebar selection to the session; idempotent on repeated events",
    request_body = ModeSelectRequest,
    responses(
        (status = 200, description = "Mode applied", body = ModeSelectResponse),
        (status = 400, description = "Unknown mode label"),
        (status = 404, description = "Session not found")
    )
)]
pub async fn select_mode(
    State(state): State<AppState>,
    JsonExtractor(request): JsonExtractor<ModeSelectRequest>,
) -> Result<Json<ModeSelectResponse>, ApiError> {
    // The selector can only produce the two catalog labels; anything else is
    // rejected here and never reaches dispatch.
    let mode = state
        .catalog
        .mode_for_label(&request.mode_label)
        .ok_or_else(|| ApiError::BadRequest(format!("Unknown mode label: {}", request.mode_label)))?;

    let mode = state.store.select_mode(&request.session_id, mode).await?;
    let cards = render::sidebar_cards(&state.catalog, mode);

    Ok(Json(ModeSelectResponse {
        mode_label: state.catalog.label_for_mode(mode).to_string(),
        cards: cards.iter().map(ModeCardDto::from).collect(),
    }))
}
