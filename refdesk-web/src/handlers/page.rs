//! Page rendering handlers

use super::types::{ApiError, PageResponse};
use crate::templates::ChatTemplate;
use crate::AppState;
use askama::Template;
use axum::{
    extract::{Path, State},
    response::{Html, Json},
};
use refdesk_app::{
    render::{render_page, PageState},
    FailureKind, PageView,
};

/// Render the current page state of a session
#[utoipa::path(
    get,
    path = "/api/page/{session_id}",
    tag = "Page",
    summary = "Render the page state",
    description = "Pure render of the session's current state: sidebar cards, replayed \
                   conversation log, busy flag. A replay failure halts the pass and returns \
                   a chrome-only view carrying the notice.",
    params(
        ("session_id" = String, Path, description = "Session ID")
    ),
    responses(
        (status = 200, description = "Page state", body = PageResponse),
        (status = 404, description = "Session not found")
    )
)]
pub async fn get_page(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<PageResponse>, ApiError> {
    let snapshot = state.store.snapshot(&session_id).await?;

    let page_state = PageState {
        mode: snapshot.mode,
        messages: snapshot.messages,
        busy: snapshot.busy,
        notice: None,
    };

    match render_page(&state.catalog, &page_state) {
        Ok(view) => Ok(Json(PageResponse::from(view))),
        Err(err) => {
            // Log replay failed: report once and stop this render pass. The
            // stored log itself is left untouched.
            let notice = state
                .dispatcher
                .reporter()
                .report(FailureKind::LogReplay, &err);
            Ok(Json(PageResponse::from(PageView::halted(
                &state.catalog,
                page_state.mode,
                notice,
            ))))
        }
    }
}

/// Serve the chat page
pub async fn chat_page(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    let template = ChatTemplate {
        title: state.catalog.app_title.clone(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    template
        .render()
        .map(Html)
        .map_err(|e| ApiError::Internal(format!("Template rendering failed: {}", e)))
}
