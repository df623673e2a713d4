//! Request/response types for the JSON API

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use refdesk_app::{
    ApplicationError, Bubble, ErrorNotice, ModeCard, PageView, SessionInfo, TurnOutcome, TurnPhase,
};
use refdesk_core::UiCatalog;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Health check response
#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub version: String,
}

/// Session creation response
#[derive(Serialize, ToSchema)]
pub struct CreateSessionResponse {
    #[schema(example = "session-uuid-string")]
    pub session_id: String,
    #[schema(example = "社内文書検索")]
    pub mode_label: String,
}

/// One session in a listing
#[derive(Serialize, ToSchema)]
pub struct SessionSummary {
    pub session_id: String,
    pub mode_label: String,
    pub message_count: usize,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub last_activity: chrono::DateTime<chrono::Utc>,
    pub busy: bool,
}

impl SessionSummary {
    pub fn from_info(info: &SessionInfo, catalog: &UiCatalog) -> Self {
        Self {
            session_id: info.id.clone(),
            mode_label: catalog.label_for_mode(info.mode).to_string(),
            message_count: info.message_count,
            created_at: info.created_at,
            last_activity: info.last_activity,
            busy: info.busy,
        }
    }
}

/// Session listing response
#[derive(Serialize, ToSchema)]
pub struct SessionListResponse {
    pub sessions: Vec<SessionSummary>,
    pub count: usize,
}

/// Mode selector event
#[derive(Deserialize, ToSchema)]
pub struct ModeSelectRequest {
    #[schema(example = "session-uuid-string")]
    pub session_id: String,
    #[schema(example = "社内問い合わせ")]
    pub mode_label: String,
}

/// One sidebar mode card
#[derive(Serialize, ToSchema)]
pub struct ModeCardDto {
    pub label: String,
    pub description: String,
    pub example: String,
    pub selected: bool,
}

impl From<&ModeCard> for ModeCardDto {
    fn from(card: &ModeCard) -> Self {
        Self {
            label: card.label.clone(),
            description: card.description.clone(),
            example: card.example.clone(),
            selected: card.selected,
        }
    }
}

/// Mode selector response
#[derive(Serialize, ToSchema)]
pub struct ModeSelectResponse {
    pub mode_label: String,
    pub cards: Vec<ModeCardDto>,
}

/// Turn submission
#[derive(Deserialize, ToSchema)]
pub struct ChatTurnRequest {
    #[schema(example = "session-uuid-string")]
    pub session_id: String,
    #[schema(example = "社員の育成方針に関するMTGの議事録")]
    pub message: String,
}

/// One chat bubble
#[derive(Serialize, ToSchema)]
pub struct BubbleDto {
    #[schema(example = "user")]
    pub role: String,
    pub content: String,
}

impl From<&Bubble> for BubbleDto {
    fn from(bubble: &Bubble) -> Self {
        Self {
            role: bubble.role.as_str().to_string(),
            content: bubble.content.clone(),
        }
    }
}

/// Sanitized failure notice
#[derive(Serialize, ToSchema)]
pub struct NoticeDto {
    #[schema(example = "generation")]
    pub kind: String,
    pub message: String,
}

impl From<&ErrorNotice> for NoticeDto {
    fn from(notice: &ErrorNotice) -> Self {
        Self {
            kind: notice.kind.as_str().to_string(),
            message: notice.message.clone(),
        }
    }
}

/// Result of one dispatched turn
#[derive(Serialize, ToSchema)]
pub struct ChatTurnResponse {
    pub committed: bool,
    pub user: BubbleDto,
    pub assistant: Option<BubbleDto>,
    pub notice: Option<NoticeDto>,
}

impl From<TurnOutcome> for ChatTurnResponse {
    fn from(outcome: TurnOutcome) -> Self {
        Self {
            committed: outcome.phase == TurnPhase::Committed,
            user: BubbleDto::from(&outcome.user_bubble),
            assistant: outcome.assistant_bubble.as_ref().map(BubbleDto::from),
            notice: outcome.notice.as_ref().map(NoticeDto::from),
        }
    }
}

/// Full page state for one render pass
#[derive(Serialize, ToSchema)]
pub struct PageResponse {
    pub title: String,
    pub welcome_message: String,
    pub guidance_message: String,
    pub sidebar_header: String,
    pub cards: Vec<ModeCardDto>,
    pub bubbles: Vec<BubbleDto>,
    pub busy: bool,
    pub spinner_caption: String,
    pub input_placeholder: String,
    pub input_enabled: bool,
    pub halted: bool,
    pub notice: Option<NoticeDto>,
}

impl From<PageView> for PageResponse {
    fn from(view: PageView) -> Self {
        Self {
            title: view.title,
            welcome_message: view.welcome_message,
            guidance_message: view.guidance_message,
            sidebar_header: view.sidebar_header,
            cards: view.cards.iter().map(ModeCardDto::from).collect(),
            bubbles: view.bubbles.iter().map(BubbleDto::from).collect(),
            busy: view.busy,
            spinner_caption: view.spinner_caption,
            input_placeholder: view.input_placeholder,
            input_enabled: view.input_enabled,
            halted: view.halted,
            notice: view.notice.as_ref().map(NoticeDto::from),
        }
    }
}

/// Error body returned by failing API calls
#[derive(Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

/// API-level failure, mapped onto HTTP status codes
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Busy(String),
    /// A reported render-pass failure; carries only catalog text
    Failure(ErrorNotice),
    Internal(String),
}

impl From<ApplicationError> for ApiError {
    fn from(err: ApplicationError) -> Self {
        match err {
            ApplicationError::Session { message } => ApiError::NotFound(message),
            ApplicationError::Busy { message } => ApiError::Busy(message),
            ApplicationError::Validation { message } => ApiError::BadRequest(message),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound(message) => {
                (StatusCode::NOT_FOUND, Json(ErrorBody { error: message })).into_response()
            }
            ApiError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(ErrorBody { error: message })).into_response()
            }
            ApiError::Busy(message) => {
                (StatusCode::CONFLICT, Json(ErrorBody { error: message })).into_response()
            }
            ApiError::Failure(notice) => (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(NoticeDto::from(&notice)),
            )
                .into_response(),
            ApiError::Internal(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody { error: message }),
            )
                .into_response(),
        }
    }
}
