//! OpenAPI specification for the Refdesk web server

use axum::response::Json;
use utoipa::OpenApi;

use crate::handlers::{
    BubbleDto, ChatTurnRequest, ChatTurnResponse, CreateSessionResponse, HealthResponse,
    ModeCardDto, ModeSelectRequest, ModeSelectResponse, NoticeDto, PageResponse,
    SessionListResponse, SessionSummary,
};

/// Main OpenAPI specification for the Refdesk web server
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Refdesk Web API",
        version = "0.1.0",
        description = "Internal document chat: session, mode, and turn endpoints"
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server")
    ),
    paths(
        crate::handlers::health_check,
        crate::handlers::create_session,
        crate::handlers::list_sessions,
        crate::handlers::remove_session,
        crate::handlers::select_mode,
        crate::handlers::chat_turn,
        crate::handlers::get_page,
    ),
    components(schemas(
        HealthResponse,
        CreateSessionResponse,
        SessionSummary,
        SessionListResponse,
        ModeSelectRequest,
        ModeCardDto,
        ModeSelectResponse,
        ChatTurnRequest,
        BubbleDto,
        NoticeDto,
        ChatTurnResponse,
        PageResponse,
    )),
    tags(
        (name = "Health", description = "Server health"),
        (name = "Sessions", description = "Session lifecycle and mode selection"),
        (name = "Chat", description = "Conversation turns"),
        (name = "Page", description = "Page-state rendering")
    )
)]
pub struct ApiDoc;

/// Serve the OpenAPI document
pub async fn openapi_spec() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
