//! Refdesk Web Server
//!
//! Browser-facing surface of the internal document chat: one chat page, a
//! small JSON API for session / mode / turn events, and the page-state
//! endpoint the browser re-renders from.

pub mod handlers;
#[cfg(feature = "openapi")]
pub mod openapi;
pub mod routes;
pub mod server;
pub mod state;
pub mod templates;

// Re-export main types
pub use server::RefdeskServer;
pub use state::AppState;

use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Create the main application router
pub fn create_app(state: AppState) -> Router {
    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin("http://localhost:3000".parse::<HeaderValue>().unwrap())
        .allow_origin("http://127.0.0.1:3000".parse::<HeaderValue>().unwrap())
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_credentials(true)
        .allow_headers([AUTHORIZATION, ACCEPT, CONTENT_TYPE]);

    Router::new()
        // API routes
        .nest("/api", routes::api_routes())
        // Chat page
        .merge(routes::page_routes())
        // Add middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(DefaultBodyLimit::max(1024 * 1024)) // 1MB max body size
        .with_state(state)
}

/// Configuration for the web server
#[derive(Debug, Clone)]
pub struct WebConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Enable development mode
    pub dev_mode: bool,
    /// Base URL of the generation pipeline service
    pub backend_url: String,
    /// Optional path to a UI catalog TOML file
    pub catalog_path: Option<String>,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            dev_mode: false,
            backend_url: "http://127.0.0.1:8500".to_string(),
            catalog_path: None,
        }
    }
}

impl WebConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("REFDESK_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("REFDESK_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            dev_mode: std::env::var("REFDESK_DEV_MODE")
                .unwrap_or_else(|_| "false".to_string())
                .parse()
                .unwrap_or(false),
            backend_url: std::env::var("REFDESK_BACKEND_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:8500".to_string()),
            catalog_path: std::env::var("REFDESK_CATALOG").ok(),
        }
    }

    /// Get the server address
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Error types for the web server
#[derive(thiserror::Error, Debug)]
pub enum WebError {
    #[error("Server error: {0}")]
    Server(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Application error: {0}")]
    Application(#[from] refdesk_app::ApplicationError),
}

/// Result type for web operations
pub type WebResult<T> = Result<T, WebError>;
