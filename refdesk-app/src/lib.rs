//! Refdesk Application Layer - turn lifecycle and session management
//!
//! This crate implements the conversation-turn lifecycle of the internal
//! document chat:
//!
//! - Session store with per-connection state (mode, message log)
//! - Mode selector binding the sidebar control to the session
//! - Turn dispatcher running capture → generation → render → append
//! - Failure reporter mapping errors onto the fixed message catalog
//! - Pure page rendering from session state
//!
//! ## Architecture
//!
//! `render_page(state)` is a pure function of session state; the dispatcher
//! and the store are the only mutators. Retrieval and generation stay behind
//! the [`backend::GenerativeBackend`] trait.

pub mod backend;
pub mod dispatch;
pub mod render;
pub mod report;
pub mod session;

pub use backend::{GenerativeBackend, HttpBackend, HttpBackendConfig};
pub use dispatch::{TurnDispatcher, TurnOutcome};
pub use render::{Bubble, ModeCard, PageState, PageView};
pub use report::{ErrorNotice, FailureKind, FailureReporter};
pub use session::{Session, SessionConfig, SessionInfo, SessionStore, TurnPhase};

/// Application-level error type
#[derive(Debug, thiserror::Error)]
pub enum ApplicationError {
    #[error("Core error: {0}")]
    Core(#[from] refdesk_core::RefdeskError),

    #[error("Session error: {message}")]
    Session { message: String },

    #[error("Session busy: {message}")]
    Busy { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Internal error: {message}")]
    Internal {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type ApplicationResult<T> = Result<T, ApplicationError>;

impl ApplicationError {
    /// Create a session error
    pub fn session<S: Into<String>>(message: S) -> Self {
        Self::Session {
            message: message.into(),
        }
    }

    /// Create a busy error (single-flight rejection)
    pub fn busy<S: Into<String>>(message: S) -> Self {
        Self::Busy {
            message: message.into(),
        }
    }

    /// Create a validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
            source: None,
        }
    }
}

/// Prelude module for convenient imports
pub mod prelude {
    pub use super::{
        ApplicationError, ApplicationResult, ErrorNotice, FailureKind, FailureReporter,
        GenerativeBackend, PageState, PageView, SessionConfig, SessionStore, TurnDispatcher,
        TurnOutcome, TurnPhase,
    };
}
