//! Failure reporter
//!
//! Every risky stage of a render pass funnels its error through here: the
//! full detail goes to the structured log, the user gets only the fixed
//! catalog message for that failure class, and the caller stops the rest of
//! the render pass.

use crate::ApplicationError;
use refdesk_core::UiCatalog;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;

/// The four reportable failure classes of a render pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Initialization,
    LogReplay,
    Generation,
    Rendering,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Initialization => "initialization",
            FailureKind::LogReplay => "log_replay",
            FailureKind::Generation => "generation",
            FailureKind::Rendering => "rendering",
        }
    }
}

/// Sanitized, user-facing failure message. Carries only catalog text, never
/// raw error detail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorNotice {
    pub kind: FailureKind,
    pub message: String,
}

/// Maps failures onto the fixed message catalog.
#[derive(Clone)]
pub struct FailureReporter {
    catalog: Arc<UiCatalog>,
}

impl FailureReporter {
    pub fn new(catalog: Arc<UiCatalog>) -> Self {
        Self { catalog }
    }

    /// Log the error with full detail and produce the sanitized notice that
    /// ends the current render pass. At most one notice reaches the user
    /// per pass because the caller returns on the first one.
    pub fn report(&self, kind: FailureKind, err: &ApplicationError) -> ErrorNotice {
        let prefix = self.prefix_for(kind);

        error!(
            kind = kind.as_str(),
            error = %err,
            "{}", prefix
        );

        ErrorNotice {
            kind,
            message: format!("{}\n{}", prefix, self.catalog.common_error_suffix),
        }
    }

    fn prefix_for(&self, kind: FailureKind) -> &str {
        match kind {
            FailureKind::Initialization => &self.catalog.initialize_error_message,
            FailureKind::LogReplay => &self.catalog.conversation_log_error_message,
            FailureKind::Generation => &self.catalog.generation_error_message,
            FailureKind::Rendering => &self.catalog.display_answer_error_message,
        }
    }
}
