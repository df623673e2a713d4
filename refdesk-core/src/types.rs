//! Core data type definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Answer-interpretation mode, selected in the sidebar and consumed at
/// dispatch time. Exactly one value is active per session at any moment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Find where relevant internal documents live
    #[default]
    DocumentSearch,
    /// Get a synthesized answer plus citations
    Inquiry,
}

/// Message author role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One side of a conversation turn. Created only by the turn dispatcher, in
/// strict user-then-assistant pairs; never mutated after append.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnMessage {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl TurnMessage {
    pub fn user(content: String) -> Self {
        Self {
            role: Role::User,
            content,
            timestamp: Utc::now(),
        }
    }

    pub fn assistant(content: String) -> Self {
        Self {
            role: Role::Assistant,
            content,
            timestamp: Utc::now(),
        }
    }
}

/// A document reference returned by the generation backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceDocument {
    /// Storage location of the document (path or URL)
    pub path: String,
    /// Page number within the document, when applicable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
}

impl SourceDocument {
    pub fn new<S: Into<String>>(path: S) -> Self {
        Self {
            path: path.into(),
            page: None,
        }
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }
}

/// Opaque payload produced by the generation backend. Consumed only by the
/// two mode renderers; this layer never interprets it beyond that.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResponse {
    /// Synthesized answer text (may be empty for pure location results)
    pub answer: String,
    /// Documents the answer was grounded on, most relevant first
    #[serde(default)]
    pub sources: Vec<SourceDocument>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_mode_is_document_search() {
        assert_eq!(Mode::default(), Mode::DocumentSearch);
    }

    #[test]
    fn turn_message_constructors_set_roles() {
        let user = TurnMessage::user("質問".to_string());
        let assistant = TurnMessage::assistant("回答".to_string());
        assert_eq!(user.role, Role::User);
        assert_eq!(assistant.role, Role::Assistant);
    }

    #[test]
    fn generation_response_deserializes_without_sources() {
        let response: GenerationResponse =
            serde_json::from_str(r#"{"answer": "回答テキスト"}"#).unwrap();
        assert!(response.sources.is_empty());
    }
}
