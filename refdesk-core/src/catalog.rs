//! User-facing string catalog
//!
//! Every string the browser page shows (mode labels, card descriptions,
//! error prefixes, the boot log line, the spinner caption) lives in one
//! struct that is loaded (or defaulted) and validated at startup, instead of
//! being looked up ad hoc from scattered constants.

use crate::error::{ErrorContext, RefdeskError, RefdeskResult};
use crate::types::Mode;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// The complete catalog of user-visible strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiCatalog {
    /// Browser tab / page heading
    pub app_title: String,
    /// Green welcome notice shown above the conversation
    pub welcome_message: String,
    /// Yellow guidance notice shown below the welcome
    pub guidance_message: String,
    /// Sidebar section heading
    pub sidebar_header: String,

    /// Label of the document-location-search mode
    pub mode_label_search: String,
    /// Label of the internal-inquiry mode
    pub mode_label_inquiry: String,
    /// Sidebar card description for the search mode
    pub mode_description_search: String,
    /// Sidebar card description for the inquiry mode
    pub mode_description_inquiry: String,
    /// Input example shown under the search card
    pub mode_example_search: String,
    /// Input example shown under the inquiry card
    pub mode_example_inquiry: String,

    /// Fixed prefix for initialization failures
    pub initialize_error_message: String,
    /// Fixed prefix for conversation-log replay failures
    pub conversation_log_error_message: String,
    /// Fixed prefix for generation-call failures
    pub generation_error_message: String,
    /// Fixed prefix for response-rendering failures
    pub display_answer_error_message: String,
    /// Common suffix appended to every user-facing error message
    pub common_error_suffix: String,

    /// Log line emitted once when a session boots
    pub boot_log_message: String,
    /// Caption shown while a generation call is outstanding
    pub spinner_caption: String,
    /// Placeholder of the chat input box
    pub input_placeholder: String,

    /// Heading of a search-mode result
    pub search_result_heading: String,
    /// Heading of the related-documents list in a search-mode result
    pub related_documents_heading: String,
    /// Shown when no matching document location was found
    pub no_document_found_message: String,
    /// Heading of the citation list in an inquiry-mode result
    pub source_heading: String,
}

impl Default for UiCatalog {
    fn default() -> Self {
        Self {
            app_title: "社内情報特化型生成AI検索アプリ".to_string(),
            welcome_message: "こんにちは。私は社内文書の情報をもとに回答する生成AIチャットボットです。\
                サイドバーで利用目的を選択し、画面下部のチャット欄からメッセージを送信してください。"
                .to_string(),
            guidance_message: "具体的に入力したほうが期待通りの回答を得やすいです。".to_string(),
            sidebar_header: "利用目的".to_string(),

            mode_label_search: "社内文書検索".to_string(),
            mode_label_inquiry: "社内問い合わせ".to_string(),
            mode_description_search: "入力内容と関連性が高い社内文書のありかを検索できます。"
                .to_string(),
            mode_description_inquiry: "質問・要望に対して、社内文書の情報をもとに回答を得られます。"
                .to_string(),
            mode_example_search: "社員の育成方針に関するMTGの議事録".to_string(),
            mode_example_inquiry: "人事部に所属している従業員情報を一覧化して".to_string(),

            initialize_error_message: "初期化処理に失敗しました。".to_string(),
            conversation_log_error_message: "会話ログの表示に失敗しました。".to_string(),
            generation_error_message: "回答生成に失敗しました。".to_string(),
            display_answer_error_message: "回答表示に失敗しました。".to_string(),
            common_error_suffix: "同じエラーが繰り返し発生する場合は、管理者にお問い合わせください。"
                .to_string(),

            boot_log_message: "アプリが起動されました。".to_string(),
            spinner_caption: "回答生成中...".to_string(),
            input_placeholder: "こちらからメッセージを送信してください。".to_string(),

            search_result_heading: "入力内容に関連する社内文書のありかは以下の通りです。".to_string(),
            related_documents_heading: "その他、関連性が高い社内文書のありか".to_string(),
            no_document_found_message: "入力内容と関連性が高い社内文書が見つかりませんでした。"
                .to_string(),
            source_heading: "情報源".to_string(),
        }
    }
}

impl UiCatalog {
    /// Load a catalog from a TOML file. Missing keys fall back to defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> RefdeskResult<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| RefdeskError::Config {
            message: format!("Failed to read catalog file: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("catalog")
                .with_operation("read_file")
                .with_suggestion("Check if the catalog file exists and is readable"),
        })?;

        let catalog: UiCatalog = toml::from_str(&content).map_err(|e| RefdeskError::Config {
            message: format!("Failed to parse catalog: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("catalog")
                .with_operation("parse_toml")
                .with_suggestion("Check TOML syntax in the catalog file"),
        })?;

        catalog.validate()?;
        Ok(catalog)
    }

    /// Validate the catalog at startup. Every recognized key must be
    /// non-empty and the two mode labels must be distinct.
    pub fn validate(&self) -> RefdeskResult<()> {
        let entries = [
            ("app_title", &self.app_title),
            ("welcome_message", &self.welcome_message),
            ("guidance_message", &self.guidance_message),
            ("sidebar_header", &self.sidebar_header),
            ("mode_label_search", &self.mode_label_search),
            ("mode_label_inquiry", &self.mode_label_inquiry),
            ("mode_description_search", &self.mode_description_search),
            ("mode_description_inquiry", &self.mode_description_inquiry),
            ("mode_example_search", &self.mode_example_search),
            ("mode_example_inquiry", &self.mode_example_inquiry),
            ("initialize_error_message", &self.initialize_error_message),
            (
                "conversation_log_error_message",
                &self.conversation_log_error_message,
            ),
            ("generation_error_message", &self.generation_error_message),
            (
                "display_answer_error_message",
                &self.display_answer_error_message,
            ),
            ("common_error_suffix", &self.common_error_suffix),
            ("boot_log_message", &self.boot_log_message),
            ("spinner_caption", &self.spinner_caption),
            ("input_placeholder", &self.input_placeholder),
            ("search_result_heading", &self.search_result_heading),
            (
                "related_documents_heading",
                &self.related_documents_heading,
            ),
            ("no_document_found_message", &self.no_document_found_message),
            ("source_heading", &self.source_heading),
        ];

        for (key, value) in entries {
            if value.trim().is_empty() {
                return Err(crate::validation_error!(
                    format!("Catalog entry must not be empty: {}", key),
                    key,
                    "catalog"
                ));
            }
        }

        if self.mode_label_search == self.mode_label_inquiry {
            return Err(crate::validation_error!(
                "Mode labels must be distinct",
                "mode_label_inquiry",
                "catalog"
            ));
        }

        Ok(())
    }

    /// Map a sidebar label to its mode constant.
    pub fn mode_for_label(&self, label: &str) -> Option<Mode> {
        if label == self.mode_label_search {
            Some(Mode::DocumentSearch)
        } else if label == self.mode_label_inquiry {
            Some(Mode::Inquiry)
        } else {
            None
        }
    }

    /// Map a mode constant to its sidebar label.
    pub fn label_for_mode(&self, mode: Mode) -> &str {
        match mode {
            Mode::DocumentSearch => &self.mode_label_search,
            Mode::Inquiry => &self.mode_label_inquiry,
        }
    }

    /// Sidebar card description for a mode.
    pub fn description_for_mode(&self, mode: Mode) -> &str {
        match mode {
            Mode::DocumentSearch => &self.mode_description_search,
            Mode::Inquiry => &self.mode_description_inquiry,
        }
    }

    /// Input example for a mode.
    pub fn example_for_mode(&self, mode: Mode) -> &str {
        match mode {
            Mode::DocumentSearch => &self.mode_example_search,
            Mode::Inquiry => &self.mode_example_inquiry,
        }
    }
}
