//! Pure page rendering
//!
//! `render_page` is a pure function from session state to a view; it holds
//! no state of its own, so replaying the same log twice yields the same
//! ordered output. The two response renderers turn the backend's opaque
//! payload into the canonical display text that gets stored in the log.

use crate::report::ErrorNotice;
use crate::{ApplicationError, ApplicationResult};
use refdesk_core::{
    ErrorContext, GenerationResponse, Mode, RefdeskError, Role, SourceDocument, TurnMessage,
    UiCatalog,
};
use serde::Serialize;

/// One chat bubble
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bubble {
    pub role: Role,
    pub content: String,
}

/// One sidebar mode card. Exactly one card is `selected` at any time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModeCard {
    pub label: String,
    pub description: String,
    pub example: String,
    pub selected: bool,
}

/// Input to a page render: the session state it is a pure function of.
#[derive(Debug, Clone)]
pub struct PageState {
    pub mode: Mode,
    pub messages: Vec<TurnMessage>,
    pub busy: bool,
    pub notice: Option<ErrorNotice>,
}

/// Complete view of the chat page for one render pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageView {
    pub title: String,
    pub welcome_message: String,
    pub guidance_message: String,
    pub sidebar_header: String,
    pub cards: Vec<ModeCard>,
    pub bubbles: Vec<Bubble>,
    pub busy: bool,
    pub spinner_caption: String,
    pub input_placeholder: String,
    pub input_enabled: bool,
    /// True when a failure stopped this render pass early
    pub halted: bool,
    pub notice: Option<ErrorNotice>,
}

impl PageView {
    /// Chrome-only view produced when a failure halts the render pass: the
    /// notice is shown, the log and input are withheld for this cycle.
    pub fn halted(catalog: &UiCatalog, mode: Mode, notice: ErrorNotice) -> Self {
        Self {
            title: catalog.app_title.clone(),
            welcome_message: catalog.welcome_message.clone(),
            guidance_message: catalog.guidance_message.clone(),
            sidebar_header: catalog.sidebar_header.clone(),
            cards: sidebar_cards(catalog, mode),
            bubbles: Vec::new(),
            busy: false,
            spinner_caption: catalog.spinner_caption.clone(),
            input_placeholder: catalog.input_placeholder.clone(),
            input_enabled: false,
            halted: true,
            notice: Some(notice),
        }
    }
}

/// Build the two sidebar cards. The card matching the current mode is the
/// selected one; the other stays informational.
pub fn sidebar_cards(catalog: &UiCatalog, mode: Mode) -> Vec<ModeCard> {
    [Mode::DocumentSearch, Mode::Inquiry]
        .into_iter()
        .map(|card_mode| ModeCard {
            label: catalog.label_for_mode(card_mode).to_string(),
            description: catalog.description_for_mode(card_mode).to_string(),
            example: catalog.example_for_mode(card_mode).to_string(),
            selected: card_mode == mode,
        })
        .collect()
}

/// Replay the stored conversation log strictly in order. Safe on an empty
/// log; a corrupt stored entry aborts the replay.
pub fn replay_conversation(messages: &[TurnMessage]) -> ApplicationResult<Vec<Bubble>> {
    let mut bubbles = Vec::with_capacity(messages.len());
    for (index, message) in messages.iter().enumerate() {
        if message.content.trim().is_empty() {
            return Err(ApplicationError::Core(RefdeskError::LogReplay {
                message: format!("Stored message {} has no content", index),
                source: None,
                context: ErrorContext::new("render").with_operation("replay_conversation"),
            }));
        }
        bubbles.push(Bubble {
            role: message.role,
            content: message.content.clone(),
        });
    }
    Ok(bubbles)
}

/// Render the full page from session state. Pure: no session mutation, same
/// state in, same view out.
pub fn render_page(catalog: &UiCatalog, state: &PageState) -> ApplicationResult<PageView> {
    let bubbles = replay_conversation(&state.messages)?;

    Ok(PageView {
        title: catalog.app_title.clone(),
        welcome_message: catalog.welcome_message.clone(),
        guidance_message: catalog.guidance_message.clone(),
        sidebar_header: catalog.sidebar_header.clone(),
        cards: sidebar_cards(catalog, state.mode),
        bubbles,
        busy: state.busy,
        spinner_caption: catalog.spinner_caption.clone(),
        input_placeholder: catalog.input_placeholder.clone(),
        input_enabled: !state.busy,
        halted: false,
        notice: state.notice.clone(),
    })
}

fn format_source(source: &SourceDocument) -> String {
    match source.page {
        Some(page) => format!("{}（ページNo.{}）", source.path, page),
        None => source.path.clone(),
    }
}

fn rendering_error(message: String) -> ApplicationError {
    ApplicationError::Core(RefdeskError::Rendering {
        message,
        source: None,
        context: ErrorContext::new("render").with_operation("render_response"),
    })
}

/// Render a document-location-search result: the most relevant document's
/// location first, remaining hits as a related list.
pub fn render_search_response(
    catalog: &UiCatalog,
    response: &GenerationResponse,
) -> ApplicationResult<String> {
    match response.sources.split_first() {
        None => Ok(catalog.no_document_found_message.clone()),
        Some((main, rest)) => {
            if main.path.trim().is_empty() {
                return Err(rendering_error(
                    "Search result has a source without a location".to_string(),
                ));
            }

            let mut content = String::new();
            content.push_str(&catalog.search_result_heading);
            content.push('\n');
            content.push_str(&format_source(main));

            if !rest.is_empty() {
                content.push('\n');
                content.push('\n');
                content.push_str(&catalog.related_documents_heading);
                for source in rest {
                    content.push('\n');
                    content.push_str("- ");
                    content.push_str(&format_source(source));
                }
            }

            Ok(content)
        }
    }
}

/// Render an internal-inquiry result: the synthesized answer followed by the
/// documents it cites.
pub fn render_inquiry_response(
    catalog: &UiCatalog,
    response: &GenerationResponse,
) -> ApplicationResult<String> {
    if response.answer.trim().is_empty() {
        return Err(rendering_error(
            "Inquiry response has no answer text".to_string(),
        ));
    }

    let mut content = response.answer.clone();

    if !response.sources.is_empty() {
        content.push('\n');
        content.push('\n');
        content.push_str(&catalog.source_heading);
        for source in &response.sources {
            content.push('\n');
            content.push_str("- ");
            content.push_str(&format_source(source));
        }
    }

    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::FailureKind;

    fn catalog() -> UiCatalog {
        UiCatalog::default()
    }

    #[test]
    fn exactly_one_card_selected_per_mode() {
        let catalog = catalog();
        for mode in [Mode::DocumentSearch, Mode::Inquiry] {
            let cards = sidebar_cards(&catalog, mode);
            assert_eq!(cards.len(), 2);
            assert_eq!(cards.iter().filter(|c| c.selected).count(), 1);
            let selected = cards.iter().find(|c| c.selected).unwrap();
            assert_eq!(selected.label, catalog.label_for_mode(mode));
        }
    }

    #[test]
    fn replay_preserves_order_and_is_safe_on_empty() {
        assert!(replay_conversation(&[]).unwrap().is_empty());

        let messages = vec![
            TurnMessage::user("一つ目".to_string()),
            TurnMessage::assistant("回答一".to_string()),
            TurnMessage::user("二つ目".to_string()),
            TurnMessage::assistant("回答二".to_string()),
        ];
        let bubbles = replay_conversation(&messages).unwrap();
        assert_eq!(
            bubbles.iter().map(|b| b.content.as_str()).collect::<Vec<_>>(),
            ["一つ目", "回答一", "二つ目", "回答二"]
        );
    }

    #[test]
    fn replay_rejects_corrupt_entry() {
        let messages = vec![TurnMessage::user("  ".to_string())];
        let err = replay_conversation(&messages).unwrap_err();
        assert!(matches!(
            err,
            ApplicationError::Core(RefdeskError::LogReplay { .. })
        ));
    }

    #[test]
    fn render_page_is_deterministic() {
        let catalog = catalog();
        let state = PageState {
            mode: Mode::Inquiry,
            messages: vec![
                TurnMessage::user("質問".to_string()),
                TurnMessage::assistant("回答".to_string()),
            ],
            busy: false,
            notice: None,
        };

        let first = render_page(&catalog, &state).unwrap();
        let second = render_page(&catalog, &state).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn busy_page_disables_input() {
        let catalog = catalog();
        let state = PageState {
            mode: Mode::DocumentSearch,
            messages: vec![],
            busy: true,
            notice: None,
        };
        let view = render_page(&catalog, &state).unwrap();
        assert!(view.busy);
        assert!(!view.input_enabled);
    }

    #[test]
    fn halted_page_shows_notice_and_nothing_else() {
        let catalog = catalog();
        let notice = ErrorNotice {
            kind: FailureKind::LogReplay,
            message: catalog.conversation_log_error_message.clone(),
        };
        let view = PageView::halted(&catalog, Mode::DocumentSearch, notice);
        assert!(view.halted);
        assert!(view.bubbles.is_empty());
        assert!(!view.input_enabled);
        assert!(view.notice.is_some());
    }

    #[test]
    fn search_renderer_lists_locations() {
        let catalog = catalog();
        let response = GenerationResponse {
            answer: String::new(),
            sources: vec![
                SourceDocument::new("社内文書/人事/育成方針MTG議事録.pdf").with_page(3),
                SourceDocument::new("社内文書/人事/研修計画.docx"),
            ],
        };

        let content = render_search_response(&catalog, &response).unwrap();
        assert!(content.starts_with(&catalog.search_result_heading));
        assert!(content.contains("育成方針MTG議事録.pdf（ページNo.3）"));
        assert!(content.contains(&catalog.related_documents_heading));
        assert!(content.contains("- 社内文書/人事/研修計画.docx"));
    }

    #[test]
    fn search_renderer_reports_no_hits() {
        let catalog = catalog();
        let response = GenerationResponse {
            answer: String::new(),
            sources: vec![],
        };
        let content = render_search_response(&catalog, &response).unwrap();
        assert_eq!(content, catalog.no_document_found_message);
    }

    #[test]
    fn inquiry_renderer_appends_citations() {
        let catalog = catalog();
        let response = GenerationResponse {
            answer: "人事部には5名が所属しています。".to_string(),
            sources: vec![SourceDocument::new("社内文書/人事/名簿.xlsx").with_page(1)],
        };

        let content = render_inquiry_response(&catalog, &response).unwrap();
        assert!(content.starts_with("人事部には5名が所属しています。"));
        assert!(content.contains(&catalog.source_heading));
        assert!(content.contains("名簿.xlsx（ページNo.1）"));
    }

    #[test]
    fn inquiry_renderer_rejects_empty_answer() {
        let catalog = catalog();
        let response = GenerationResponse {
            answer: "  ".to_string(),
            sources: vec![],
        };
        let err = render_inquiry_response(&catalog, &response).unwrap_err();
        assert!(matches!(
            err,
            ApplicationError::Core(RefdeskError::Rendering { .. })
        ));
    }
}
