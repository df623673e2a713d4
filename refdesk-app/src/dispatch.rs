//! Turn dispatcher - the conversation-turn protocol
//!
//! One call to [`TurnDispatcher::handle`] is one turn: echo the input, run
//! the generation call, render the typed response, and append both sides to
//! the log. The append is all-or-nothing: a failure at any stage after the
//! echo leaves the stored log exactly as it was.

use crate::backend::GenerativeBackend;
use crate::render::{self, Bubble};
use crate::report::{ErrorNotice, FailureKind, FailureReporter};
use crate::session::{SessionStore, TurnPhase};
use crate::{ApplicationError, ApplicationResult};
use refdesk_core::{Mode, Role, TurnMessage, UiCatalog};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, trace};

/// Result of one dispatched turn. The user's echo is always present; the
/// assistant bubble only on commit, the notice only on failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurnOutcome {
    pub phase: TurnPhase,
    pub user_bubble: Bubble,
    pub assistant_bubble: Option<Bubble>,
    pub notice: Option<ErrorNotice>,
}

/// Tracks the phase of the turn currently being dispatched.
struct TurnState {
    session_id: String,
    phase: TurnPhase,
}

impl TurnState {
    fn new(session_id: &str) -> Self {
        Self {
            session_id: session_id.to_string(),
            phase: TurnPhase::Idle,
        }
    }

    fn advance(&mut self, next: TurnPhase) {
        debug_assert!(
            self.phase.can_advance_to(next),
            "illegal turn transition {:?} -> {:?}",
            self.phase,
            next
        );
        trace!(
            session_id = %self.session_id,
            from = ?self.phase,
            to = ?next,
            "Turn transition"
        );
        self.phase = next;
    }
}

/// Dispatches conversation turns against the generation backend.
#[derive(Clone)]
pub struct TurnDispatcher {
    store: SessionStore,
    backend: Arc<dyn GenerativeBackend>,
    catalog: Arc<UiCatalog>,
    reporter: FailureReporter,
}

impl TurnDispatcher {
    pub fn new(
        store: SessionStore,
        backend: Arc<dyn GenerativeBackend>,
        catalog: Arc<UiCatalog>,
    ) -> Self {
        let reporter = FailureReporter::new(catalog.clone());
        Self {
            store,
            backend,
            catalog,
            reporter,
        }
    }

    pub fn reporter(&self) -> &FailureReporter {
        &self.reporter
    }

    /// Run one conversation turn.
    ///
    /// Errors are split in two: conditions that reject the submission before
    /// the turn starts (unknown session, empty input, single-flight busy)
    /// come back as `Err`; failures inside the turn come back as an
    /// `Ok(TurnOutcome)` in phase `Failed`, carrying the sanitized notice
    /// and leaving the stored log untouched.
    pub async fn handle(&self, session_id: &str, input: &str) -> ApplicationResult<TurnOutcome> {
        let input = input.trim();
        if input.is_empty() {
            return Err(ApplicationError::validation("Chat input must not be empty"));
        }

        // The mode is bound here, once per turn. A selector event arriving
        // mid-turn changes the session but not this turn's renderer.
        let mode = self.store.begin_turn(session_id).await?;
        let mut turn = TurnState::new(session_id);

        turn.advance(TurnPhase::Echoing);
        info!(
            message = %input,
            application_mode = %self.catalog.label_for_mode(mode),
            "User message"
        );
        let user_bubble = Bubble {
            role: Role::User,
            content: input.to_string(),
        };

        turn.advance(TurnPhase::AwaitingResponse);
        let context = match self.store.conversation_context(session_id).await {
            Ok(context) => context,
            Err(err) => {
                self.store.finish_turn(session_id, None).await.ok();
                return Err(err);
            }
        };

        let response = match self.backend.generate(input, context.as_deref()).await {
            Ok(response) => response,
            Err(err) => {
                return self
                    .fail_turn(turn, user_bubble, FailureKind::Generation, err, session_id)
                    .await;
            }
        };

        turn.advance(TurnPhase::Rendering);
        let rendered = match mode {
            Mode::DocumentSearch => render::render_search_response(&self.catalog, &response),
            Mode::Inquiry => render::render_inquiry_response(&self.catalog, &response),
        };
        let content = match rendered {
            Ok(content) => content,
            Err(err) => {
                return self
                    .fail_turn(turn, user_bubble, FailureKind::Rendering, err, session_id)
                    .await;
            }
        };

        info!(
            message = %content,
            application_mode = %self.catalog.label_for_mode(mode),
            "Assistant message"
        );
        let assistant_bubble = Bubble {
            role: Role::Assistant,
            content: content.clone(),
        };

        // Append only now, after both render steps succeeded.
        self.store
            .finish_turn(
                session_id,
                Some((
                    TurnMessage::user(input.to_string()),
                    TurnMessage::assistant(content),
                )),
            )
            .await?;
        turn.advance(TurnPhase::Committed);

        Ok(TurnOutcome {
            phase: TurnPhase::Committed,
            user_bubble,
            assistant_bubble: Some(assistant_bubble),
            notice: None,
        })
    }

    async fn fail_turn(
        &self,
        mut turn: TurnState,
        user_bubble: Bubble,
        kind: FailureKind,
        err: ApplicationError,
        session_id: &str,
    ) -> ApplicationResult<TurnOutcome> {
        let notice = self.reporter.report(kind, &err);
        turn.advance(TurnPhase::Failed);
        self.store.finish_turn(session_id, None).await?;

        Ok(TurnOutcome {
            phase: TurnPhase::Failed,
            user_bubble,
            assistant_bubble: None,
            notice: Some(notice),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionConfig;
    use async_trait::async_trait;
    use refdesk_core::GenerationResponse;

    struct UnreachableBackend;

    #[async_trait]
    impl GenerativeBackend for UnreachableBackend {
        async fn initialize(&self) -> ApplicationResult<()> {
            Ok(())
        }

        async fn generate(
            &self,
            _question: &str,
            _context: Option<&str>,
        ) -> ApplicationResult<GenerationResponse> {
            panic!("generate must not be called");
        }
    }

    fn dispatcher() -> (TurnDispatcher, SessionStore) {
        let catalog = Arc::new(UiCatalog::default());
        let store = SessionStore::new(SessionConfig::default(), catalog.clone());
        let dispatcher = TurnDispatcher::new(store.clone(), Arc::new(UnreachableBackend), catalog);
        (dispatcher, store)
    }

    #[tokio::test]
    async fn empty_input_is_rejected_before_dispatch() {
        let (dispatcher, store) = dispatcher();
        let id = store.create_session().await;

        let err = dispatcher.handle(&id, "   ").await.unwrap_err();
        assert!(matches!(err, ApplicationError::Validation { .. }));

        // The rejection never claimed the session
        assert!(!store.get_info(&id).await.unwrap().busy);
    }

    #[tokio::test]
    async fn unknown_session_is_rejected_before_dispatch() {
        let (dispatcher, _store) = dispatcher();
        let err = dispatcher.handle("missing", "質問").await.unwrap_err();
        assert!(matches!(err, ApplicationError::Session { .. }));
    }
}
