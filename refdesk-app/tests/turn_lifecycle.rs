//! Turn lifecycle scenarios against a scripted generation backend

use async_trait::async_trait;
use refdesk_app::render::{render_page, PageState};
use refdesk_app::{
    ApplicationError, ApplicationResult, FailureKind, GenerativeBackend, SessionConfig,
    SessionStore, TurnDispatcher, TurnPhase,
};
use refdesk_core::{
    ErrorContext, GenerationResponse, Mode, RefdeskError, Role, SourceDocument, UiCatalog,
};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::{Mutex, Notify};

/// One scripted reaction of the mock backend.
enum Step {
    Respond(GenerationResponse),
    Fail,
    /// Wait for the notify before responding (for in-flight assertions)
    BlockThenRespond(Arc<Notify>, GenerationResponse),
}

struct ScriptedBackend {
    steps: Mutex<VecDeque<Step>>,
}

impl ScriptedBackend {
    fn new(steps: Vec<Step>) -> Arc<Self> {
        Arc::new(Self {
            steps: Mutex::new(steps.into()),
        })
    }
}

#[async_trait]
impl GenerativeBackend for ScriptedBackend {
    async fn initialize(&self) -> ApplicationResult<()> {
        Ok(())
    }

    async fn generate(
        &self,
        _question: &str,
        _context: Option<&str>,
    ) -> ApplicationResult<GenerationResponse> {
        let step = self
            .steps
            .lock()
            .await
            .pop_front()
            .expect("backend called more often than scripted");

        match step {
            Step::Respond(response) => Ok(response),
            Step::Fail => Err(ApplicationError::Core(RefdeskError::Generation {
                message: "backend query failed".to_string(),
                source: None,
                context: ErrorContext::new("test_backend"),
            })),
            Step::BlockThenRespond(notify, response) => {
                notify.notified().await;
                Ok(response)
            }
        }
    }
}

fn harness(steps: Vec<Step>) -> (TurnDispatcher, SessionStore, Arc<UiCatalog>) {
    let catalog = Arc::new(UiCatalog::default());
    let store = SessionStore::new(SessionConfig::default(), catalog.clone());
    let dispatcher = TurnDispatcher::new(store.clone(), ScriptedBackend::new(steps), catalog.clone());
    (dispatcher, store, catalog)
}

fn search_hit() -> GenerationResponse {
    GenerationResponse {
        answer: String::new(),
        sources: vec![
            SourceDocument::new("社内文書/人事/育成方針MTG議事録.pdf").with_page(2),
            SourceDocument::new("社内文書/人事/研修体系.pptx"),
        ],
    }
}

fn inquiry_answer() -> GenerationResponse {
    GenerationResponse {
        answer: "人事部に所属している従業員は以下の通りです。".to_string(),
        sources: vec![SourceDocument::new("社内文書/人事/従業員名簿.xlsx").with_page(1)],
    }
}

#[tokio::test]
async fn scenario_a_document_search_happy_path() {
    let (dispatcher, store, catalog) = harness(vec![Step::Respond(search_hit())]);
    let id = store.create_session().await;

    // Fresh session starts in document-search mode
    store
        .select_mode(&id, catalog.mode_for_label("社内文書検索").unwrap())
        .await
        .unwrap();

    let outcome = dispatcher
        .handle(&id, "社員の育成方針に関するMTGの議事録")
        .await
        .unwrap();

    assert_eq!(outcome.phase, TurnPhase::Committed);
    assert_eq!(outcome.user_bubble.role, Role::User);
    assert_eq!(outcome.user_bubble.content, "社員の育成方針に関するMTGの議事録");

    let assistant = outcome.assistant_bubble.unwrap();
    assert_eq!(assistant.role, Role::Assistant);
    assert!(assistant.content.starts_with(&catalog.search_result_heading));
    assert!(assistant.content.contains("育成方針MTG議事録.pdf（ページNo.2）"));

    let snapshot = store.snapshot(&id).await.unwrap();
    assert_eq!(snapshot.messages.len(), 2);
    assert_eq!(snapshot.messages[0].role, Role::User);
    assert_eq!(snapshot.messages[0].content, "社員の育成方針に関するMTGの議事録");
    assert_eq!(snapshot.messages[1].role, Role::Assistant);
    assert_eq!(snapshot.messages[1].content, assistant.content);
}

#[tokio::test]
async fn scenario_b_generation_failure_leaves_log_unchanged() {
    let (dispatcher, store, _catalog) = harness(vec![
        Step::Respond(inquiry_answer()),
        Step::Fail,
    ]);
    let id = store.create_session().await;
    store.select_mode(&id, Mode::Inquiry).await.unwrap();

    // Seed one committed turn so "unchanged" is observable
    dispatcher.handle(&id, "経費精算の締め日は？").await.unwrap();
    let before = store.snapshot(&id).await.unwrap();
    assert_eq!(before.messages.len(), 2);

    let outcome = dispatcher.handle(&id, "締め日を過ぎた場合は？").await.unwrap();

    assert_eq!(outcome.phase, TurnPhase::Failed);
    // The echo survives the failing pass...
    assert_eq!(outcome.user_bubble.content, "締め日を過ぎた場合は？");
    // ...but no assistant bubble appears and exactly one generation error is reported
    assert!(outcome.assistant_bubble.is_none());
    let notice = outcome.notice.unwrap();
    assert_eq!(notice.kind, FailureKind::Generation);

    // Replaying after the failure shows the log without the failed attempt
    let after = store.snapshot(&id).await.unwrap();
    assert_eq!(after.messages, before.messages);
}

#[tokio::test]
async fn scenario_c_mode_is_bound_per_turn_at_dispatch_time() {
    let (dispatcher, store, catalog) = harness(vec![
        Step::Respond(search_hit()),
        Step::Respond(search_hit()),
        Step::Respond(inquiry_answer()),
    ]);
    let id = store.create_session().await;

    dispatcher.handle(&id, "育成方針の議事録").await.unwrap();
    dispatcher.handle(&id, "研修体系の資料").await.unwrap();

    store.select_mode(&id, Mode::Inquiry).await.unwrap();
    dispatcher.handle(&id, "人事部の従業員を一覧化して").await.unwrap();

    let snapshot = store.snapshot(&id).await.unwrap();
    assert_eq!(snapshot.messages.len(), 6);

    // The first two assistant entries keep their search-mode formatting
    for index in [1, 3] {
        assert!(snapshot.messages[index]
            .content
            .starts_with(&catalog.search_result_heading));
    }
    // The third was rendered by the inquiry renderer
    assert!(snapshot.messages[5]
        .content
        .starts_with("人事部に所属している従業員は以下の通りです。"));
    assert!(snapshot.messages[5].content.contains(&catalog.source_heading));
}

#[tokio::test]
async fn successful_turn_appends_exactly_two_without_mutating_existing() {
    let (dispatcher, store, _catalog) = harness(vec![
        Step::Respond(search_hit()),
        Step::Respond(search_hit()),
    ]);
    let id = store.create_session().await;

    dispatcher.handle(&id, "一回目").await.unwrap();
    let first = store.snapshot(&id).await.unwrap().messages;

    dispatcher.handle(&id, "二回目").await.unwrap();
    let second = store.snapshot(&id).await.unwrap().messages;

    assert_eq!(second.len(), first.len() + 2);
    assert_eq!(&second[..first.len()], &first[..]);
}

#[tokio::test]
async fn rendering_failure_reports_and_appends_nothing() {
    // Inquiry mode with an empty answer makes the renderer fail
    let (dispatcher, store, _catalog) = harness(vec![Step::Respond(GenerationResponse {
        answer: String::new(),
        sources: vec![],
    })]);
    let id = store.create_session().await;
    store.select_mode(&id, Mode::Inquiry).await.unwrap();

    let outcome = dispatcher.handle(&id, "何か教えて").await.unwrap();

    assert_eq!(outcome.phase, TurnPhase::Failed);
    assert_eq!(outcome.notice.unwrap().kind, FailureKind::Rendering);
    assert!(store.snapshot(&id).await.unwrap().messages.is_empty());
}

#[tokio::test]
async fn second_submission_is_rejected_while_first_is_outstanding() {
    let release = Arc::new(Notify::new());
    let (dispatcher, store, _catalog) = harness(vec![Step::BlockThenRespond(
        release.clone(),
        search_hit(),
    )]);
    let id = store.create_session().await;

    let first = {
        let dispatcher = dispatcher.clone();
        let id = id.clone();
        tokio::spawn(async move { dispatcher.handle(&id, "最初の質問").await })
    };

    // Wait until the first turn has claimed the session
    loop {
        if store.get_info(&id).await.unwrap().busy {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }

    let second = dispatcher.handle(&id, "割り込みの質問").await;
    assert!(matches!(second, Err(ApplicationError::Busy { .. })));

    release.notify_one();
    let outcome = first.await.unwrap().unwrap();
    assert_eq!(outcome.phase, TurnPhase::Committed);

    // Only the first turn reached the log
    assert_eq!(store.snapshot(&id).await.unwrap().messages.len(), 2);
}

#[tokio::test]
async fn sidebar_agrees_with_mode_after_any_event_sequence() {
    let (_dispatcher, store, catalog) = harness(vec![]);
    let id = store.create_session().await;

    let events = [
        Mode::Inquiry,
        Mode::Inquiry,
        Mode::DocumentSearch,
        Mode::Inquiry,
        Mode::DocumentSearch,
        Mode::DocumentSearch,
    ];

    for mode in events {
        store.select_mode(&id, mode).await.unwrap();
        let snapshot = store.snapshot(&id).await.unwrap();
        let view = render_page(
            &catalog,
            &PageState {
                mode: snapshot.mode,
                messages: snapshot.messages,
                busy: snapshot.busy,
                notice: None,
            },
        )
        .unwrap();

        let selected: Vec<_> = view.cards.iter().filter(|c| c.selected).collect();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].label, catalog.label_for_mode(mode));
    }
}

#[tokio::test]
async fn replaying_the_same_log_twice_renders_identically() {
    let (dispatcher, store, catalog) = harness(vec![
        Step::Respond(search_hit()),
        Step::Respond(inquiry_answer()),
    ]);
    let id = store.create_session().await;

    dispatcher.handle(&id, "議事録はどこ？").await.unwrap();
    store.select_mode(&id, Mode::Inquiry).await.unwrap();
    dispatcher.handle(&id, "内容を要約して").await.unwrap();

    let snapshot = store.snapshot(&id).await.unwrap();
    let state = PageState {
        mode: snapshot.mode,
        messages: snapshot.messages,
        busy: snapshot.busy,
        notice: None,
    };

    let first = render_page(&catalog, &state).unwrap();
    let second = render_page(&catalog, &state).unwrap();
    assert_eq!(first, second);
}
