//! Application state shared by all handlers

use crate::{WebConfig, WebError, WebResult};
use refdesk_app::{
    ApplicationResult, GenerativeBackend, HttpBackend, HttpBackendConfig, SessionConfig,
    SessionStore, TurnDispatcher,
};
use refdesk_core::UiCatalog;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::info;

/// Shared application state. Cheap to clone; all heavy members are behind
/// `Arc`s.
#[derive(Clone)]
pub struct AppState {
    /// Configuration
    pub config: WebConfig,
    /// Validated user-facing string catalog
    pub catalog: Arc<UiCatalog>,
    /// Session store (one session per browser connection)
    pub store: SessionStore,
    /// Turn dispatcher
    pub dispatcher: TurnDispatcher,
    backend: Arc<dyn GenerativeBackend>,
    /// One-time backend initialization guard. Stores only on success, so a
    /// failed initialization is retried on the next session connect.
    init: Arc<OnceCell<()>>,
}

impl AppState {
    /// Create a new application state
    pub async fn new(config: WebConfig) -> WebResult<Self> {
        // Load and validate the catalog up front; every recognized key is
        // checked here rather than looked up ad hoc later.
        let catalog = match &config.catalog_path {
            Some(path) => UiCatalog::from_file(path)
                .map_err(|e| WebError::Config(format!("Failed to load catalog: {}", e)))?,
            None => {
                let catalog = UiCatalog::default();
                catalog
                    .validate()
                    .map_err(|e| WebError::Config(format!("Invalid default catalog: {}", e)))?;
                catalog
            }
        };
        let catalog = Arc::new(catalog);

        let backend: Arc<dyn GenerativeBackend> = Arc::new(
            HttpBackend::new(HttpBackendConfig {
                endpoint: config.backend_url.clone(),
                ..Default::default()
            })
            .map_err(|e| WebError::Config(format!("Failed to create backend: {}", e)))?,
        );

        let store = SessionStore::new(SessionConfig::default(), catalog.clone());
        let dispatcher = TurnDispatcher::new(store.clone(), backend.clone(), catalog.clone());

        info!("Application state initialized successfully");

        Ok(Self {
            config,
            catalog,
            store,
            dispatcher,
            backend,
            init: Arc::new(OnceCell::new()),
        })
    }

    /// Create a state around a caller-provided generation backend.
    pub fn with_backend(
        config: WebConfig,
        catalog: Arc<UiCatalog>,
        backend: Arc<dyn GenerativeBackend>,
    ) -> Self {
        let store = SessionStore::new(SessionConfig::default(), catalog.clone());
        let dispatcher = TurnDispatcher::new(store.clone(), backend.clone(), catalog.clone());

        Self {
            config,
            catalog,
            store,
            dispatcher,
            backend,
            init: Arc::new(OnceCell::new()),
        }
    }

    /// Run the one-time backend initialization (index/chain construction).
    /// Idempotent: once it has succeeded, later calls are no-ops; a failure
    /// only halts the current render pass and is retried on the next one.
    pub async fn ensure_initialized(&self) -> ApplicationResult<()> {
        self.init
            .get_or_try_init(|| async { self.backend.initialize().await })
            .await
            .map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use refdesk_core::{ErrorContext, GenerationResponse, RefdeskError};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Fails the first `failures` initialization attempts, then succeeds.
    struct FlakyBackend {
        failures: usize,
        attempts: AtomicUsize,
    }

    #[async_trait]
    impl GenerativeBackend for FlakyBackend {
        async fn initialize(&self) -> refdesk_app::ApplicationResult<()> {
            let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
            if attempt < self.failures {
                return Err(refdesk_app::ApplicationError::Core(
                    RefdeskError::Initialization {
                        message: "index build failed".to_string(),
                        source: None,
                        context: ErrorContext::new("test_backend"),
                    },
                ));
            }
            Ok(())
        }

        async fn generate(
            &self,
            _question: &str,
            _context: Option<&str>,
        ) -> refdesk_app::ApplicationResult<GenerationResponse> {
            Ok(GenerationResponse {
                answer: "回答".to_string(),
                sources: vec![],
            })
        }
    }

    #[tokio::test]
    async fn initialization_failure_is_retried_until_it_succeeds() {
        let backend = Arc::new(FlakyBackend {
            failures: 1,
            attempts: AtomicUsize::new(0),
        });
        let state = AppState::with_backend(
            WebConfig::default(),
            Arc::new(UiCatalog::default()),
            backend.clone(),
        );

        // First render pass halts on the initialization failure
        assert!(state.ensure_initialized().await.is_err());
        // The next pass retries and succeeds
        assert!(state.ensure_initialized().await.is_ok());
        // Once initialized, further calls are no-ops
        assert!(state.ensure_initialized().await.is_ok());
        assert_eq!(backend.attempts.load(Ordering::SeqCst), 2);
    }
}
