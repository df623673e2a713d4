//! Generation backend seam
//!
//! The retrieval index, prompt chain, and LLM call live behind this trait.
//! The application layer only knows two operations: a one-time
//! initialization (index/chain construction) and the generation call itself.

use crate::{ApplicationError, ApplicationResult};
use async_trait::async_trait;
use refdesk_core::{ErrorContext, GenerationResponse, RefdeskError};
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

/// External generation service consumed by the turn dispatcher.
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    /// Build the retrieval index / chain. Idempotent on the service side;
    /// fails with an initialization error on any setup problem.
    async fn initialize(&self) -> ApplicationResult<()>;

    /// Run one retrieval-augmented generation call. The conversation context
    /// accumulated for the session is passed along verbatim; timeouts are
    /// the implementation's own concern and surface as plain errors here.
    async fn generate(
        &self,
        question: &str,
        context: Option<&str>,
    ) -> ApplicationResult<GenerationResponse>;
}

/// Configuration for the HTTP generation backend
#[derive(Debug, Clone)]
pub struct HttpBackendConfig {
    /// Base URL of the generation pipeline service
    pub endpoint: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for HttpBackendConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:8500".to_string(),
            timeout_secs: 120,
        }
    }
}

/// Generation backend reached over HTTP.
///
/// `POST {endpoint}/generate` runs a query; `GET {endpoint}/ready` reports
/// whether the index/chain build completed.
pub struct HttpBackend {
    client: reqwest::Client,
    config: HttpBackendConfig,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    question: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    context: Option<&'a str>,
}

impl HttpBackend {
    pub fn new(config: HttpBackendConfig) -> ApplicationResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                ApplicationError::Core(refdesk_core::initialization_error!(
                    format!("Failed to build HTTP client: {}", e),
                    "backend",
                    e
                ))
            })?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl GenerativeBackend for HttpBackend {
    async fn initialize(&self) -> ApplicationResult<()> {
        let url = format!("{}/ready", self.config.endpoint);
        debug!(url = %url, "Checking generation backend readiness");

        let response = self.client.get(&url).send().await.map_err(|e| {
            ApplicationError::Core(RefdeskError::Initialization {
                message: format!("Generation backend is unreachable: {}", e),
                source: Some(Box::new(e)),
                context: ErrorContext::new("backend")
                    .with_operation("initialize")
                    .with_suggestion("Check that the pipeline service is running")
                    .with_suggestion("Verify the configured backend endpoint"),
            })
        })?;

        if !response.status().is_success() {
            return Err(ApplicationError::Core(RefdeskError::Initialization {
                message: format!(
                    "Generation backend is not ready (status {})",
                    response.status()
                ),
                source: None,
                context: ErrorContext::new("backend").with_operation("initialize"),
            }));
        }

        Ok(())
    }

    async fn generate(
        &self,
        question: &str,
        context: Option<&str>,
    ) -> ApplicationResult<GenerationResponse> {
        let url = format!("{}/generate", self.config.endpoint);
        let request = GenerateRequest { question, context };

        // A timeout raised by the client and a backend error are reported
        // identically: both are generation failures for this turn.
        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                ApplicationError::Core(RefdeskError::Generation {
                    message: format!("Generation call failed: {}", e),
                    source: Some(Box::new(e)),
                    context: ErrorContext::new("backend").with_operation("generate"),
                })
            })?;

        if !response.status().is_success() {
            return Err(ApplicationError::Core(RefdeskError::Generation {
                message: format!("Generation call returned status {}", response.status()),
                source: None,
                context: ErrorContext::new("backend").with_operation("generate"),
            }));
        }

        response.json::<GenerationResponse>().await.map_err(|e| {
            ApplicationError::Core(RefdeskError::Generation {
                message: format!("Malformed generation response: {}", e),
                source: Some(Box::new(e)),
                context: ErrorContext::new("backend").with_operation("decode_response"),
            })
        })
    }
}
