//! Refdesk Web Server
//!
//! Main web server implementation using Axum.

use crate::{create_app, AppState, WebConfig, WebError, WebResult};
use axum::serve;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{error, info};

/// Main Refdesk web server
pub struct RefdeskServer {
    config: WebConfig,
    state: AppState,
}

impl RefdeskServer {
    /// Create a new Refdesk server
    pub async fn new(config: WebConfig) -> WebResult<Self> {
        let state = AppState::new(config.clone()).await?;

        Ok(Self { config, state })
    }

    /// Start the web server
    pub async fn start(self) -> WebResult<()> {
        let address = self.config.address();

        info!("Starting Refdesk web server");
        info!("Server address: http://{}", address);
        info!("Development mode: {}", self.config.dev_mode);

        // Create the application
        let app = create_app(self.state.clone());

        // Create TCP listener
        let listener = TcpListener::bind(&address)
            .await
            .map_err(WebError::Server)?;

        info!("Server listening on http://{}", address);

        // Sweep stale sessions periodically
        let cleanup_state = self.state.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(3600));
            loop {
                interval.tick().await;
                let removed = cleanup_state.store.cleanup_stale_sessions().await;
                if removed > 0 {
                    info!(removed, "Stale session sweep finished");
                }
            }
        });

        // Start the server
        if let Err(e) = serve(listener, app).await {
            error!("Server error: {}", e);
            return Err(WebError::Server(e));
        }

        Ok(())
    }

    /// Get server configuration
    pub fn config(&self) -> &WebConfig {
        &self.config
    }

    /// Get application state
    pub fn state(&self) -> &AppState {
        &self.state
    }
}

/// Builder for RefdeskServer
pub struct RefdeskServerBuilder {
    config: WebConfig,
}

impl RefdeskServerBuilder {
    /// Create a new server builder
    pub fn new() -> Self {
        Self {
            config: WebConfig::default(),
        }
    }

    /// Set the server host
    pub fn host<S: Into<String>>(mut self, host: S) -> Self {
        self.config.host = host.into();
        self
    }

    /// Set the server port
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Enable development mode
    pub fn dev_mode(mut self, dev_mode: bool) -> Self {
        self.config.dev_mode = dev_mode;
        self
    }

    /// Set the generation backend URL
    pub fn backend_url<S: Into<String>>(mut self, backend_url: S) -> Self {
        self.config.backend_url = backend_url.into();
        self
    }

    /// Set the catalog file path
    pub fn catalog_path<S: Into<String>>(mut self, catalog_path: S) -> Self {
        self.config.catalog_path = Some(catalog_path.into());
        self
    }

    /// Build the server
    pub async fn build(self) -> WebResult<RefdeskServer> {
        RefdeskServer::new(self.config).await
    }
}

impl Default for RefdeskServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
