//! Session store - owner of all per-connection state
//!
//! All reads and writes of session state go through this store; no other
//! component keeps its own copy of a session's mode or message log.

use super::{Session, SessionConfig, SessionInfo};
use crate::{ApplicationError, ApplicationResult};
use refdesk_core::{Mode, TurnMessage, UiCatalog};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Snapshot of everything a page render needs, taken under one read lock.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub mode: Mode,
    pub messages: Vec<TurnMessage>,
    pub busy: bool,
}

/// Store of active sessions, one per browser connection.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
    default_config: SessionConfig,
    catalog: Arc<UiCatalog>,
}

impl SessionStore {
    pub fn new(default_config: SessionConfig, catalog: Arc<UiCatalog>) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            default_config,
            catalog,
        }
    }

    /// Create a new session (connect). Boots the session exactly once: the
    /// boot log line is emitted here and the `initialized` flag set.
    pub async fn create_session(&self) -> String {
        let mut session = Session::new(self.default_config.clone());
        let session_id = session.id.clone();

        // One-time boot; a second initialization of the same session is a no-op.
        if !session.initialized {
            session.initialized = true;
            info!(session_id = %session_id, "{}", self.catalog.boot_log_message);
        }

        let mut sessions = self.sessions.write().await;
        sessions.insert(session_id.clone(), session);
        session_id
    }

    pub async fn exists(&self, session_id: &str) -> bool {
        self.sessions.read().await.contains_key(session_id)
    }

    /// Get session information
    pub async fn get_info(&self, session_id: &str) -> ApplicationResult<SessionInfo> {
        let sessions = self.sessions.read().await;
        let session = sessions
            .get(session_id)
            .ok_or_else(|| ApplicationError::session(format!("Session not found: {}", session_id)))?;
        Ok(SessionInfo::from(session))
    }

    /// List all sessions
    pub async fn list_sessions(&self) -> Vec<SessionInfo> {
        let sessions = self.sessions.read().await;
        sessions.values().map(SessionInfo::from).collect()
    }

    /// Take a render snapshot under a single read lock.
    pub async fn snapshot(&self, session_id: &str) -> ApplicationResult<SessionSnapshot> {
        let sessions = self.sessions.read().await;
        let session = sessions
            .get(session_id)
            .ok_or_else(|| ApplicationError::session(format!("Session not found: {}", session_id)))?;
        Ok(SessionSnapshot {
            mode: session.mode,
            messages: session.messages().to_vec(),
            busy: session.in_flight,
        })
    }

    /// Write the selected mode unconditionally, even when unchanged, so a
    /// redraw that replays the same selection event is idempotent.
    pub async fn select_mode(&self, session_id: &str, mode: Mode) -> ApplicationResult<Mode> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(session_id)
            .ok_or_else(|| ApplicationError::session(format!("Session not found: {}", session_id)))?;

        session.mode = mode;
        session.update_activity();
        debug!(session_id = %session_id, mode = ?mode, "Mode selected");
        Ok(session.mode)
    }

    /// Claim the session for one turn (single-flight). Returns the mode the
    /// turn is bound to; a second submission while one is outstanding is
    /// rejected, never queued.
    pub async fn begin_turn(&self, session_id: &str) -> ApplicationResult<Mode> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(session_id)
            .ok_or_else(|| ApplicationError::session(format!("Session not found: {}", session_id)))?;

        if session.in_flight {
            return Err(ApplicationError::busy(format!(
                "A generation call is already outstanding for session {}",
                session_id
            )));
        }

        session.in_flight = true;
        session.update_activity();
        Ok(session.mode)
    }

    /// Release the single-flight claim. On a committed turn the
    /// user/assistant pair is appended under the same write-lock
    /// acquisition; on a failed turn nothing is appended.
    pub async fn finish_turn(
        &self,
        session_id: &str,
        committed: Option<(TurnMessage, TurnMessage)>,
    ) -> ApplicationResult<()> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(session_id)
            .ok_or_else(|| ApplicationError::session(format!("Session not found: {}", session_id)))?;

        session.in_flight = false;
        match committed {
            Some((user, assistant)) => session.append_turn(user, assistant),
            None => {
                session.stats.failed_turns += 1;
                session.update_activity();
            }
        }
        Ok(())
    }

    /// Build the conversation context string handed to the backend, from the
    /// most recent stored messages.
    pub async fn conversation_context(&self, session_id: &str) -> ApplicationResult<Option<String>> {
        let sessions = self.sessions.read().await;
        let session = sessions
            .get(session_id)
            .ok_or_else(|| ApplicationError::session(format!("Session not found: {}", session_id)))?;

        let messages = session.messages();
        if messages.is_empty() {
            return Ok(None);
        }

        let recent = messages
            .iter()
            .rev()
            .take(session.config.max_context_messages)
            .collect::<Vec<_>>()
            .into_iter()
            .rev();

        let mut context = String::from("Previous conversation:\n");
        for message in recent {
            context.push_str(&format!("{}: {}\n", message.role.as_str(), message.content));
        }
        Ok(Some(context))
    }

    /// Remove a session (disconnect)
    pub async fn remove_session(&self, session_id: &str) -> ApplicationResult<()> {
        let mut sessions = self.sessions.write().await;
        sessions
            .remove(session_id)
            .ok_or_else(|| ApplicationError::session(format!("Session not found: {}", session_id)))?;
        info!(session_id = %session_id, "Removed session");
        Ok(())
    }

    /// Clean up stale sessions
    pub async fn cleanup_stale_sessions(&self) -> usize {
        let mut sessions = self.sessions.write().await;

        let stale: Vec<String> = sessions
            .iter()
            .filter(|(_, session)| session.is_stale())
            .map(|(id, _)| id.clone())
            .collect();

        let count = stale.len();
        for session_id in stale {
            sessions.remove(&session_id);
            info!(session_id = %session_id, "Cleaned up stale session");
        }

        count
    }
}
