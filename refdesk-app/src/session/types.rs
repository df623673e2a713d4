//! Session types and the per-turn state machine

use chrono::{DateTime, Utc};
use refdesk_core::{Mode, TurnMessage};
use serde::{Deserialize, Serialize};

/// Phases of a single conversation turn.
///
/// `Idle` is both the initial state and the state re-entered after either
/// terminal phase; `Committed` and `Failed` are terminal for the turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnPhase {
    Idle,
    Echoing,
    AwaitingResponse,
    Rendering,
    Committed,
    Failed,
}

impl TurnPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TurnPhase::Committed | TurnPhase::Failed)
    }

    /// Legal transitions for a single turn.
    pub fn can_advance_to(&self, next: TurnPhase) -> bool {
        use TurnPhase::*;
        matches!(
            (self, next),
            (Idle, Echoing)
                | (Echoing, AwaitingResponse)
                | (Echoing, Failed)
                | (AwaitingResponse, Rendering)
                | (AwaitingResponse, Failed)
                | (Rendering, Committed)
                | (Rendering, Failed)
                | (Committed, Idle)
                | (Failed, Idle)
        )
    }
}

/// Session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Session timeout in minutes
    pub session_timeout_minutes: u32,
    /// How many recent messages are passed to the backend as context
    pub max_context_messages: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            session_timeout_minutes: 480, // 8 hours
            max_context_messages: 10,
        }
    }
}

/// Session statistics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionStats {
    /// Turns committed to the log
    pub committed_turns: u64,
    /// Turns that failed before commit
    pub failed_turns: u64,
    /// Timestamp of the last committed turn
    pub last_turn_at: Option<DateTime<Utc>>,
}

/// One browser connection's conversation state.
///
/// The message log is private: the only way to grow it is
/// [`Session::append_turn`], which takes a full user/assistant pair, so a
/// half-committed turn cannot exist in the store.
pub struct Session {
    /// Unique session identifier
    pub id: String,
    /// Currently selected answer mode
    pub mode: Mode,
    /// Set once at session boot, never reset
    pub initialized: bool,
    /// Whether a generation call is outstanding for this session
    pub in_flight: bool,
    /// Session creation and activity timestamps
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    /// Session configuration
    pub config: SessionConfig,
    /// Session statistics
    pub stats: SessionStats,
    messages: Vec<TurnMessage>,
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        let now = Utc::now();

        Self {
            id: uuid::Uuid::new_v4().to_string(),
            mode: Mode::default(),
            initialized: false,
            in_flight: false,
            created_at: now,
            last_activity: now,
            config,
            stats: SessionStats::default(),
            messages: Vec::new(),
        }
    }

    /// The stored conversation log, in chronological order.
    pub fn messages(&self) -> &[TurnMessage] {
        &self.messages
    }

    /// Append one committed turn. The pair is appended atomically, user
    /// message first; nothing else may grow the log.
    pub fn append_turn(&mut self, user: TurnMessage, assistant: TurnMessage) {
        self.messages.push(user);
        self.messages.push(assistant);
        self.stats.committed_turns += 1;
        self.stats.last_turn_at = Some(Utc::now());
        self.update_activity();
    }

    /// Update the last activity timestamp
    pub fn update_activity(&mut self) {
        self.last_activity = Utc::now();
    }

    /// Get session age in minutes
    pub fn age_minutes(&self) -> i64 {
        (Utc::now() - self.created_at).num_minutes()
    }

    /// Check if session is stale based on configuration
    pub fn is_stale(&self) -> bool {
        let timeout_minutes = self.config.session_timeout_minutes;
        !self.in_flight
            && (Utc::now() - self.last_activity).num_minutes() > timeout_minutes as i64
    }
}

/// Session information for external consumption
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionInfo {
    pub id: String,
    pub mode: Mode,
    pub message_count: usize,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    pub busy: bool,
    pub age_minutes: i64,
    pub stats: SessionStats,
}

impl From<&Session> for SessionInfo {
    fn from(session: &Session) -> Self {
        Self {
            id: session.id.clone(),
            mode: session.mode,
            message_count: session.messages.len(),
            created_at: session.created_at,
            last_activity: session.last_activity,
            busy: session.in_flight,
            age_minutes: session.age_minutes(),
            stats: session.stats.clone(),
        }
    }
}
