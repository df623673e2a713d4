//! Session Management Module
//!
//! Per-connection session state: mode, message log, activity bookkeeping,
//! and the store that owns all of it.

pub mod store;
pub mod types;

pub use store::{SessionSnapshot, SessionStore};
pub use types::*;
