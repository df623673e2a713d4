//! Refdesk Core - shared data structures, configuration, and error handling
//!
//! This crate defines the types shared by the application layer and the web
//! surface: the answer modes, turn messages, the generation-response payload,
//! the user-facing string catalog, and the unified error type.

pub mod catalog;
pub mod error;
pub mod logging;
pub mod types;

pub use catalog::*;
pub use error::*;
pub use logging::*;
pub use types::*;

// Re-export commonly used external types
pub use tokio;
pub use tracing;
