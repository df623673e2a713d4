//! Template system for server-side rendering
//!
//! The chat page is a single server-rendered shell; everything dynamic is
//! fetched from the JSON API and re-rendered by the page script.

use askama::Template;

/// Chat page template
#[derive(Template)]
#[template(path = "chat.html")]
pub struct ChatTemplate {
    pub title: String,
    pub version: String,
}
