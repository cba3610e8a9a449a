//! Application state.
//!
//! Shared state for all request handlers.

use std::sync::Arc;

use tokio::sync::Mutex;
use wiki_renderer::MarkdownRenderer;
use wiki_storage::PageStore;

use crate::templates::Templates;

/// Application state shared across all handlers.
pub(crate) struct AppState {
    /// Page storage backend.
    pub(crate) store: Arc<dyn PageStore>,
    /// Page templates.
    pub(crate) templates: Templates,
    /// Markdown renderer for the view page.
    pub(crate) renderer: MarkdownRenderer,
    /// Held for the duration of every save and rename.
    pub(crate) writer: Mutex<()>,
}

impl AppState {
    pub(crate) fn new(store: Arc<dyn PageStore>, templates: Templates) -> Self {
        Self {
            store,
            templates,
            renderer: MarkdownRenderer::new(),
            writer: Mutex::new(()),
        }
    }
}
