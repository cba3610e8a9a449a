//! Page rename endpoint.

use std::sync::Arc;

use axum::Form;
use axum::extract::{Path, State};
use axum::response::Response;
use serde::Deserialize;
use wiki_links::{RenameOutcome, rename_page};

use crate::error::ServerError;
use crate::handlers::{found, page_url, run_blocking};
use crate::state::AppState;

/// Form body for POST /rename/{title}.
#[derive(Deserialize)]
pub(crate) struct RenameForm {
    #[serde(default)]
    new_title: String,
}

/// Handle POST /rename/{title}.
///
/// Redirects to the moved page, or to the editor of the new title when there
/// was no page to move.
pub(crate) async fn rename(
    Path(old_title): Path<String>,
    State(state): State<Arc<AppState>>,
    Form(form): Form<RenameForm>,
) -> Result<Response, ServerError> {
    let new_title = form.new_title;

    let result = {
        let _writer = state.writer.lock().await;
        let store = Arc::clone(&state.store);
        let (old, new) = (old_title.clone(), new_title.clone());
        run_blocking(move || rename_page(store.as_ref(), &old, &new)).await??
    };
    tracing::info!(
        old = %old_title,
        new = %new_title,
        outcome = ?result.outcome,
        pages = result.links.rewritten.len(),
        links = result.links.links,
        "Renamed page"
    );

    let prefix = match result.outcome {
        RenameOutcome::Moved => "/view/",
        RenameOutcome::Missing => "/edit/",
    };
    Ok(found(&page_url(prefix, &new_title)))
}
