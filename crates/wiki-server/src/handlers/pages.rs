//! Page view, edit, save and index endpoints.

use std::sync::Arc;

use axum::Form;
use axum::extract::{Path, State};
use axum::response::{Html, IntoResponse, Response};
use minijinja::context;
use serde::Deserialize;

use crate::error::ServerError;
use crate::handlers::{found, page_url, run_blocking};
use crate::state::AppState;
use crate::templates;

/// Form body for POST /save/{title}.
#[derive(Deserialize)]
pub(crate) struct SaveForm {
    #[serde(default)]
    body: String,
}

/// Handle GET /view/{title}.
///
/// A missing page redirects to its editor.
pub(crate) async fn view(
    Path(title): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ServerError> {
    let store = Arc::clone(&state.store);
    let key = title.clone();
    let page = match run_blocking(move || store.load(&key)).await? {
        Ok(page) => page,
        Err(e) if e.is_not_found() => return Ok(found(&page_url("/edit/", &title))),
        Err(e) => return Err(e.into()),
    };

    let body = state.renderer.render(&page.body_text());
    let html = state
        .templates
        .render(templates::VIEW, context! { title => page.title, body })?;

    Ok(Html(html).into_response())
}

/// Handle GET /edit/{title}.
///
/// A missing page opens an empty editor.
pub(crate) async fn edit(
    Path(title): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ServerError> {
    let store = Arc::clone(&state.store);
    let key = title.clone();
    let body = match run_blocking(move || store.load(&key)).await? {
        Ok(page) => page.body_text().into_owned(),
        Err(e) if e.is_not_found() => String::new(),
        Err(e) => return Err(e.into()),
    };

    let html = state
        .templates
        .render(templates::EDIT, context! { title, body })?;

    Ok(Html(html).into_response())
}

/// Handle POST /save/{title}.
pub(crate) async fn save(
    Path(title): Path<String>,
    State(state): State<Arc<AppState>>,
    Form(form): Form<SaveForm>,
) -> Result<Response, ServerError> {
    let bytes = form.body.len();
    {
        let _writer = state.writer.lock().await;
        let store = Arc::clone(&state.store);
        let key = title.clone();
        run_blocking(move || store.save(&key, form.body.as_bytes())).await??;
    }
    tracing::info!(title = %title, bytes, "Saved page");

    Ok(found(&page_url("/view/", &title)))
}

/// Handle GET /all/.
pub(crate) async fn all(State(state): State<Arc<AppState>>) -> Result<Response, ServerError> {
    let store = Arc::clone(&state.store);
    let mut titles = run_blocking(move || store.list()).await??;
    titles.sort_unstable();

    let html = state.templates.render(templates::ALL, context! { titles })?;

    Ok(Html(html).into_response())
}
