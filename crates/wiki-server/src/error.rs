//! Error types for the HTTP server.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use wiki_links::RenameError;
use wiki_storage::StorageError;

use crate::templates::TemplateError;

/// Server error type.
///
/// Every variant is terminal for the request and answered with
/// `500 Internal Server Error` and the error text as a plain-text body.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Page storage failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Rename or link rewrite failed.
    #[error(transparent)]
    Rename(#[from] RenameError),

    /// Template lookup or rendering failed.
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// Blocking storage task panicked or was cancelled.
    #[error("storage task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        tracing::error!(error = %message, "Request failed");

        (StatusCode::INTERNAL_SERVER_ERROR, message).into_response()
    }
}
