//! HTTP request handlers.

pub(crate) mod pages;
pub(crate) mod rename;

use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

use crate::error::ServerError;

/// Page shown for any path no route matches.
pub(crate) const FRONT_PAGE: &str = "FrontPage";

/// Characters escaped when a title is placed in a URL path.
///
/// `/` is kept so nested titles stay readable and round-trip through the
/// wildcard routes.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Build `<prefix><title>` with the title percent-encoded.
pub(crate) fn page_url(prefix: &str, title: &str) -> String {
    format!("{prefix}{}", utf8_percent_encode(title, PATH_SEGMENT))
}

/// `302 Found` redirect to `location`.
pub(crate) fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_owned())]).into_response()
}

/// Run page store work on the blocking thread pool.
pub(crate) async fn run_blocking<R, F>(f: F) -> Result<R, ServerError>
where
    R: Send + 'static,
    F: FnOnce() -> R + Send + 'static,
{
    Ok(tokio::task::spawn_blocking(f).await?)
}

/// Handle any unmatched request.
pub(crate) async fn front_page() -> Response {
    found(&page_url("/view/", FRONT_PAGE))
}
