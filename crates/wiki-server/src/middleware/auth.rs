//! HTTP basic authentication.
//!
//! Only installed when credentials are configured. Every failure answers
//! `401 Unauthorized` with a `WWW-Authenticate` challenge and a plain-text
//! reason.

use axum::extract::{Request, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

const CHALLENGE: &str = r#"Basic realm="wiki""#;
const BAD_HEADER: &str = r#"Authorization header should be "Basic username:password""#;
const BAD_CREDENTIALS: &str = "Username/password validation failed";

/// Username and password accepted by the server.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Credentials {
    /// Expected username.
    pub username: String,
    /// Expected password.
    pub password: String,
}

impl Credentials {
    /// Create credentials.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Check a username/password pair without short-circuiting on content.
    fn verify(&self, username: &str, password: &str) -> bool {
        let user_ok = constant_time_eq(self.username.as_bytes(), username.as_bytes());
        let pass_ok = constant_time_eq(self.password.as_bytes(), password.as_bytes());
        user_ok & pass_ok
    }
}

/// Why a request was refused.
#[derive(Debug, PartialEq, Eq)]
enum AuthFailure {
    BadHeader,
    Decode(String),
    BadCredentials,
}

impl IntoResponse for AuthFailure {
    fn into_response(self) -> Response {
        let message = match self {
            Self::BadHeader => BAD_HEADER.to_owned(),
            Self::Decode(message) => message,
            Self::BadCredentials => BAD_CREDENTIALS.to_owned(),
        };
        (
            StatusCode::UNAUTHORIZED,
            [(header::WWW_AUTHENTICATE, HeaderValue::from_static(CHALLENGE))],
            message,
        )
            .into_response()
    }
}

/// Compare two byte strings in time independent of where they differ.
///
/// Length differences are still observable.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Validate an `Authorization` header value.
fn check(credentials: &Credentials, header: Option<&HeaderValue>) -> Result<(), AuthFailure> {
    let value = header
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthFailure::BadHeader)?;

    let Some(("Basic", encoded)) = value.split_once(' ') else {
        return Err(AuthFailure::BadHeader);
    };

    let decoded = STANDARD
        .decode(encoded)
        .map_err(|e| AuthFailure::Decode(e.to_string()))?;
    let decoded = String::from_utf8_lossy(&decoded);

    let (username, password) = decoded.split_once(':').ok_or(AuthFailure::BadHeader)?;

    if credentials.verify(username, password) {
        Ok(())
    } else {
        Err(AuthFailure::BadCredentials)
    }
}

/// Middleware rejecting requests without valid basic credentials.
pub(crate) async fn basic_auth(
    State(credentials): State<Credentials>,
    request: Request,
    next: Next,
) -> Response {
    match check(&credentials, request.headers().get(header::AUTHORIZATION)) {
        Ok(()) => next.run(request).await,
        Err(failure) => {
            tracing::warn!(uri = %request.uri(), reason = ?failure, "Unauthorized request");
            failure.into_response()
        }
    }
}
