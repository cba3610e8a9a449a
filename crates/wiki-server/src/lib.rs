//! HTTP server for the flat-file wiki.
//!
//! Serves server-rendered HTML pages on top of a
//! [`PageStore`](wiki_storage::PageStore):
//!
//! | Method | Path              | Action                                     |
//! |--------|-------------------|--------------------------------------------|
//! | GET    | `/view/{title}`   | Rendered page, or redirect to the editor   |
//! | GET    | `/edit/{title}`   | Editor with the raw body                   |
//! | POST   | `/save/{title}`   | Store form field `body`                    |
//! | POST   | `/rename/{title}` | Move page to form field `new_title`        |
//! | GET    | `/all/`           | Sorted page index                          |
//! | any    | anything else     | Redirect to `/view/FrontPage`              |
//!
//! # Quick Start
//!
//! ```ignore
//! use std::path::PathBuf;
//! use wiki_server::{ServerConfig, run_server};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ServerConfig {
//!         pages_dir: PathBuf::from("pages"),
//!         ..ServerConfig::default()
//!     };
//!
//!     run_server(config).await.unwrap();
//! }
//! ```

mod app;
mod error;
mod handlers;
mod middleware;
mod state;
mod templates;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use wiki_storage_fs::FsPageStore;

pub use error::ServerError;
pub use middleware::auth::Credentials;
use state::AppState;
pub use templates::TemplateError;
use templates::Templates;

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Directory holding `<title>.txt` page files.
    pub pages_dir: PathBuf,
    /// Template directory (`None` uses the built-in templates).
    pub templates_dir: Option<PathBuf>,
    /// Basic auth credentials (`None` disables authentication).
    pub credentials: Option<Credentials>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 8080,
            pages_dir: PathBuf::from("pages"),
            templates_dir: None,
            credentials: None,
        }
    }
}

/// Run the server until Ctrl-C.
///
/// Creates the pages directory if it does not exist.
///
/// # Errors
///
/// Returns an error if the pages directory cannot be created, the built-in
/// templates fail to load, or the server fails to bind.
pub async fn run_server(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let store = Arc::new(FsPageStore::open(config.pages_dir.clone())?);
    let templates = Templates::new(config.templates_dir.clone())?;
    let state = Arc::new(AppState::new(store, templates));

    let app = app::create_router(state, config.credentials.clone());

    let addr = SocketAddr::from_str(&format!("{}:{}", config.host, config.port))?;
    tracing::info!(
        address = %addr,
        pages_dir = %config.pages_dir.display(),
        auth = config.credentials.is_some(),
        "Starting server"
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Wait for shutdown signal (Ctrl-C).
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received, stopping server...");
}

/// Create server configuration from wiki config.
#[must_use]
pub fn server_config_from_wiki_config(config: &wiki_config::Config) -> ServerConfig {
    ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
        pages_dir: config.pages_resolved.pages_dir.clone(),
        templates_dir: config.pages_resolved.templates_dir.clone(),
        credentials: config
            .auth
            .as_ref()
            .map(|auth| Credentials::new(&auth.username, &auth.password)),
    }
}
