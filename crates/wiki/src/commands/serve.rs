//! `wiki serve` command implementation.

use std::path::PathBuf;

use clap::Args;
use wiki_config::{CliSettings, Config};
use wiki_server::{run_server, server_config_from_wiki_config};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the serve command.
#[derive(Args)]
pub(crate) struct ServeArgs {
    /// Path to configuration file (default: auto-discover wiki.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Host to bind to (overrides config).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind to (overrides config).
    #[arg(short, long)]
    port: Option<u16>,

    /// Page directory (overrides config).
    #[arg(long)]
    pages_dir: Option<PathBuf>,

    /// Template directory (overrides config).
    #[arg(long)]
    templates_dir: Option<PathBuf>,

    /// Enable verbose output (request and page change logs).
    #[arg(short, long)]
    pub verbose: bool,
}

impl ServeArgs {
    /// Execute the serve command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the server fails to start.
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            host: self.host,
            port: self.port,
            pages_dir: self.pages_dir,
            templates_dir: self.templates_dir,
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        config.validate()?;

        output.info(&format!(
            "Starting server on {}:{}",
            config.server.host, config.server.port
        ));
        output.info(&format!(
            "Pages directory: {}",
            config.pages_resolved.pages_dir.display()
        ));
        match &config.pages_resolved.templates_dir {
            Some(dir) => output.info(&format!("Templates directory: {}", dir.display())),
            None => output.info("Templates: built-in"),
        }
        if config.auth.is_some() {
            output.info("Basic auth: enabled");
        } else {
            output.warning("Basic auth: disabled (no [auth] section in config)");
        }

        let server_config = server_config_from_wiki_config(&config);
        run_server(server_config)
            .await
            .map_err(|e| CliError::Server(e.to_string()))?;

        Ok(())
    }
}
