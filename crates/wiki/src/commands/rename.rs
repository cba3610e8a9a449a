//! `wiki rename` command implementation.

use std::path::PathBuf;

use clap::Args;
use wiki_config::{CliSettings, Config};
use wiki_links::{RenameOutcome, rename_page};
use wiki_storage_fs::FsPageStore;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the rename command.
#[derive(Args)]
pub(crate) struct RenameArgs {
    /// Current page title.
    old: String,

    /// New page title.
    new: String,

    /// Path to configuration file (default: auto-discover wiki.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Page directory (overrides config).
    #[arg(long)]
    pages_dir: Option<PathBuf>,
}

impl RenameArgs {
    /// Execute the rename command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the rename fails.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            pages_dir: self.pages_dir,
            ..CliSettings::default()
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        tracing::debug!(pages_dir = %config.pages_resolved.pages_dir.display(), "Opening page store");
        let store = FsPageStore::open(config.pages_resolved.pages_dir)?;

        let result = rename_page(&store, &self.old, &self.new)?;

        match result.outcome {
            RenameOutcome::Moved => {
                output.success(&format!("Renamed {} to {}", self.old, self.new));
            }
            RenameOutcome::Missing => {
                output.warning(&format!("No page named {}; only links were updated", self.old));
            }
        }
        output.info(&format!(
            "Rewrote {} link(s) in {} of {} page(s)",
            result.links.links,
            result.links.rewritten.len(),
            result.links.scanned
        ));

        Ok(())
    }
}
