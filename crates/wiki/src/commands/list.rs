//! `wiki list` command implementation.

use std::path::PathBuf;

use clap::Args;
use wiki_config::{CliSettings, Config};
use wiki_storage::PageStore;
use wiki_storage_fs::FsPageStore;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the list command.
#[derive(Args)]
pub(crate) struct ListArgs {
    /// Path to configuration file (default: auto-discover wiki.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Page directory (overrides config).
    #[arg(long)]
    pages_dir: Option<PathBuf>,
}

impl ListArgs {
    /// Execute the list command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the page directory cannot
    /// be read.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            pages_dir: self.pages_dir,
            ..CliSettings::default()
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        let store = FsPageStore::new(config.pages_resolved.pages_dir);

        for title in sorted_titles(&store)? {
            output.line(&title);
        }

        Ok(())
    }
}

/// All page titles in byte order.
fn sorted_titles(store: &dyn PageStore) -> Result<Vec<String>, CliError> {
    let mut titles = store.list()?;
    titles.sort_unstable();
    Ok(titles)
}
