//! Filesystem page store for the flat-file wiki.
//!
//! This crate provides [`FsPageStore`], a filesystem-based implementation of
//! the [`PageStore`](wiki_storage::PageStore) trait. Each page is a single
//! file named `<title>.txt` inside the pages directory; there is no index and
//! no cache, so every operation observes the directory as it is.
//!
//! # Example
//!
//! ```ignore
//! use wiki_storage::PageStore;
//! use wiki_storage_fs::FsPageStore;
//!
//! let store = FsPageStore::open("pages")?;
//! store.save("FrontPage", b"Welcome")?;
//! let page = store.load("FrontPage")?;
//! ```

use std::fs;
use std::io::Write;
use std::path::{Component, Path, PathBuf};

use wiki_storage::{Page, PageStore, RenameStatus, StorageError};

/// Backend identifier for error messages.
const BACKEND: &str = "Fs";

/// Extension of page files.
pub const PAGE_EXTENSION: &str = "txt";

/// Filesystem page store.
///
/// Maps a title to `<pages_dir>/<title>.txt`. Titles are joined to the
/// directory as-is, so a title containing `/` addresses a subdirectory that
/// must already exist; only empty titles and titles that climb out of the
/// directory are rejected up front.
#[derive(Debug, Clone)]
pub struct FsPageStore {
    /// Directory holding page files.
    pages_dir: PathBuf,
}

impl FsPageStore {
    /// Create a store over an existing directory without touching the filesystem.
    #[must_use]
    pub fn new(pages_dir: impl Into<PathBuf>) -> Self {
        Self {
            pages_dir: pages_dir.into(),
        }
    }

    /// Create a store, creating the pages directory (mode `0700` on unix) if absent.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the directory cannot be created.
    pub fn open(pages_dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let pages_dir = pages_dir.into();
        create_private_dir(&pages_dir).map_err(|e| {
            StorageError::write(e, pages_dir.display().to_string()).with_backend(BACKEND)
        })?;
        tracing::debug!(dir = %pages_dir.display(), "Opened page store");
        Ok(Self { pages_dir })
    }

    /// Directory holding page files.
    #[must_use]
    pub fn pages_dir(&self) -> &Path {
        &self.pages_dir
    }

    /// Backing file path for a title.
    #[must_use]
    pub fn page_file(&self, title: &str) -> PathBuf {
        self.pages_dir.join(format!("{title}.{PAGE_EXTENSION}"))
    }

    /// Validate that a title is non-empty and stays inside the pages directory.
    fn validate_title(title: &str) -> Result<(), StorageError> {
        let path = Path::new(title);
        let escapes = path
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::RootDir | Component::Prefix(_)));

        if title.is_empty() || escapes {
            return Err(StorageError::invalid_title(title).with_backend(BACKEND));
        }
        Ok(())
    }

    /// Title for a directory entry, or `None` if it is not a page file.
    fn title_from_entry(entry: &fs::DirEntry) -> Option<String> {
        if !entry.file_type().is_ok_and(|t| t.is_file()) {
            return None;
        }
        let name = entry.file_name().into_string().ok()?;
        if name.starts_with('.') {
            return None;
        }
        name.strip_suffix(&format!(".{PAGE_EXTENSION}"))
            .filter(|stem| !stem.is_empty())
            .map(str::to_owned)
    }
}

/// Collect page titles from directory entries, failing on the first unreadable entry.
fn collect_titles<E>(
    entries: impl IntoIterator<Item = std::io::Result<E>>,
    title: impl Fn(&E) -> Option<String>,
) -> std::io::Result<Vec<String>> {
    let mut titles = Vec::new();
    for entry in entries {
        if let Some(t) = title(&entry?) {
            titles.push(t);
        }
    }
    Ok(titles)
}

#[cfg(unix)]
fn create_private_dir(dir: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;

    fs::DirBuilder::new().recursive(true).mode(0o700).create(dir)
}

#[cfg(not(unix))]
fn create_private_dir(dir: &Path) -> std::io::Result<()> {
    fs::create_dir_all(dir)
}

#[cfg(unix)]
fn write_private_file(path: &Path, body: &[u8]) -> std::io::Result<()> {
    use std::os::unix::fs::OpenOptionsExt;

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    file.write_all(body)
}

#[cfg(not(unix))]
fn write_private_file(path: &Path, body: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(path)?;
    file.write_all(body)
}

impl PageStore for FsPageStore {
    fn load(&self, title: &str) -> Result<Page, StorageError> {
        Self::validate_title(title)?;
        let body = fs::read(self.page_file(title))
            .map_err(|e| StorageError::io(e, title).with_backend(BACKEND))?;
        Ok(Page::new(title, body))
    }

    fn save(&self, title: &str, body: &[u8]) -> Result<(), StorageError> {
        Self::validate_title(title)?;
        write_private_file(&self.page_file(title), body)
            .map_err(|e| StorageError::write(e, title).with_backend(BACKEND))?;
        tracing::debug!(title = %title, bytes = body.len(), "Saved page");
        Ok(())
    }

    fn list(&self) -> Result<Vec<String>, StorageError> {
        let entries = fs::read_dir(&self.pages_dir).map_err(|e| {
            StorageError::io(e, self.pages_dir.display().to_string()).with_backend(BACKEND)
        })?;

        collect_titles(entries, Self::title_from_entry).map_err(|e| {
            StorageError::io(e, self.pages_dir.display().to_string()).with_backend(BACKEND)
        })
    }

    fn rename(&self, old_title: &str, new_title: &str) -> Result<RenameStatus, StorageError> {
        Self::validate_title(old_title)?;
        Self::validate_title(new_title)?;

        let old_path = self.page_file(old_title);
        if !old_path.is_file() {
            tracing::debug!(old = %old_title, "Rename source missing, nothing to move");
            return Ok(RenameStatus::Missing);
        }

        // `hard_link` fails with `AlreadyExists` instead of replacing the target.
        let new_path = self.page_file(new_title);
        fs::hard_link(&old_path, &new_path)
            .map_err(|e| StorageError::write(e, new_title).with_backend(BACKEND))?;
        if let Err(e) = fs::remove_file(&old_path) {
            let _ = fs::remove_file(&new_path);
            return Err(StorageError::write(e, old_title).with_backend(BACKEND));
        }
        tracing::info!(old = %old_title, new = %new_title, "Moved page");
        Ok(RenameStatus::Moved)
    }

    fn exists(&self, title: &str) -> bool {
        Self::validate_title(title).is_ok() && self.page_file(title).is_file()
    }
}
