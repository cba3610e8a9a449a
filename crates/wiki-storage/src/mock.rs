//! Mock page store for testing.
//!
//! Provides [`MockPageStore`] for unit testing without filesystem access.

use std::collections::{BTreeMap, HashSet};
use std::sync::RwLock;

use crate::storage::{Page, PageStore, RenameStatus, StorageError, StorageErrorKind};

/// Backend identifier for error messages.
const BACKEND: &str = "Mock";

/// In-memory page store for testing.
///
/// Pages are kept in title order, so [`PageStore::list`] is deterministic.
/// Use the builder methods to seed pages and inject write failures.
///
/// # Example
///
/// ```
/// use wiki_storage::{MockPageStore, PageStore};
///
/// let store = MockPageStore::new()
///     .with_page("Home", "See [there](OldName)")
///     .with_page("OldName", "content");
///
/// assert_eq!(store.list().unwrap(), vec!["Home", "OldName"]);
/// ```
#[derive(Debug, Default)]
pub struct MockPageStore {
    pages: RwLock<BTreeMap<String, Vec<u8>>>,
    failing_saves: RwLock<HashSet<String>>,
}

impl MockPageStore {
    /// Create a new empty mock store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a page.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_page(self, title: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        self.pages.write().unwrap().insert(title.into(), body.into());
        self
    }

    /// Make every save of `title` fail with [`StorageErrorKind::PermissionDenied`].
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_failing_save(self, title: impl Into<String>) -> Self {
        self.failing_saves.write().unwrap().insert(title.into());
        self
    }

    /// Raw body of a page, bypassing the trait.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn body(&self, title: &str) -> Option<Vec<u8>> {
        self.pages.read().unwrap().get(title).cloned()
    }
}

impl PageStore for MockPageStore {
    fn load(&self, title: &str) -> Result<Page, StorageError> {
        self.pages
            .read()
            .unwrap()
            .get(title)
            .map(|body| Page::new(title, body.clone()))
            .ok_or_else(|| StorageError::not_found(title).with_backend(BACKEND))
    }

    fn save(&self, title: &str, body: &[u8]) -> Result<(), StorageError> {
        if self.failing_saves.read().unwrap().contains(title) {
            return Err(StorageError::new(StorageErrorKind::PermissionDenied)
                .with_title(title)
                .with_backend(BACKEND));
        }
        self.pages
            .write()
            .unwrap()
            .insert(title.to_owned(), body.to_vec());
        Ok(())
    }

    fn list(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.pages.read().unwrap().keys().cloned().collect())
    }

    fn rename(&self, old_title: &str, new_title: &str) -> Result<RenameStatus, StorageError> {
        let mut pages = self.pages.write().unwrap();
        if !pages.contains_key(old_title) {
            return Ok(RenameStatus::Missing);
        }
        if pages.contains_key(new_title) {
            return Err(StorageError::already_exists(new_title).with_backend(BACKEND));
        }
        if let Some(body) = pages.remove(old_title) {
            pages.insert(new_title.to_owned(), body);
        }
        Ok(RenameStatus::Moved)
    }

    fn exists(&self, title: &str) -> bool {
        self.pages.read().unwrap().contains_key(title)
    }
}
