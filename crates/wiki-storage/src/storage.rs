//! Page store trait and error types.
//!
//! Provides the core [`PageStore`] trait for reading, writing, listing and
//! renaming pages, along with [`StorageError`] for unified error handling
//! across backends.
//!
//! # Title Convention
//!
//! Every method takes a page **title**, not a file path. The title is the
//! page's identity: backends derive their storage key from it (the
//! filesystem backend uses `<pages_dir>/<title>.txt`).

/// A wiki page: title plus raw stored body.
///
/// The body is kept as bytes so content round-trips unchanged even when it is
/// not valid UTF-8. It is interpreted as markdown only when rendered.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Page {
    /// Page title (also the storage key).
    pub title: String,
    /// Raw page body.
    pub body: Vec<u8>,
}

impl Page {
    /// Create a page from a title and body.
    #[must_use]
    pub fn new(title: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }

    /// Body as text, replacing invalid UTF-8 sequences.
    #[must_use]
    pub fn body_text(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

/// Result of a storage-level rename.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenameStatus {
    /// The old page existed and was moved to the new title.
    Moved,
    /// The old page did not exist; nothing was moved.
    Missing,
}

/// Semantic error categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum StorageErrorKind {
    /// Page does not exist.
    NotFound,
    /// Permission denied.
    PermissionDenied,
    /// Title is empty or escapes the page directory.
    InvalidTitle,
    /// A page already exists under the target title.
    AlreadyExists,
    /// Other I/O failure.
    Other,
}

/// Storage error with semantic kind and backend-specific source.
#[derive(Debug)]
pub struct StorageError {
    /// Semantic error category.
    pub kind: StorageErrorKind,
    /// Title context (if applicable).
    pub title: Option<String>,
    /// Backend identifier (e.g., "Fs", "Mock").
    pub backend: Option<&'static str>,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl StorageError {
    /// Create a new storage error.
    #[must_use]
    pub fn new(kind: StorageErrorKind) -> Self {
        Self {
            kind,
            title: None,
            backend: None,
            source: None,
        }
    }

    /// Attach title context.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Attach backend identifier.
    #[must_use]
    pub fn with_backend(mut self, backend: &'static str) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Attach the underlying error source.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Downcast the source error to a concrete type.
    #[must_use]
    pub fn downcast_source<E: std::error::Error + 'static>(&self) -> Option<&E> {
        self.source.as_ref()?.downcast_ref()
    }

    /// Create a not found error for a title.
    #[must_use]
    pub fn not_found(title: impl Into<String>) -> Self {
        Self::new(StorageErrorKind::NotFound).with_title(title)
    }

    /// Create an invalid title error.
    #[must_use]
    pub fn invalid_title(title: impl Into<String>) -> Self {
        Self::new(StorageErrorKind::InvalidTitle).with_title(title)
    }

    /// Create an error for a title that is already taken.
    #[must_use]
    pub fn already_exists(title: impl Into<String>) -> Self {
        Self::new(StorageErrorKind::AlreadyExists).with_title(title)
    }

    /// Create a storage error from an I/O error raised while reading.
    #[must_use]
    pub fn io(err: std::io::Error, title: impl Into<String>) -> Self {
        let kind = match err.kind() {
            std::io::ErrorKind::NotFound => StorageErrorKind::NotFound,
            std::io::ErrorKind::PermissionDenied => StorageErrorKind::PermissionDenied,
            _ => StorageErrorKind::Other,
        };
        Self::new(kind).with_title(title).with_source(err)
    }

    /// Create a storage error from an I/O error raised while writing.
    ///
    /// A missing parent directory is a write failure, not a missing page, so
    /// `NotFound` is reported as [`StorageErrorKind::Other`].
    #[must_use]
    pub fn write(err: std::io::Error, title: impl Into<String>) -> Self {
        let kind = match err.kind() {
            std::io::ErrorKind::PermissionDenied => StorageErrorKind::PermissionDenied,
            std::io::ErrorKind::AlreadyExists => StorageErrorKind::AlreadyExists,
            _ => StorageErrorKind::Other,
        };
        Self::new(kind).with_title(title).with_source(err)
    }

    /// True if the page does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.kind == StorageErrorKind::NotFound
    }
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Format: "[Backend] Kind: message (title: Foo)"
        if let Some(backend) = self.backend {
            write!(f, "[{backend}] ")?;
        }

        let kind_str = match self.kind {
            StorageErrorKind::NotFound => "Not found",
            StorageErrorKind::PermissionDenied => "Permission denied",
            StorageErrorKind::InvalidTitle => "Invalid title",
            StorageErrorKind::AlreadyExists => "Already exists",
            StorageErrorKind::Other => "Error",
        };

        write!(f, "{kind_str}")?;

        if let Some(source) = &self.source {
            write!(f, ": {source}")?;
        }

        if let Some(title) = &self.title {
            write!(f, " (title: {title})")?;
        }

        Ok(())
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|s| s.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Page storage abstraction.
///
/// Implementations own the mapping from titles to their storage format. There
/// is no caching contract: every call observes the backend's current state.
/// Concurrent mutation is not coordinated here; callers that need a single
/// writer serialise calls themselves.
pub trait PageStore: Send + Sync {
    /// Load a page.
    ///
    /// # Errors
    ///
    /// Returns [`StorageErrorKind::NotFound`] if no page exists for `title`,
    /// another kind for any other read failure.
    fn load(&self, title: &str) -> Result<Page, StorageError>;

    /// Create or overwrite a page.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the page cannot be written. Never reports
    /// [`StorageErrorKind::NotFound`].
    fn save(&self, title: &str, body: &[u8]) -> Result<(), StorageError>;

    /// List the titles of all pages.
    ///
    /// The order is backend-defined and not guaranteed to be sorted.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the store cannot be enumerated.
    fn list(&self) -> Result<Vec<String>, StorageError>;

    /// Move a page to a new title.
    ///
    /// A missing source page is not an error: nothing is moved and
    /// [`RenameStatus::Missing`] is returned. An existing page under
    /// `new_title` is never replaced.
    ///
    /// # Errors
    ///
    /// Returns [`StorageErrorKind::AlreadyExists`] if `new_title` is taken,
    /// another kind if the move itself fails.
    fn rename(&self, old_title: &str, new_title: &str) -> Result<RenameStatus, StorageError>;

    /// Check whether a page exists.
    ///
    /// Returns `false` on errors (treats errors as "doesn't exist").
    fn exists(&self, title: &str) -> bool;
}
