//! Page storage abstraction for the flat-file wiki.
//!
//! This crate provides a [`PageStore`] trait for abstracting page persistence
//! from the underlying backend. This enables:
//!
//! - **Unit testing** without touching the real filesystem
//! - **Clean separation** between link rewriting, HTTP handlers and I/O
//!
//! # Architecture
//!
//! The crate provides:
//! - [`PageStore`] trait with `load()`, `save()`, `list()`, `rename()` and `exists()`
//! - [`StorageError`] with a semantic [`StorageErrorKind`]
//! - [`MockPageStore`] for testing (behind `mock` feature flag)
//!
//! The filesystem backend lives in the `wiki-storage-fs` crate.
//!
//! # Example
//!
//! ```ignore
//! use wiki_storage::PageStore;
//! use wiki_storage_fs::FsPageStore;
//!
//! let store = FsPageStore::open("pages")?;
//! store.save("FrontPage", b"Welcome")?;
//! for title in store.list()? {
//!     println!("{title}");
//! }
//! ```

#[cfg(feature = "mock")]
mod mock;
mod storage;

#[cfg(feature = "mock")]
pub use mock::MockPageStore;
pub use storage::{Page, PageStore, RenameStatus, StorageError, StorageErrorKind};
