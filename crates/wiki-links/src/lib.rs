//! Page rename and cross-page link rewriting for the wiki.
//!
//! Renaming a page is a two-step, non-transactional operation over a
//! [`PageStore`](wiki_storage::PageStore):
//!
//! 1. Move the page file to its new title (skipped if the page is missing).
//! 2. Rewrite `[text](Old)` links to `[text](New)` in every other page.
//!
//! ```text
//! Requested ──► OldExists ──► move ──┐
//!          └──► OldMissing ──────────┴──► LinksRewritten ──► caller redirects
//! ```
//!
//! A failure in either step is returned as-is; work already done stays done.
//!
//! # Example
//!
//! ```
//! use wiki_links::{RenameOutcome, rename_page};
//! use wiki_storage::{MockPageStore, PageStore};
//!
//! let store = MockPageStore::new()
//!     .with_page("Home", "See [there](OldName)")
//!     .with_page("OldName", "content");
//!
//! let result = rename_page(&store, "OldName", "NewName").unwrap();
//!
//! assert_eq!(result.outcome, RenameOutcome::Moved);
//! assert_eq!(store.load("Home").unwrap().body, b"See [there](NewName)");
//! ```

mod rename;
mod rewriter;

pub use rename::{RenameError, RenameOutcome, RenameResult, rename_page};
pub use rewriter::{LinkRewriter, RewriteError, RewriteReport};
