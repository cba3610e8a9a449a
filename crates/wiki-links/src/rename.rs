//! Page rename orchestration.

use wiki_storage::{PageStore, RenameStatus, StorageError};

use crate::rewriter::{LinkRewriter, RewriteError, RewriteReport};

/// What happened to the renamed page.
///
/// Decides where the caller is sent next: a moved page has content to view,
/// a missing one only has an editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenameOutcome {
    /// The page existed and now lives under the new title.
    Moved,
    /// There was no page under the old title; only links were rewritten.
    Missing,
}

/// Result of a completed rename.
#[derive(Debug, PartialEq, Eq)]
pub struct RenameResult {
    /// Whether the page itself was moved.
    pub outcome: RenameOutcome,
    /// Link rewrite summary.
    pub links: RewriteReport,
}

/// Rename failure.
#[derive(Debug, thiserror::Error)]
pub enum RenameError {
    /// The requested titles cannot describe a rename.
    #[error("invalid rename from {old:?} to {new:?}: {reason}")]
    InvalidTitle {
        /// Old title as given.
        old: String,
        /// New title as given.
        new: String,
        /// Why the pair was refused.
        reason: &'static str,
    },

    /// The link pattern for the old title could not be built; nothing was
    /// touched.
    #[error("failed to build link pattern: {0}")]
    Pattern(#[source] regex::Error),

    /// Moving the page file failed; no links were touched.
    #[error("failed to move page: {0}")]
    Move(#[source] StorageError),

    /// The page moved but the link rewrite stopped partway.
    #[error(transparent)]
    Rewrite(#[from] RewriteError),
}

/// Rename a page and rewrite links pointing at it.
///
/// When the old page exists it is moved first, then links are rewritten
/// across the store. When it does not exist, the move is skipped and links
/// are still rewritten, which cleans up dangling references. Renaming a page
/// to its own title changes nothing.
///
/// # Errors
///
/// Returns [`RenameError::InvalidTitle`] for an empty new title,
/// [`RenameError::Pattern`] if the old title cannot be matched,
/// [`RenameError::Move`] if the move fails (including when a page already
/// exists under the new title) and [`RenameError::Rewrite`] if link
/// rewriting fails. A failed rewrite does not undo the move.
pub fn rename_page(
    store: &dyn PageStore,
    old_title: &str,
    new_title: &str,
) -> Result<RenameResult, RenameError> {
    if new_title.is_empty() {
        return Err(RenameError::InvalidTitle {
            old: old_title.to_owned(),
            new: new_title.to_owned(),
            reason: "new title is empty",
        });
    }

    if old_title == new_title {
        let outcome = if store.exists(old_title) {
            RenameOutcome::Moved
        } else {
            RenameOutcome::Missing
        };
        tracing::debug!(title = %old_title, "Rename to same title, nothing to do");
        return Ok(RenameResult {
            outcome,
            links: RewriteReport::default(),
        });
    }

    let rewriter = LinkRewriter::new(old_title, new_title).map_err(RenameError::Pattern)?;

    let outcome = match store.rename(old_title, new_title).map_err(RenameError::Move)? {
        RenameStatus::Moved => RenameOutcome::Moved,
        RenameStatus::Missing => {
            tracing::info!(old = %old_title, new = %new_title, "Renaming missing page, rewriting links only");
            RenameOutcome::Missing
        }
    };

    let links = rewriter.rewrite(store)?;

    Ok(RenameResult { outcome, links })
}
