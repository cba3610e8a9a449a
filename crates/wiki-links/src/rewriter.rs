//! Cross-page link rewriting.
//!
//! After a page moves from one title to another, every other page may still
//! contain markdown links of the form `[display](Old)`. [`LinkRewriter`]
//! scans the store and points those links at the new title, keeping the
//! display text.

use regex::bytes::{Captures, Regex};
use wiki_storage::{PageStore, StorageError};

/// Error raised when a rewrite pass stops partway.
///
/// Pages listed in `rewritten` were already written back and stay rewritten;
/// pages after `title` in the scan were not visited.
#[derive(Debug, thiserror::Error)]
pub enum RewriteError {
    /// The store could not be enumerated; nothing was rewritten.
    #[error("failed to list pages: {0}")]
    List(#[source] StorageError),

    /// Loading or saving one page failed.
    #[error("failed to rewrite links in {title}: {source}")]
    Page {
        /// Page whose load or save failed.
        title: String,
        /// Pages rewritten before the failure.
        rewritten: Vec<String>,
        /// Underlying storage error.
        #[source]
        source: StorageError,
    },
}

/// Summary of a successful rewrite pass.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct RewriteReport {
    /// Pages that were scanned.
    pub scanned: usize,
    /// Pages whose body changed and was written back.
    pub rewritten: Vec<String>,
    /// Total number of links replaced.
    pub links: usize,
}

/// Rewrites `[text](old)` links to `[text](new)` across a page store.
///
/// The old title is matched literally and case-sensitively against the whole
/// link target, so a title containing regex metacharacters only matches
/// itself. Bodies are handled as bytes; non-UTF-8 content passes through.
#[derive(Debug)]
pub struct LinkRewriter {
    new_title: String,
    pattern: Regex,
}

impl LinkRewriter {
    /// Create a rewriter for a rename from `old_title` to `new_title`.
    ///
    /// # Errors
    ///
    /// Returns [`regex::Error`] if the link pattern cannot be compiled. The
    /// title is escaped, so this only happens when it exceeds the regex size
    /// limit.
    pub fn new(old_title: &str, new_title: impl Into<String>) -> Result<Self, regex::Error> {
        let pattern = Regex::new(&format!(r"\[([^\]]*)\]\({}\)", regex::escape(old_title)))?;
        Ok(Self {
            new_title: new_title.into(),
            pattern,
        })
    }

    /// Rewrite links in a single body.
    ///
    /// Returns the new body and the number of replaced links, or `None` when
    /// nothing matched.
    #[must_use]
    pub fn rewrite_body(&self, body: &[u8]) -> Option<(Vec<u8>, usize)> {
        let mut count = 0;
        let replaced = self.pattern.replace_all(body, |caps: &Captures<'_>| {
            count += 1;
            let mut link = Vec::with_capacity(caps[0].len() + self.new_title.len());
            link.push(b'[');
            link.extend_from_slice(&caps[1]);
            link.extend_from_slice(b"](");
            link.extend_from_slice(self.new_title.as_bytes());
            link.push(b')');
            link
        });
        (count > 0).then(|| (replaced.into_owned(), count))
    }

    /// Rewrite links in every page of `store` except the new title's own page.
    ///
    /// Pages are visited in the store's listing order and written back only
    /// when their body changed. Running the pass twice is a no-op the second
    /// time.
    ///
    /// # Errors
    ///
    /// Returns [`RewriteError`] on the first load or save failure. There is
    /// no rollback.
    pub fn rewrite(&self, store: &dyn PageStore) -> Result<RewriteReport, RewriteError> {
        let titles = store.list().map_err(RewriteError::List)?;
        let mut report = RewriteReport::default();

        for title in titles.into_iter().filter(|t| *t != self.new_title) {
            report.scanned += 1;

            let page = match store.load(&title) {
                Ok(page) => page,
                Err(source) => {
                    return Err(RewriteError::Page {
                        title,
                        rewritten: report.rewritten,
                        source,
                    });
                }
            };

            let Some((body, links)) = self.rewrite_body(&page.body) else {
                continue;
            };

            if let Err(source) = store.save(&title, &body) {
                return Err(RewriteError::Page {
                    title,
                    rewritten: report.rewritten,
                    source,
                });
            }

            tracing::debug!(title = %title, links, "Rewrote links");
            report.links += links;
            report.rewritten.push(title);
        }

        tracing::info!(
            new = %self.new_title,
            scanned = report.scanned,
            pages = report.rewritten.len(),
            links = report.links,
            "Link rewrite finished"
        );
        Ok(report)
    }
}
