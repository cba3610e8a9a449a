//! Markdown to HTML rendering for wiki pages.
//!
//! Wraps `pulldown-cmark` with the options the wiki uses: GitHub Flavored
//! Markdown extensions on by default, and raw HTML in page bodies rendered as
//! text so stored content cannot inject markup into the page.
//!
//! # Example
//!
//! ```
//! use wiki_renderer::MarkdownRenderer;
//!
//! let html = MarkdownRenderer::new().render("See [there](NewName)");
//! assert_eq!(html, "<p>See <a href=\"NewName\">there</a></p>\n");
//! ```

mod renderer;

pub use renderer::{MarkdownRenderer, render_markdown};
