//! Markdown renderer.

use pulldown_cmark::{Event, Options, Parser, html};

/// Markdown to HTML renderer.
#[derive(Debug, Clone, Copy)]
pub struct MarkdownRenderer {
    gfm: bool,
    raw_html: bool,
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownRenderer {
    /// Create a new renderer with GFM enabled and raw HTML escaped.
    #[must_use]
    pub fn new() -> Self {
        Self {
            gfm: true,
            raw_html: false,
        }
    }

    /// Enable or disable GitHub Flavored Markdown features.
    ///
    /// GFM is enabled by default. When enabled, the parser supports:
    /// - Tables
    /// - Strikethrough (`~~text~~`)
    /// - Task lists (`- [ ] item`)
    /// - Alert blockquotes (`> [!NOTE]`)
    #[must_use]
    pub fn with_gfm(mut self, enabled: bool) -> Self {
        self.gfm = enabled;
        self
    }

    /// Pass raw HTML blocks and inline tags through unescaped.
    ///
    /// Off by default.
    #[must_use]
    pub fn with_raw_html(mut self, enabled: bool) -> Self {
        self.raw_html = enabled;
        self
    }

    /// Get parser options based on GFM configuration.
    #[must_use]
    pub fn parser_options(&self) -> Options {
        if self.gfm {
            Options::ENABLE_TABLES
                | Options::ENABLE_STRIKETHROUGH
                | Options::ENABLE_TASKLISTS
                | Options::ENABLE_GFM
        } else {
            Options::empty()
        }
    }

    /// Render markdown text to an HTML fragment.
    #[must_use]
    pub fn render(&self, markdown: &str) -> String {
        let raw_html = self.raw_html;
        let events = Parser::new_ext(markdown, self.parser_options()).map(move |event| match event {
            Event::Html(text) | Event::InlineHtml(text) if !raw_html => Event::Text(text),
            other => other,
        });

        let mut output = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut output, events);
        output
    }
}

/// Render markdown with the default renderer.
#[must_use]
pub fn render_markdown(markdown: &str) -> String {
    MarkdownRenderer::new().render(markdown)
}
