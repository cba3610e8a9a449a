//! Page templates.
//!
//! Three templates drive the UI: `view.html` (rendered markdown),
//! `edit.html` (raw body in a textarea) and `all.html` (title index).
//! Built-in copies are compiled into the binary. When a template directory is
//! configured, templates are read from disk on every render so edits apply
//! without a restart, and a missing file is a render error.

use std::path::PathBuf;

use minijinja::Environment;
use serde::Serialize;

/// Template for viewing a page.
pub(crate) const VIEW: &str = "view.html";
/// Template for editing a page.
pub(crate) const EDIT: &str = "edit.html";
/// Template for the page index.
pub(crate) const ALL: &str = "all.html";

const BUILTIN: [(&str, &str); 3] = [
    (VIEW, include_str!("../templates/view.html")),
    (EDIT, include_str!("../templates/edit.html")),
    (ALL, include_str!("../templates/all.html")),
];

/// Template failure.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    /// Template file could not be read.
    #[error("open {}: {source}", .path.display())]
    Read {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Template failed to parse or render.
    #[error("template {name}: {source}")]
    Render {
        /// Template name.
        name: String,
        /// Underlying template error.
        #[source]
        source: minijinja::Error,
    },
}

/// Template source: built-in or a directory read on demand.
pub(crate) struct Templates {
    env: Environment<'static>,
    dir: Option<PathBuf>,
}

impl Templates {
    /// Built-in templates.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::Render`] if a built-in template fails to parse.
    pub(crate) fn builtin() -> Result<Self, TemplateError> {
        let mut env = Environment::new();
        for (name, source) in BUILTIN {
            env.add_template(name, source)
                .map_err(|source| TemplateError::Render {
                    name: name.to_owned(),
                    source,
                })?;
        }
        Ok(Self { env, dir: None })
    }

    /// Templates read from `dir` at render time.
    pub(crate) fn from_dir(dir: PathBuf) -> Self {
        Self {
            env: Environment::new(),
            dir: Some(dir),
        }
    }

    /// Built-in templates, or directory templates when `dir` is set.
    pub(crate) fn new(dir: Option<PathBuf>) -> Result<Self, TemplateError> {
        match dir {
            Some(dir) => Ok(Self::from_dir(dir)),
            None => Self::builtin(),
        }
    }

    /// Render a template to a complete string.
    ///
    /// Output is only returned once rendering succeeded, so a failing template
    /// never leaks partial output into a response.
    pub(crate) fn render<S: Serialize>(&self, name: &str, ctx: S) -> Result<String, TemplateError> {
        let render_err = |source| TemplateError::Render {
            name: name.to_owned(),
            source,
        };

        match &self.dir {
            Some(dir) => {
                let path = dir.join(name);
                let source = std::fs::read_to_string(&path)
                    .map_err(|source| TemplateError::Read { path, source })?;
                self.env
                    .render_named_str(name, &source, ctx)
                    .map_err(render_err)
            }
            None => self
                .env
                .get_template(name)
                .and_then(|t| t.render(ctx))
                .map_err(render_err),
        }
    }
}
