//! Handlebars templates loaded from the active theme directory.

use std::path::{Component, Path, PathBuf};

use handlebars::Handlebars;
use tracing::trace;

use crate::domain::errors::TemplateError;
use crate::domain::ports::TemplatePort;

/// Renders `<run_dir>/interfaces/<theme>/html/<name>`.
///
/// Templates are read on every render so edits show up without a restart.
pub struct HandlebarsTheme {
    html_dir: PathBuf,
    registry: Handlebars<'static>,
}

impl std::fmt::Debug for HandlebarsTheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlebarsTheme")
            .field("html_dir", &self.html_dir)
            .finish_non_exhaustive()
    }
}

impl HandlebarsTheme {
    /// Creates a renderer for `theme` under `run_dir`.
    #[must_use]
    pub fn new(run_dir: &Path, theme: &str) -> Self {
        Self::with_dir(run_dir.join("interfaces").join(theme).join("html"))
    }

    /// Creates a renderer reading templates straight from `html_dir`.
    #[must_use]
    pub fn with_dir(html_dir: PathBuf) -> Self {
        Self {
            html_dir,
            registry: Handlebars::new(),
        }
    }

    /// Returns the directory templates are read from.
    #[must_use]
    pub fn html_dir(&self) -> &Path {
        &self.html_dir
    }

    fn not_found(&self, name: &str) -> TemplateError {
        TemplateError::NotFound {
            name: name.to_string(),
            dir: self.html_dir.display().to_string(),
        }
    }
}

impl TemplatePort for HandlebarsTheme {
    fn render(&self, name: &str, context: &serde_json::Value) -> Result<String, TemplateError> {
        let relative = Path::new(name);
        if !relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
        {
            return Err(self.not_found(name));
        }

        let path = self.html_dir.join(relative);
        let source = std::fs::read_to_string(&path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => self.not_found(name),
            _ => TemplateError::Render {
                name: name.to_string(),
                message: format!("cannot read {}: {e}", path.display()),
            },
        })?;

        trace!(template = name, path = %path.display(), "Rendering template");

        self.registry
            .render_template(&source, context)
            .map_err(|e| TemplateError::Render {
                name: name.to_string(),
                message: e.to_string(),
            })
    }
}
