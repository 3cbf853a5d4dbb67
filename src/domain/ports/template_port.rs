//! Port for theme template rendering.

use crate::domain::errors::TemplateError;

/// Renders named templates from the active theme.
pub trait TemplatePort: Send + Sync {
    /// Renders template `name` with `context`.
    ///
    /// # Errors
    /// Returns error if the template is missing or fails to render.
    fn render(&self, name: &str, context: &serde_json::Value) -> Result<String, TemplateError>;
}
