//! Template rendering error types.

use thiserror::Error;

/// Template error variants.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// The named template does not exist in the theme.
    #[error("template {name} not found in {dir}")]
    NotFound {
        /// Requested template name.
        name: String,
        /// Directory that was searched.
        dir: String,
    },

    /// The template exists but could not be compiled or rendered.
    #[error("failed to render {name}: {message}")]
    Render {
        /// Requested template name.
        name: String,
        /// Engine error description.
        message: String,
    },
}
