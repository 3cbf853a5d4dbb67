//! Image cache error types.

use thiserror::Error;

/// Result type for image cache operations.
pub type ImageResult<T> = std::result::Result<T, ImageError>;

/// Image cache error variants.
#[derive(Debug, Clone, Error)]
#[allow(missing_docs)]
pub enum ImageError {
    #[error("failed to fetch {url}: {message}")]
    Fetch { url: String, message: String },

    #[error("failed to write {path}: {message}")]
    Write { path: String, message: String },

    #[error("failed to transform image: {message}")]
    Transform { message: String },

    #[error("image processing is not available: {message}")]
    CapabilityMissing { message: String },
}

impl ImageError {
    /// Creates fetch error.
    #[must_use]
    pub fn fetch(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Fetch {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Creates write error.
    #[must_use]
    pub fn write(path: &std::path::Path, message: impl Into<String>) -> Self {
        Self::Write {
            path: path.display().to_string(),
            message: message.into(),
        }
    }

    /// Creates transform error.
    #[must_use]
    pub fn transform(message: impl Into<String>) -> Self {
        Self::Transform {
            message: message.into(),
        }
    }

    /// Creates capability missing error.
    #[must_use]
    pub fn capability_missing(message: impl Into<String>) -> Self {
        Self::CapabilityMissing {
            message: message.into(),
        }
    }
}
