//! Certificate generation error types.

use thiserror::Error;

/// Certificate error variants.
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum CertificateError {
    #[error("certificate generation is not available: {0}")]
    CapabilityMissing(String),

    #[error("failed to generate {what}: {message}")]
    Generation { what: &'static str, message: String },

    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl CertificateError {
    /// Creates key generation error.
    #[must_use]
    pub fn key(message: impl Into<String>) -> Self {
        Self::Generation {
            what: "private key",
            message: message.into(),
        }
    }

    /// Creates certificate generation error.
    #[must_use]
    pub fn certificate(message: impl Into<String>) -> Self {
        Self::Generation {
            what: "certificate",
            message: message.into(),
        }
    }
}
