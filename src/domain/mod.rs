//! Domain layer with core entities, errors and port definitions.

/// Entity definitions.
pub mod entities;
/// Error types.
pub mod errors;
/// Port definitions.
pub mod ports;

pub use entities::{ImageKey, ImageRequest, ServedImage, TransformParams};
pub use errors::{CertificateError, ImageError, TemplateError};
pub use ports::{CertificatePort, ImageFetchPort, ImageTransformPort, TemplatePort};
