//! Domain error types.

mod certificate_error;
mod image_error;
mod template_error;

pub use certificate_error::CertificateError;
pub use image_error::{ImageError, ImageResult};
pub use template_error::TemplateError;
