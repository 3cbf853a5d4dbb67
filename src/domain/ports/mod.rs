mod certificate_port;
mod image_cache_port;
mod template_port;

pub use certificate_port::CertificatePort;
pub use image_cache_port::{ImageFetchPort, ImageTransformPort};
pub use template_port::TemplatePort;

#[cfg(test)]
pub mod mocks {
    pub use super::certificate_port::MockCertificatePort;
}
