//! Domain entities.

mod certificate;
mod image;

pub use certificate::{
    CertificateSubject, DEFAULT_COMMON_NAME, DEFAULT_KEY_BITS, DEFAULT_VALIDITY_YEARS,
};
pub use image::{
    ColorMode, FULL_OPACITY, FetchRequest, ImageKey, ImageRequest, ImageSource, ServedImage,
    TransformParams,
};
