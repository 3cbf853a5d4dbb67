//! Infrastructure layer with adapters for external capabilities.

/// Application configuration.
pub mod config;
/// Image handling (disk cache, fetching, transforms).
pub mod image;
/// Theme template rendering.
pub mod templates;
/// Self-signed certificate generation.
pub mod tls;

pub use config::{AppConfig, CliArgs, Command, ConfigError, LogLevel, StorageManager};
pub use self::image::{
    DisabledTransformer, DiskImageCache, HttpImageFetcher, ImageService, KeyLocks, RasterTransformer,
};
pub use templates::HandlebarsTheme;
pub use tls::RcgenCertificateBackend;
