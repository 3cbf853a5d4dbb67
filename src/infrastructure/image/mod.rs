//! Image handling infrastructure.
//!
//! This module provides:
//! - Flat disk caching of originals and derived variants
//! - HTTP downloading of originals
//! - CPU image transforms (resize, opacity, color mode)
//! - Per-key locking so one task works on a cache file at a time
//! - The `ImageService` orchestrating all of the above

pub mod disk_cache;
pub mod fetcher;
pub mod key_lock;
pub mod service;
pub mod transformer;

pub use disk_cache::DiskImageCache;
pub use fetcher::{DEFAULT_TIMEOUT_SECS, HttpImageFetcher, NO_CACHE};
pub use key_lock::KeyLocks;
pub use service::ImageService;
pub use transformer::{
    DEFAULT_JPEG_QUALITY, DEFAULT_MAX_PIXELS, DisabledTransformer, RasterTransformer, output_format,
};
