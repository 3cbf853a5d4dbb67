//! Port definitions for fetching and transforming images.

use std::path::{Path, PathBuf};

use bytes::Bytes;

use crate::domain::entities::{FetchRequest, TransformParams};
use crate::domain::errors::ImageResult;

/// Port for downloading original images.
/// Implementations must be thread-safe.
#[async_trait::async_trait]
pub trait ImageFetchPort: Send + Sync {
    /// Downloads the body of `request.url`.
    /// Non-success statuses are errors.
    async fn fetch(&self, request: &FetchRequest) -> ImageResult<Bytes>;
}

/// Port for the optional image-processing capability.
///
/// `transform` is CPU-bound and blocking; callers run it off the async runtime.
pub trait ImageTransformPort: Send + Sync {
    /// Returns false when this build or configuration cannot process images.
    fn is_available(&self) -> bool;

    /// Reads `source`, applies `params` and writes the result to `dest`.
    ///
    /// # Errors
    /// Returns error if the source cannot be decoded, the mode is unsupported,
    /// or the result cannot be encoded or written.
    fn transform(
        &self,
        source: &Path,
        params: &TransformParams,
        dest: &Path,
    ) -> ImageResult<PathBuf>;
}
