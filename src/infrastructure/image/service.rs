//! Image cache orchestrator.
//!
//! Serves originals from disk or the network and derived variants from disk
//! or the transformer. Failures degrade to the original, the placeholder, or
//! nothing; they never reach the caller as errors.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, trace, warn};

use crate::domain::entities::{ImageKey, ImageRequest, ImageSource, ServedImage, TransformParams};
use crate::domain::errors::{ImageError, ImageResult};
use crate::domain::ports::{ImageFetchPort, ImageTransformPort};
use crate::infrastructure::config::AppConfig;

use super::disk_cache::DiskImageCache;
use super::fetcher::HttpImageFetcher;
use super::key_lock::KeyLocks;
use super::transformer::{DisabledTransformer, RasterTransformer};

/// Fetches, caches and transforms images for the web UI.
pub struct ImageService {
    cache: DiskImageCache,
    fetcher: Arc<dyn ImageFetchPort>,
    transformer: Arc<dyn ImageTransformPort>,
    transforms_available: bool,
    placeholder: PathBuf,
    locks: KeyLocks,
}

impl std::fmt::Debug for ImageService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageService")
            .field("cache", &self.cache)
            .field("transforms_available", &self.transforms_available)
            .field("placeholder", &self.placeholder)
            .finish_non_exhaustive()
    }
}

impl ImageService {
    /// Creates a service over the given cache and capabilities.
    ///
    /// The transformer's availability is checked once, here.
    pub fn new(
        cache: DiskImageCache,
        fetcher: Arc<dyn ImageFetchPort>,
        transformer: Arc<dyn ImageTransformPort>,
        placeholder: PathBuf,
    ) -> Self {
        let transforms_available = transformer.is_available();
        if !transforms_available {
            warn!("Image processing is unavailable, transforms will be skipped");
        }

        Self {
            cache,
            fetcher,
            transformer,
            transforms_available,
            placeholder,
            locks: KeyLocks::new(),
        }
    }

    /// Creates a service from application configuration.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created.
    pub fn from_config(config: &AppConfig) -> ImageResult<Self> {
        let fetcher = HttpImageFetcher::new(Duration::from_secs(config.images.timeout_secs))?;
        let transformer: Arc<dyn ImageTransformPort> = if config.images.enable_transforms {
            Arc::new(
                RasterTransformer::new(config.images.jpeg_quality)
                    .with_max_pixels(config.images.max_pixels),
            )
        } else {
            Arc::new(DisabledTransformer)
        };

        Ok(Self::new(
            DiskImageCache::new(config.images_dir()),
            Arc::new(fetcher),
            transformer,
            config.placeholder_path(),
        ))
    }

    /// Returns the underlying disk cache.
    #[must_use]
    pub const fn cache(&self) -> &DiskImageCache {
        &self.cache
    }

    /// Returns true if derived variants can be produced.
    #[must_use]
    pub const fn transforms_available(&self) -> bool {
        self.transforms_available
    }

    /// Returns the image for `request`, downloading and transforming as needed.
    ///
    /// Returns `None` when no usable image exists: the download failed, or
    /// the served file is not a recognised image.
    pub async fn get_image(&self, request: &ImageRequest) -> Option<ServedImage> {
        let url = request.fetch.url.as_str();

        if let Err(e) = self.cache.ensure_dir().await {
            error!(error = %e, "Cannot prepare image directory");
            return None;
        }

        let key = ImageKey::from_url(url);
        let original = self.cache.original_path(&key);

        if let Err(e) = self.ensure_original(&key, &original, request).await {
            error!(url, error = %e, "Failed to download image");
            return None;
        }

        let params = &request.params;
        let (path, source) = if !params.requires_transform() {
            (original, ImageSource::Original)
        } else if self.transforms_available {
            let derived = self.cache.derived_path(&key, params);
            match self.ensure_variant(&key, &original, params, &derived).await {
                Ok(()) => (derived, ImageSource::Variant),
                Err(e) => {
                    debug!(url, error = %e, "Returning original image");
                    (original, ImageSource::Original)
                }
            }
        } else {
            error!(url, "Can't transform image, image processing is unavailable");
            if params.wants_blend() {
                (self.placeholder.clone(), ImageSource::Placeholder)
            } else {
                (original, ImageSource::Original)
            }
        };

        self.serve(path, source).await
    }

    async fn ensure_original(
        &self,
        key: &ImageKey,
        path: &Path,
        request: &ImageRequest,
    ) -> ImageResult<()> {
        let _guard = self.locks.acquire(key.as_str()).await;

        if self.cache.contains(path).await {
            trace!(key = %key, "Original already cached");
            return Ok(());
        }

        debug!(
            url = %request.fetch.url,
            path = %path.display(),
            "No local image found, downloading"
        );
        let bytes = self.fetcher.fetch(&request.fetch).await?;
        self.cache.store(path, &bytes).await
    }

    async fn ensure_variant(
        &self,
        key: &ImageKey,
        original: &Path,
        params: &TransformParams,
        derived: &Path,
    ) -> ImageResult<()> {
        let _guard = self.locks.acquire(&key.derived_name(params)).await;

        if self.cache.contains(derived).await {
            trace!(path = %derived.display(), "Derived image already cached");
            return Ok(());
        }

        let transformer = self.transformer.clone();
        let source = original.to_path_buf();
        let dest = derived.to_path_buf();
        let params = params.clone();

        tokio::task::spawn_blocking(move || transformer.transform(&source, &params, &dest))
            .await
            .map_err(|e| ImageError::transform(format!("transform task panicked: {e}")))??;
        Ok(())
    }

    async fn serve(&self, path: PathBuf, source: ImageSource) -> Option<ServedImage> {
        let Some(bytes) = self.cache.read(&path).await else {
            warn!(path = %path.display(), %source, "Image file is missing");
            return None;
        };

        let Ok(format) = image::guess_format(&bytes) else {
            warn!(path = %path.display(), %source, "File is not a recognised image");
            return None;
        };

        Some(ServedImage {
            path,
            bytes,
            content_type: format.to_mime_type().to_string(),
            source,
        })
    }
}
