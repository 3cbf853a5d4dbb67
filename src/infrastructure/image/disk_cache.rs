//! Flat on-disk store for original and derived images.
//!
//! Existence of a file is the whole cache state: there is no expiry, size
//! bound or eviction. Entries live until something outside this crate
//! deletes them.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, trace, warn};

use crate::domain::entities::{ImageKey, TransformParams};
use crate::domain::errors::{ImageError, ImageResult};

/// Disk-based image cache rooted at a single directory.
#[derive(Debug, Clone)]
pub struct DiskImageCache {
    cache_dir: PathBuf,
}

impl DiskImageCache {
    /// Creates a cache handle for `cache_dir`. The directory is created lazily.
    #[must_use]
    pub fn new(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    /// Returns the cache directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Creates the cache directory if it is missing.
    ///
    /// # Errors
    /// Returns error if the directory cannot be created.
    pub async fn ensure_dir(&self) -> ImageResult<()> {
        if fs::try_exists(&self.cache_dir).await.unwrap_or(false) {
            return Ok(());
        }
        debug!(path = %self.cache_dir.display(), "Creating image directory");
        fs::create_dir_all(&self.cache_dir)
            .await
            .map_err(|e| ImageError::write(&self.cache_dir, format!("create dir: {e}")))
    }

    /// Returns the path of the cached original for `key`.
    #[must_use]
    pub fn original_path(&self, key: &ImageKey) -> PathBuf {
        self.cache_dir.join(key.as_str())
    }

    /// Returns the path of the derived variant of `key` for `params`.
    #[must_use]
    pub fn derived_path(&self, key: &ImageKey, params: &TransformParams) -> PathBuf {
        self.cache_dir.join(key.derived_name(params))
    }

    /// Checks if a cache file exists.
    pub async fn contains(&self, path: &Path) -> bool {
        fs::metadata(path).await.is_ok_and(|m| m.is_file())
    }

    /// Reads a cache file.
    pub async fn read(&self, path: &Path) -> Option<Bytes> {
        match fs::read(path).await {
            Ok(bytes) => {
                trace!(path = %path.display(), "Disk cache hit");
                Some(Bytes::from(bytes))
            }
            Err(e) => {
                trace!(path = %path.display(), error = %e, "Disk cache miss");
                None
            }
        }
    }

    /// Stores bytes at `path` atomically.
    ///
    /// The data is written to a unique sibling first and renamed into place,
    /// so readers never see a partially written file.
    ///
    /// # Errors
    /// Returns error if the file cannot be created, written or renamed.
    pub async fn store(&self, path: &Path, bytes: &[u8]) -> ImageResult<()> {
        let tmp = temp_sibling(path);

        let result = async {
            let mut file = fs::File::create(&tmp)
                .await
                .map_err(|e| ImageError::write(&tmp, format!("create: {e}")))?;
            file.write_all(bytes)
                .await
                .map_err(|e| ImageError::write(&tmp, format!("write: {e}")))?;
            file.flush()
                .await
                .map_err(|e| ImageError::write(&tmp, format!("flush: {e}")))?;
            drop(file);
            fs::rename(&tmp, path)
                .await
                .map_err(|e| ImageError::write(path, format!("rename: {e}")))
        }
        .await;

        if result.is_err() && fs::remove_file(&tmp).await.is_err() {
            warn!(path = %tmp.display(), "Failed to remove partial cache file");
        }
        result?;

        debug!(path = %path.display(), size = bytes.len(), "Stored image in disk cache");
        Ok(())
    }
}

/// Returns a unique temporary path next to `path`.
pub(crate) fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.{}.part", uuid::Uuid::new_v4().simple()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_cache() -> (DiskImageCache, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let cache = DiskImageCache::new(temp_dir.path().join("images"));
        (cache, temp_dir)
    }

    #[tokio::test]
    async fn test_store_and_read() {
        let (cache, _temp) = create_test_cache();
        cache.ensure_dir().await.unwrap();
        let key = ImageKey::from_url("https://example.com/a.png");
        let path = cache.original_path(&key);

        cache.store(&path, b"test image data").await.unwrap();

        assert!(cache.contains(&path).await);
        assert_eq!(cache.read(&path).await.unwrap().as_ref(), b"test image data");
    }

    #[tokio::test]
    async fn test_cache_miss() {
        let (cache, _temp) = create_test_cache();
        let key = ImageKey::from_url("https://example.com/missing.png");

        assert!(!cache.contains(&cache.original_path(&key)).await);
        assert!(cache.read(&cache.original_path(&key)).await.is_none());
    }

    #[tokio::test]
    async fn test_ensure_dir_creates_directory() {
        let (cache, _temp) = create_test_cache();
        assert!(!cache.dir().exists());

        cache.ensure_dir().await.unwrap();
        cache.ensure_dir().await.unwrap();
        assert!(cache.dir().is_dir());
    }

    #[tokio::test]
    async fn test_store_leaves_no_temp_files() {
        let (cache, _temp) = create_test_cache();
        cache.ensure_dir().await.unwrap();
        let path = cache.original_path(&ImageKey::from_url("u"));

        cache.store(&path, b"one").await.unwrap();
        cache.store(&path, b"two").await.unwrap();

        let names: Vec<_> = std::fs::read_dir(cache.dir())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names.len(), 1);
        assert_eq!(cache.read(&path).await.unwrap().as_ref(), b"two");
    }

    #[tokio::test]
    async fn test_store_into_missing_dir_fails() {
        let (cache, _temp) = create_test_cache();
        let path = cache.original_path(&ImageKey::from_url("u"));

        let err = cache.store(&path, b"data").await.unwrap_err();
        assert!(matches!(err, ImageError::Write { .. }));
    }

    #[test]
    fn test_derived_path_is_sibling_of_original() {
        let (cache, _temp) = create_test_cache();
        let key = ImageKey::from_url("https://example.com/a.png");
        let params = TransformParams {
            opacity: 20.0,
            ..TransformParams::default()
        };

        let derived = cache.derived_path(&key, &params);
        assert_eq!(derived.parent(), cache.original_path(&key).parent());
        assert!(
            derived
                .file_name()
                .unwrap()
                .to_string_lossy()
                .starts_with(key.as_str())
        );
    }
}
