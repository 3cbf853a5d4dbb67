//! Domain types for cached and derived images.

use std::path::PathBuf;

use bytes::Bytes;

/// Identifier naming a cached original on disk.
/// Generated from a hash of the source URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageKey(String);

impl ImageKey {
    /// Creates an `ImageKey` from a URL by hashing it.
    #[must_use]
    pub fn from_url(url: &str) -> Self {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(url.as_bytes());
        let result = hasher.finalize();
        Self(hex::encode(&result[..16]))
    }

    /// Returns the inner string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the file name of the derived variant for `params`.
    ///
    /// Layout is `<key>_w<W>_h<H>_o_<O>_<mode>`; absent values render as `None`.
    #[must_use]
    pub fn derived_name(&self, params: &TransformParams) -> String {
        fn or_none<T: std::fmt::Display>(value: Option<T>) -> String {
            value.map_or_else(|| "None".to_string(), |v| v.to_string())
        }

        format!(
            "{}_w{}_h{}_o_{:?}_{}",
            self.0,
            or_none(params.width),
            or_none(params.height),
            params.opacity,
            or_none(params.mode.as_deref()),
        )
    }
}

impl std::fmt::Display for ImageKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Full opacity; no blending happens at this value or above.
pub const FULL_OPACITY: f32 = 100.0;

/// Display parameters requested for an image.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformParams {
    /// Target width in pixels.
    pub width: Option<u32>,
    /// Target height in pixels.
    pub height: Option<u32>,
    /// Opacity on a 0–100 scale.
    pub opacity: f32,
    /// Color mode name (`1`, `L`, `LA`, `P`, `RGB`, `RGBA`).
    pub mode: Option<String>,
}

impl Default for TransformParams {
    fn default() -> Self {
        Self {
            width: None,
            height: None,
            opacity: FULL_OPACITY,
            mode: None,
        }
    }
}

impl TransformParams {
    /// Returns the target size when both dimensions are given and non-zero.
    #[must_use]
    pub fn resize_to(&self) -> Option<(u32, u32)> {
        match (self.width, self.height) {
            (Some(w), Some(h)) if w > 0 && h > 0 => Some((w, h)),
            _ => None,
        }
    }

    /// Returns true if the image should be blended towards white.
    #[must_use]
    pub fn wants_blend(&self) -> bool {
        self.opacity < FULL_OPACITY
    }

    /// Returns true if any transform was requested.
    #[must_use]
    pub fn requires_transform(&self) -> bool {
        self.resize_to().is_some() || self.wants_blend() || self.mode.is_some()
    }
}

/// Color modes a derived image can be converted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMode {
    /// Black and white, dithered.
    Bilevel,
    /// 8-bit grayscale.
    Luma,
    /// Grayscale with alpha.
    LumaAlpha,
    /// Web-safe palette, dithered.
    Palette,
    /// 8-bit RGB.
    Rgb,
    /// 8-bit RGB with alpha.
    Rgba,
}

impl std::str::FromStr for ColorMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1" => Ok(Self::Bilevel),
            "L" => Ok(Self::Luma),
            "LA" => Ok(Self::LumaAlpha),
            "P" => Ok(Self::Palette),
            "RGB" => Ok(Self::Rgb),
            "RGBA" => Ok(Self::Rgba),
            other => Err(format!("unsupported color mode: {other}")),
        }
    }
}

/// Everything needed to download one remote image.
#[derive(Debug, Clone, Default)]
pub struct FetchRequest {
    /// Source URL.
    pub url: String,
    /// Pre-encoded Basic credential.
    pub auth: Option<String>,
    /// Extra request headers.
    pub headers: Vec<(String, String)>,
    /// Ask intermediaries and the origin not to answer from a cache.
    pub bypass_remote_cache: bool,
}

/// A request for a (possibly transformed) image.
#[derive(Debug, Clone, Default)]
pub struct ImageRequest {
    /// How to fetch the original.
    pub fetch: FetchRequest,
    /// How to derive the served variant.
    pub params: TransformParams,
}

impl ImageRequest {
    /// Creates a request for the untransformed image at `url`.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            fetch: FetchRequest {
                url: url.into(),
                ..FetchRequest::default()
            },
            params: TransformParams::default(),
        }
    }

    /// Sets the target size.
    #[must_use]
    pub const fn with_size(mut self, width: u32, height: u32) -> Self {
        self.params.width = Some(width);
        self.params.height = Some(height);
        self
    }

    /// Sets the opacity (0–100).
    #[must_use]
    pub const fn with_opacity(mut self, opacity: f32) -> Self {
        self.params.opacity = opacity;
        self
    }

    /// Sets the color mode.
    #[must_use]
    pub fn with_mode(mut self, mode: impl Into<String>) -> Self {
        self.params.mode = Some(mode.into());
        self
    }

    /// Sets the Basic credential.
    #[must_use]
    pub fn with_auth(mut self, auth: impl Into<String>) -> Self {
        self.fetch.auth = Some(auth.into());
        self
    }

    /// Adds an extra request header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fetch.headers.push((name.into(), value.into()));
        self
    }

    /// Forces the remote side to revalidate.
    #[must_use]
    pub const fn bypass_remote_cache(mut self) -> Self {
        self.fetch.bypass_remote_cache = true;
        self
    }
}

/// Which file ended up being served.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSource {
    /// The cached original.
    Original,
    /// A derived variant.
    Variant,
    /// The placeholder asset.
    Placeholder,
}

impl std::fmt::Display for ImageSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Original => write!(f, "original"),
            Self::Variant => write!(f, "variant"),
            Self::Placeholder => write!(f, "placeholder"),
        }
    }
}

/// Image bytes ready to hand to a static file server.
#[derive(Debug, Clone)]
pub struct ServedImage {
    /// File the bytes were read from.
    pub path: PathBuf,
    /// Raw file contents.
    pub bytes: Bytes,
    /// Sniffed content type, e.g. `image/png`.
    pub content_type: String,
    /// Which file was served.
    pub source: ImageSource,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_key_from_url() {
        let url = "http://localhost:8989/api/MediaCover/1/poster.jpg";
        let key = ImageKey::from_url(url);
        assert_eq!(key.as_str().len(), 32);
        assert!(key.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_image_key_consistency() {
        let url = "https://example.com/image.png";
        assert_eq!(ImageKey::from_url(url), ImageKey::from_url(url));
        assert_ne!(
            ImageKey::from_url(url),
            ImageKey::from_url("https://example.com/other.png")
        );
    }

    #[test]
    fn test_derived_name_layout() {
        let key = ImageKey::from_url("https://example.com/a.png");
        let params = TransformParams {
            width: Some(100),
            height: Some(150),
            opacity: 50.0,
            mode: None,
        };
        assert_eq!(
            key.derived_name(&params),
            format!("{key}_w100_h150_o_50.0_None")
        );

        let params = TransformParams {
            mode: Some("L".into()),
            ..TransformParams::default()
        };
        assert_eq!(
            key.derived_name(&params),
            format!("{key}_wNone_hNone_o_100.0_L")
        );
    }

    #[test]
    fn test_requires_transform() {
        assert!(!TransformParams::default().requires_transform());

        let only_width = TransformParams {
            width: Some(10),
            ..TransformParams::default()
        };
        assert!(!only_width.requires_transform());

        let zero_size = TransformParams {
            width: Some(0),
            height: Some(10),
            ..TransformParams::default()
        };
        assert!(zero_size.resize_to().is_none());

        let faded = TransformParams {
            opacity: 20.0,
            ..TransformParams::default()
        };
        assert!(faded.requires_transform());
        assert!(faded.resize_to().is_none());
    }

    #[test]
    fn test_color_mode_parse() {
        assert_eq!("L".parse::<ColorMode>(), Ok(ColorMode::Luma));
        assert_eq!("P".parse::<ColorMode>(), Ok(ColorMode::Palette));
        assert!("CMYK".parse::<ColorMode>().is_err());
    }

    #[test]
    fn test_request_builder() {
        let request = ImageRequest::new("https://example.com/a.png")
            .with_size(10, 20)
            .with_auth("dXNlcjpwYXNz")
            .with_header("X-Api-Key", "abc")
            .bypass_remote_cache();

        assert_eq!(request.params.resize_to(), Some((10, 20)));
        assert_eq!(request.fetch.auth.as_deref(), Some("dXNlcjpwYXNz"));
        assert_eq!(request.fetch.headers.len(), 1);
        assert!(request.fetch.bypass_remote_cache);
    }
}
