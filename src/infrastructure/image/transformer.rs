//! Image-processing capability backed by the `image` crate.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, ColorMap, FilterType};
use image::{DynamicImage, ImageFormat, ImageReader, Rgb, Rgba, RgbaImage};
use tracing::debug;

use crate::domain::entities::{ColorMode, TransformParams};
use crate::domain::errors::{ImageError, ImageResult};
use crate::domain::ports::ImageTransformPort;

use super::disk_cache::temp_sibling;

/// JPEG quality used for derived variants.
pub const DEFAULT_JPEG_QUALITY: u8 = 95;

/// Largest resize target accepted, in pixels (about 8K by 5K).
pub const DEFAULT_MAX_PIXELS: u64 = 40_000_000;

/// Resizes, fades and converts images on the local CPU.
#[derive(Debug, Clone)]
pub struct RasterTransformer {
    jpeg_quality: u8,
    max_pixels: u64,
}

impl Default for RasterTransformer {
    fn default() -> Self {
        Self::new(DEFAULT_JPEG_QUALITY)
    }
}

impl RasterTransformer {
    /// Creates a transformer encoding JPEG output at `jpeg_quality` (1–100).
    #[must_use]
    pub fn new(jpeg_quality: u8) -> Self {
        Self {
            jpeg_quality: jpeg_quality.clamp(1, 100),
            max_pixels: DEFAULT_MAX_PIXELS,
        }
    }

    /// Sets the largest resize target, in pixels.
    #[must_use]
    pub const fn with_max_pixels(mut self, max_pixels: u64) -> Self {
        self.max_pixels = max_pixels;
        self
    }

    /// Applies `params` to an in-memory image.
    ///
    /// # Errors
    /// Returns error if the resize target exceeds the pixel limit or the
    /// requested color mode is unknown.
    pub fn apply(&self, mut img: DynamicImage, params: &TransformParams) -> ImageResult<DynamicImage> {
        if let Some((width, height)) = params.resize_to() {
            let pixels = u64::from(width) * u64::from(height);
            if pixels > self.max_pixels {
                return Err(ImageError::transform(format!(
                    "resize to {width}x{height} exceeds the limit of {} pixels",
                    self.max_pixels
                )));
            }
            img = img.resize_exact(width, height, FilterType::Lanczos3);
        }

        if params.wants_blend() {
            img = blend_with_white(&img, params.opacity / 100.0);
        }

        if let Some(mode) = &params.mode {
            let mode: ColorMode = mode.parse().map_err(ImageError::transform)?;
            img = convert(img, mode);
        }

        Ok(img)
    }

    /// Encodes `img` in the output format chosen for `source_format`.
    ///
    /// # Errors
    /// Returns error if the encoder rejects the image.
    pub fn encode(&self, img: &DynamicImage, source_format: Option<ImageFormat>) -> ImageResult<Vec<u8>> {
        let mut buf = Vec::new();
        let result = match output_format(source_format) {
            ImageFormat::Jpeg => {
                let flat = if img.color().has_color() {
                    DynamicImage::ImageRgb8(img.to_rgb8())
                } else {
                    DynamicImage::ImageLuma8(img.to_luma8())
                };
                flat.write_with_encoder(JpegEncoder::new_with_quality(&mut buf, self.jpeg_quality))
            }
            ImageFormat::WebP => {
                let rgb = if img.color().has_alpha() {
                    DynamicImage::ImageRgba8(img.to_rgba8())
                } else {
                    DynamicImage::ImageRgb8(img.to_rgb8())
                };
                rgb.write_to(&mut Cursor::new(&mut buf), ImageFormat::WebP)
            }
            _ => img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png),
        };
        result.map_err(|e| ImageError::transform(format!("encode failed: {e}")))?;
        Ok(buf)
    }
}

impl ImageTransformPort for RasterTransformer {
    fn is_available(&self) -> bool {
        true
    }

    fn transform(
        &self,
        source: &Path,
        params: &TransformParams,
        dest: &Path,
    ) -> ImageResult<PathBuf> {
        let reader = ImageReader::open(source)
            .and_then(ImageReader::with_guessed_format)
            .map_err(|e| ImageError::transform(format!("cannot open {}: {e}", source.display())))?;
        let format = reader.format();
        let img = reader
            .decode()
            .map_err(|e| ImageError::transform(format!("decode failed: {e}")))?;

        let img = self.apply(img, params)?;
        let bytes = self.encode(&img, format)?;

        let tmp = temp_sibling(dest);
        std::fs::write(&tmp, &bytes)
            .and_then(|()| std::fs::rename(&tmp, dest))
            .map_err(|e| {
                let _ = std::fs::remove_file(&tmp);
                ImageError::write(dest, e.to_string())
            })?;

        debug!(
            source = %source.display(),
            dest = %dest.display(),
            width = img.width(),
            height = img.height(),
            "Stored derived image"
        );
        Ok(dest.to_path_buf())
    }
}

/// Stand-in used when image processing is turned off.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledTransformer;

impl ImageTransformPort for DisabledTransformer {
    fn is_available(&self) -> bool {
        false
    }

    fn transform(&self, _: &Path, _: &TransformParams, _: &Path) -> ImageResult<PathBuf> {
        Err(ImageError::capability_missing("image transforms are disabled"))
    }
}

/// Maps a detected input format to the encoder used for its variants.
/// Anything without a dedicated mapping is written as lossless PNG.
#[must_use]
pub fn output_format(source: Option<ImageFormat>) -> ImageFormat {
    match source {
        Some(ImageFormat::Jpeg) => ImageFormat::Jpeg,
        Some(ImageFormat::WebP) => ImageFormat::WebP,
        _ => ImageFormat::Png,
    }
}

/// Linearly blends `img` over an opaque white canvas of its own size.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn blend_with_white(img: &DynamicImage, factor: f32) -> DynamicImage {
    let factor = factor.clamp(0.0, 1.0);
    let had_alpha = img.color().has_alpha();
    let src = img.to_rgba8();

    let blended = RgbaImage::from_fn(src.width(), src.height(), |x, y| {
        let Rgba(px) = *src.get_pixel(x, y);
        Rgba(px.map(|c| (255.0 * (1.0 - factor) + f32::from(c) * factor).round() as u8))
    });

    if had_alpha {
        DynamicImage::ImageRgba8(blended)
    } else {
        DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(blended).to_rgb8())
    }
}

fn convert(img: DynamicImage, mode: ColorMode) -> DynamicImage {
    match mode {
        ColorMode::Bilevel => {
            let mut luma = img.to_luma8();
            imageops::dither(&mut luma, &imageops::BiLevel);
            DynamicImage::ImageLuma8(luma)
        }
        ColorMode::Luma => DynamicImage::ImageLuma8(img.to_luma8()),
        ColorMode::LumaAlpha => DynamicImage::ImageLumaA8(img.to_luma_alpha8()),
        ColorMode::Palette => {
            let mut rgb = img.to_rgb8();
            imageops::dither(&mut rgb, &WebSafePalette);
            DynamicImage::ImageRgb8(rgb)
        }
        ColorMode::Rgb => DynamicImage::ImageRgb8(img.to_rgb8()),
        ColorMode::Rgba => DynamicImage::ImageRgba8(img.to_rgba8()),
    }
}

/// The 216-colour web-safe cube: six evenly spaced levels per channel.
struct WebSafePalette;

impl WebSafePalette {
    #[allow(clippy::cast_possible_truncation)]
    fn level(c: u8) -> u8 {
        ((u16::from(c) + 25) / 51) as u8
    }
}

impl ColorMap for WebSafePalette {
    type Color = Rgb<u8>;

    fn index_of(&self, color: &Rgb<u8>) -> usize {
        let [r, g, b] = color.0.map(|c| usize::from(Self::level(c)));
        r * 36 + g * 6 + b
    }

    fn map_color(&self, color: &mut Rgb<u8>) {
        color.0 = color.0.map(|c| Self::level(c) * 51);
    }
}
