//! Pure Rust image codec — zero external dependencies.
//!
//! Everything is statically linked into the binary.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Identify | `ImageReader::into_dimensions` (header probe) |
//! | Decode (JPEG, PNG, TIFF, WebP) | `image` crate, format sniffed from content |
//! | Resample | `DynamicImage::resize_exact` with `Lanczos3` |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` with quality |
//! | Encode → PNG | `image::codecs::png::PngEncoder`, RGBA preserved |
//!
//! Format detection sniffs content rather than trusting the declared media
//! type: a mislabeled payload either decodes under its real format or falls
//! into the normalizer's fail-open path.

use super::codec::{Codec, CodecError, Dimensions, OutputFormat};
use super::params::Quality;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageEncoder, ImageReader};
use std::io::Cursor;

/// Pure Rust codec using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustCodec;

impl RustCodec {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustCodec {
    fn default() -> Self {
        Self::new()
    }
}

fn reader(bytes: &[u8]) -> Result<ImageReader<Cursor<&[u8]>>, CodecError> {
    ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| CodecError::Decode(format!("format detection failed: {e}")))
}

impl Codec for RustCodec {
    fn identify(&self, bytes: &[u8]) -> Result<Dimensions, CodecError> {
        let (width, height) = reader(bytes)?
            .into_dimensions()
            .map_err(|e| CodecError::Decode(format!("failed to read dimensions: {e}")))?;
        Ok(Dimensions { width, height })
    }

    fn decode(&self, bytes: &[u8]) -> Result<DynamicImage, CodecError> {
        reader(bytes)?
            .decode()
            .map_err(|e| CodecError::Decode(format!("failed to decode: {e}")))
    }

    fn resample(&self, image: &DynamicImage, width: u32, height: u32) -> DynamicImage {
        image.resize_exact(width, height, FilterType::Lanczos3)
    }

    fn encode(
        &self,
        image: &DynamicImage,
        format: OutputFormat,
        quality: Quality,
    ) -> Result<Vec<u8>, CodecError> {
        let mut buf = Vec::new();
        match format {
            OutputFormat::Jpeg => {
                // JPEG has no alpha channel; flatten before encoding
                let rgb = image.to_rgb8();
                JpegEncoder::new_with_quality(&mut buf, quality.value())
                    .write_image(
                        rgb.as_raw(),
                        rgb.width(),
                        rgb.height(),
                        image::ExtendedColorType::Rgb8,
                    )
                    .map_err(|e| CodecError::Encode(format!("JPEG encode failed: {e}")))?;
            }
            OutputFormat::Png => {
                let rgba = image.to_rgba8();
                PngEncoder::new(&mut buf)
                    .write_image(
                        rgba.as_raw(),
                        rgba.width(),
                        rgba.height(),
                        image::ExtendedColorType::Rgba8,
                    )
                    .map_err(|e| CodecError::Encode(format!("PNG encode failed: {e}")))?;
            }
        }
        Ok(buf)
    }
}
