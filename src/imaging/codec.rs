//! Codec trait and shared types.
//!
//! The [`Codec`] trait is the seam between normalization policy and pixel
//! work: identify, decode, resample, and encode. The production
//! implementation is [`RustCodec`](super::rust_codec::RustCodec) — the
//! `image` crate end to end, statically linked. Policy tests use the
//! recording [`MockCodec`](tests::MockCodec) instead, so threshold, cap,
//! format, and regression-guard decisions are checked without encoding a
//! single real pixel.

use super::params::Quality;
use image::DynamicImage;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("decode failed: {0}")]
    Decode(String),
    #[error("encode failed: {0}")]
    Encode(String),
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Output formats normalization can produce.
///
/// PNG is kept for transparency-capable inputs; everything else becomes
/// JPEG. There is no conversion in the other direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Jpeg,
    Png,
}

impl OutputFormat {
    pub fn mime(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Jpeg => "jpeg",
            Self::Png => "png",
        }
    }
}

/// Trait for image codecs.
///
/// Every codec must implement all four operations so normalization and the
/// dry-run planner are codec-agnostic. All methods operate on in-memory
/// buffers — codecs never touch the filesystem.
pub trait Codec: Sync {
    /// Read pixel dimensions from header data without a full decode.
    fn identify(&self, bytes: &[u8]) -> Result<Dimensions, CodecError>;

    /// Decode a payload into a bitmap.
    fn decode(&self, bytes: &[u8]) -> Result<DynamicImage, CodecError>;

    /// Resample a bitmap to exactly `width` × `height`.
    fn resample(&self, image: &DynamicImage, width: u32, height: u32) -> DynamicImage;

    /// Encode a bitmap. `quality` applies to lossy formats only.
    fn encode(
        &self,
        image: &DynamicImage,
        format: OutputFormat,
        quality: Quality,
    ) -> Result<Vec<u8>, CodecError>;
}
