//! Image normalization — pure Rust, zero external dependencies.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `ImageReader::into_dimensions` |
//! | **Decode** (JPEG, PNG, TIFF, WebP) | `image` crate (pure Rust decoders) |
//! | **Resample** | Lanczos3 via `resize_exact` |
//! | **Encode** | `JpegEncoder` (quality) / `PngEncoder` (lossless) |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Quality and policy values
//! - **Codec**: [`Codec`] trait + [`RustCodec`]
//! - **Normalize**: The policy pipeline combining calculations + codec

pub mod calculations;
pub mod codec;
pub mod normalize;
mod params;
pub mod rust_codec;

pub use calculations::fit_within;
pub use codec::{Codec, CodecError, Dimensions, OutputFormat};
pub use normalize::{Outcome, SkipReason, normalize};
pub use params::{NormalizeConfig, Quality};
pub use rust_codec::RustCodec;
