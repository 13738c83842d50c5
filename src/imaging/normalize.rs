//! The normalization pipeline.
//!
//! One operation: take an arbitrary payload and return one that is safe and
//! efficient to upload, without ever degrading it. The policy, in order:
//!
//! 1. Non-image payloads pass through untouched.
//! 2. Payloads below the size threshold pass through untouched.
//! 3. The longer pixel edge is capped at the configured bound; the shorter
//!    axis follows proportionally. Never upscaled.
//! 4. PNG stays PNG (transparency survives); everything else becomes JPEG
//!    at the configured quality.
//! 5. A re-encode that fails to beat the input's byte size is discarded.
//!
//! Every internal failure — undecodable bytes, encoder error — resolves to
//! returning the original payload. The operation has no error type: it
//! degrades to a no-op rather than block an upload.

use super::calculations::fit_within;
use super::codec::{Codec, OutputFormat};
use super::params::NormalizeConfig;
use crate::blob::ImageBlob;
use std::time::SystemTime;

/// Why an input was returned unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Declared media type is not an image.
    NotAnImage,
    /// Payload is below the size threshold.
    BelowThreshold,
    /// Bytes could not be decoded.
    DecodeFailed,
    /// The encoder reported an error.
    EncodeFailed,
    /// Re-encoding produced no byte savings.
    NoImprovement,
}

impl SkipReason {
    /// Short machine-friendly label used in the report manifest.
    pub fn label(self) -> &'static str {
        match self {
            Self::NotAnImage => "not-an-image",
            Self::BelowThreshold => "below-threshold",
            Self::DecodeFailed => "decode-failed",
            Self::EncodeFailed => "encode-failed",
            Self::NoImprovement => "no-improvement",
        }
    }

    /// Human-readable phrasing for CLI output.
    pub fn describe(self) -> &'static str {
        match self {
            Self::NotAnImage => "not an image",
            Self::BelowThreshold => "below size threshold",
            Self::DecodeFailed => "could not decode",
            Self::EncodeFailed => "could not encode",
            Self::NoImprovement => "re-encoding saved nothing",
        }
    }
}

/// What [`normalize`] did with an input.
#[derive(Debug)]
pub enum Outcome {
    /// A strictly smaller payload was produced.
    Normalized {
        blob: ImageBlob,
        input_dimensions: (u32, u32),
        output_dimensions: (u32, u32),
        format: OutputFormat,
    },
    /// The original payload was returned, bytes and metadata untouched.
    Unchanged { blob: ImageBlob, reason: SkipReason },
}

impl Outcome {
    /// The payload to hand to the upload step, whichever way it went.
    pub fn blob(&self) -> &ImageBlob {
        match self {
            Self::Normalized { blob, .. } | Self::Unchanged { blob, .. } => blob,
        }
    }

    pub fn into_blob(self) -> ImageBlob {
        match self {
            Self::Normalized { blob, .. } | Self::Unchanged { blob, .. } => blob,
        }
    }
}

/// Normalize a payload for upload.
///
/// Infallible by design: every failure path resolves to
/// [`Outcome::Unchanged`] carrying the original blob. Holds at most one
/// decoded bitmap and one encode buffer for the duration of the call;
/// concurrent invocations share nothing.
pub fn normalize(codec: &impl Codec, input: ImageBlob, config: &NormalizeConfig) -> Outcome {
    if !input.is_image() {
        return Outcome::Unchanged {
            blob: input,
            reason: SkipReason::NotAnImage,
        };
    }

    if input.byte_size() < config.threshold {
        return Outcome::Unchanged {
            blob: input,
            reason: SkipReason::BelowThreshold,
        };
    }

    let image = match codec.decode(&input.bytes) {
        Ok(image) => image,
        Err(_) => {
            return Outcome::Unchanged {
                blob: input,
                reason: SkipReason::DecodeFailed,
            };
        }
    };

    let input_dimensions = (image.width(), image.height());
    let working = match fit_within(input_dimensions, config.max_dimension) {
        Some((w, h)) => codec.resample(&image, w, h),
        None => image,
    };
    let output_dimensions = (working.width(), working.height());

    let format = if input.is_png() {
        OutputFormat::Png
    } else {
        OutputFormat::Jpeg
    };

    let encoded = match codec.encode(&working, format, config.quality) {
        Ok(bytes) => bytes,
        Err(_) => {
            return Outcome::Unchanged {
                blob: input,
                reason: SkipReason::EncodeFailed,
            };
        }
    };

    // Strict improvement or nothing: an equal-or-larger result keeps the
    // original bytes, name, and timestamp exactly.
    if encoded.len() as u64 >= input.byte_size() {
        return Outcome::Unchanged {
            blob: input,
            reason: SkipReason::NoImprovement,
        };
    }

    Outcome::Normalized {
        blob: ImageBlob {
            bytes: encoded,
            mime: format.mime().to_string(),
            name: input.name,
            last_modified: SystemTime::now(),
        },
        input_dimensions,
        output_dimensions,
        format,
    }
}
