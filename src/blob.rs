//! In-memory file payloads and media type guessing.
//!
//! An [`ImageBlob`] is what travels through normalization: raw bytes plus the
//! metadata an uploader cares about (declared media type, filename,
//! modification time). Blobs have no identity beyond a single prepare run —
//! they are constructed from a source file, possibly transformed, and handed
//! off to the output writer.
//!
//! Media types are guessed from file extensions. The guess is deliberately
//! conservative: only extensions with decoders compiled in map to an
//! `image/*` type, everything else falls back to a generic binary type and
//! passes through normalization untouched.

use std::path::Path;
use std::time::SystemTime;

/// Media type assigned to files whose extension is not a recognized image.
pub const FALLBACK_MIME: &str = "application/octet-stream";

/// Extensions with decoders compiled in, and the media type each maps to.
const IMAGE_CANDIDATES: &[(&str, &str)] = &[
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("tif", "image/tiff"),
    ("tiff", "image/tiff"),
    ("webp", "image/webp"),
];

/// An in-memory file payload.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBlob {
    /// Raw file content.
    pub bytes: Vec<u8>,
    /// Declared media type, e.g. `image/jpeg`. Arbitrary values are allowed;
    /// non-image payloads pass through normalization unchanged.
    pub mime: String,
    /// Filename, preserved across transformation.
    pub name: String,
    /// Modification timestamp. Refreshed only when a new payload is produced.
    pub last_modified: SystemTime,
}

impl ImageBlob {
    /// Construct a blob stamped with the current time.
    pub fn new(bytes: Vec<u8>, mime: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            bytes,
            mime: mime.into(),
            name: name.into(),
            last_modified: SystemTime::now(),
        }
    }

    pub fn byte_size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Whether the declared media type is any image type.
    pub fn is_image(&self) -> bool {
        self.mime.starts_with("image/")
    }

    /// Whether the payload declares the transparency-capable PNG type.
    pub fn is_png(&self) -> bool {
        self.mime == "image/png"
    }
}

/// Guess a media type from a path's extension. `None` for unrecognized
/// extensions (including no extension at all).
pub fn mime_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?;
    IMAGE_CANDIDATES
        .iter()
        .find(|(candidate, _)| ext.eq_ignore_ascii_case(candidate))
        .map(|(_, mime)| *mime)
}

/// Whether a path carries a recognized image extension.
///
/// Directory walks use this to select candidates; explicitly listed files
/// bypass it and rely on the normalizer's pass-through instead.
pub fn is_image_extension(path: &Path) -> bool {
    mime_for_path(path).is_some()
}
