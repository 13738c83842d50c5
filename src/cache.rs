//! Skip cache for repeated prepare runs.
//!
//! Decoding and re-encoding are the expensive steps of a prepare run. This
//! module lets the batch stage skip a file entirely when neither its content
//! nor the policy values have changed since the last run.
//!
//! # Design
//!
//! The cache is **content-addressed**: an entry matches when both the
//! SHA-256 of the source bytes and the SHA-256 of the policy values are
//! unchanged. Modification times are not consulted — content hashing
//! survives `git checkout`, file copies, and re-downloads that reset mtimes.
//!
//! A hit requires:
//! 1. An entry for the output filename with matching `source_hash` and
//!    `params_hash`
//! 2. The previously-written output file still present on disk
//!
//! The manifest is a JSON file at `<output_dir>/.prep-cache.json`, living
//! alongside the prepared files so it travels with them when the output
//! directory is cached in CI. `--no-cache` loads an empty manifest instead,
//! forcing a full re-run; stale outputs are overwritten naturally.

use crate::imaging::NormalizeConfig;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::io;
use std::path::Path;

/// Name of the cache manifest file within the output directory.
const MANIFEST_FILENAME: &str = ".prep-cache.json";

/// Version of the cache manifest format. Bump this to invalidate all
/// existing caches when the format or key computation changes.
const MANIFEST_VERSION: u32 = 1;

/// A single cached output file.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct CacheEntry {
    pub source_hash: String,
    pub params_hash: String,
}

/// On-disk cache manifest mapping output filenames to their cache entries.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CacheManifest {
    pub version: u32,
    pub entries: HashMap<String, CacheEntry>,
}

impl CacheManifest {
    /// Create an empty manifest (used for `--no-cache` or first run).
    pub fn empty() -> Self {
        Self {
            version: MANIFEST_VERSION,
            entries: HashMap::new(),
        }
    }

    /// Load from the output directory. Returns an empty manifest if the
    /// file doesn't exist or can't be parsed (version mismatch, corruption).
    pub fn load(output_dir: &Path) -> Self {
        let path = output_dir.join(MANIFEST_FILENAME);
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(_) => return Self::empty(),
        };
        let manifest: Self = match serde_json::from_str(&content) {
            Ok(m) => m,
            Err(_) => return Self::empty(),
        };
        if manifest.version != MANIFEST_VERSION {
            return Self::empty();
        }
        manifest
    }

    /// Save to the output directory.
    pub fn save(&self, output_dir: &Path) -> io::Result<()> {
        let path = output_dir.join(MANIFEST_FILENAME);
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
    }

    /// Whether the cached output for `name` is still valid: hashes match and
    /// the file is still on disk.
    pub fn is_fresh(
        &self,
        name: &str,
        source_hash: &str,
        params_hash: &str,
        output_dir: &Path,
    ) -> bool {
        self.entries.get(name).is_some_and(|entry| {
            entry.source_hash == source_hash
                && entry.params_hash == params_hash
                && output_dir.join(name).exists()
        })
    }

    /// Record a cache entry for an output file.
    pub fn insert(&mut self, name: String, source_hash: String, params_hash: String) {
        self.entries.insert(
            name,
            CacheEntry {
                source_hash,
                params_hash,
            },
        );
    }
}

/// SHA-256 hash of a payload, returned as a hex string.
pub fn hash_bytes(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    format!("{:x}", digest)
}

/// SHA-256 hash of the policy values.
///
/// Inputs: threshold, dimension cap, quality. If any of these change, every
/// previously cached output is invalid.
pub fn hash_params(config: &NormalizeConfig) -> String {
    let mut hasher = Sha256::new();
    hasher.update(b"normalize\0");
    hasher.update(config.threshold.to_le_bytes());
    hasher.update(config.max_dimension.to_le_bytes());
    hasher.update([config.quality.value()]);
    format!("{:x}", hasher.finalize())
}
