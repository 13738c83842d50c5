//! Tool configuration module.
//!
//! Handles loading and validating `photoprep.toml`. Configuration is flat:
//! stock defaults, overridden by an optional config file, overridden by CLI
//! flags (applied by `main`, not here).
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [normalize]
//! threshold_kib = 300   # Inputs below this many KiB pass through untouched
//! max_dimension = 1920  # Cap on the longer pixel edge (never upscaled)
//! quality = 90          # JPEG quality (1-100); PNG output ignores it
//!
//! [processing]
//! max_workers = 4       # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse — override just the values you want:
//!
//! ```toml
//! [normalize]
//! quality = 85
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{NormalizeConfig, Quality};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Default config filename, looked up in the working directory.
pub const CONFIG_FILENAME: &str = "photoprep.toml";

/// Tool configuration loaded from `photoprep.toml`.
///
/// All fields have sensible defaults. Config files need only specify the
/// values they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PrepConfig {
    /// Normalization policy values.
    pub normalize: NormalizeSection,
    /// Parallel processing settings.
    pub processing: ProcessingSection,
}

/// `[normalize]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NormalizeSection {
    /// Inputs below this many KiB pass through untouched.
    pub threshold_kib: u64,
    /// Cap on the longer pixel edge. Smaller images are never upscaled.
    pub max_dimension: u32,
    /// JPEG encoding quality (1-100). PNG output ignores it.
    pub quality: u8,
}

impl Default for NormalizeSection {
    fn default() -> Self {
        Self {
            threshold_kib: 300,
            max_dimension: 1920,
            quality: 90,
        }
    }
}

/// `[processing]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingSection {
    /// Maximum number of parallel workers.
    /// When absent or null, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_workers: Option<usize>,
}

impl PrepConfig {
    /// Load configuration.
    ///
    /// An explicit path must exist and parse. With no explicit path, the
    /// stock `photoprep.toml` is loaded when present, defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let content = match path {
            Some(p) => fs::read_to_string(p)?,
            None => match fs::read_to_string(CONFIG_FILENAME) {
                Ok(c) => c,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    return Ok(Self::default());
                }
                Err(e) => return Err(e.into()),
            },
        };
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.normalize.quality == 0 || self.normalize.quality > 100 {
            return Err(ConfigError::Validation(
                "normalize.quality must be 1-100".into(),
            ));
        }
        if self.normalize.max_dimension == 0 {
            return Err(ConfigError::Validation(
                "normalize.max_dimension must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Convert the `[normalize]` section into pipeline policy values.
    pub fn normalize_config(&self) -> NormalizeConfig {
        NormalizeConfig {
            threshold: self.normalize.threshold_kib * 1024,
            max_dimension: self.normalize.max_dimension,
            quality: Quality::new(self.normalize.quality),
        }
    }
}

/// Effective worker count: the configured maximum, clamped to the number of
/// available CPU cores — users can constrain down, not up.
pub fn effective_workers(processing: &ProcessingSection) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    processing.max_workers.map(|n| n.min(cores)).unwrap_or(cores)
}

/// Returns the stock config with all options documented.
///
/// Printed by `photoprep gen-config` so users start from a commented
/// template instead of the docs.
pub fn stock_config_toml() -> &'static str {
    r##"# photoprep Configuration
# =======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# photoprep looks for this file as photoprep.toml in the working directory;
# pass --config to point somewhere else. Command-line flags override file
# values. Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Normalization policy
# ---------------------------------------------------------------------------
[normalize]
# Inputs below this many KiB are passed through untouched — compression
# overhead isn't worth it for already-small assets.
threshold_kib = 300

# Cap on the longer pixel edge. The shorter edge follows proportionally.
# Images already within the cap are never upscaled.
max_dimension = 1920

# JPEG encoding quality (1 = worst, 100 = best). PNG output is lossless
# and ignores this value.
quality = 90

# ---------------------------------------------------------------------------
# Parallel processing
# ---------------------------------------------------------------------------
[processing]
# Max parallel workers (omit for auto = CPU cores). Values above the core
# count are clamped down.
# max_workers = 4
"##
}
