//! Parameter types for normalization.
//!
//! [`NormalizeConfig`] is the interface between the configuration layer
//! (which decides *what* the policy values are) and the
//! [`normalize`](super::normalize) pipeline (which applies them). Keeping it
//! a plain struct means policy tests can construct arbitrary configurations
//! without touching TOML or the CLI.

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(u8);

impl Quality {
    pub fn new(value: u8) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(90)
    }
}

/// Policy values for a normalization run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizeConfig {
    /// Payloads below this many bytes pass through untouched.
    pub threshold: u64,
    /// Cap on the longer pixel edge. Smaller images are never upscaled.
    pub max_dimension: u32,
    /// JPEG encoding quality. PNG output ignores it.
    pub quality: Quality,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            threshold: 300 * 1024,
            max_dimension: 1920,
            quality: Quality::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_clamps_to_valid_range() {
        assert_eq!(Quality::new(0).value(), 1);
        assert_eq!(Quality::new(50).value(), 50);
        assert_eq!(Quality::new(255).value(), 100);
    }

    #[test]
    fn quality_default_is_90() {
        assert_eq!(Quality::default().value(), 90);
    }

    #[test]
    fn config_defaults() {
        let config = NormalizeConfig::default();
        assert_eq!(config.threshold, 307_200);
        assert_eq!(config.max_dimension, 1920);
        assert_eq!(config.quality.value(), 90);
    }
}
