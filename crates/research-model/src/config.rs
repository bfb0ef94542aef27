//! Factory configuration
//!
//! Loaded from TOML:
//!
//! ```toml
//! strict_discriminators = false
//! max_transform_depth = 8
//! verify_examples = true
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Behavior switches for a [`Factory`](crate::Factory)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactoryConfig {
    /// Unknown discriminators fail instead of using a family's default
    pub strict_discriminators: bool,
    /// How many transform steps may chain before decoding fails
    pub max_transform_depth: usize,
    /// Decode every bundled example when the factory is built
    pub verify_examples: bool,
}

impl FactoryConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With strict discriminators
    #[inline]
    #[must_use]
    pub fn with_strict_discriminators(mut self, strict: bool) -> Self {
        self.strict_discriminators = strict;
        self
    }

    /// With max transform depth
    #[inline]
    #[must_use]
    pub fn with_max_transform_depth(mut self, depth: usize) -> Self {
        self.max_transform_depth = depth;
        self
    }

    /// With example verification
    #[inline]
    #[must_use]
    pub fn with_verify_examples(mut self, verify: bool) -> Self {
        self.verify_examples = verify;
        self
    }

    /// Parse configuration from TOML text
    ///
    /// # Errors
    /// `Parse` for malformed TOML, `InvalidValue` for out-of-range values
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    ///
    /// # Errors
    /// `Io` if the file cannot be read, otherwise as [`Self::from_toml_str`]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "loading factory configuration");
        Self::from_toml_str(&text)
    }

    /// Check value ranges
    ///
    /// # Errors
    /// `InvalidValue` if `max_transform_depth` is zero
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_transform_depth == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_transform_depth",
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for FactoryConfig {
    fn default() -> Self {
        Self {
            strict_discriminators: false,
            max_transform_depth: 8,
            verify_examples: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults() {
        let config = FactoryConfig::default();
        assert!(!config.strict_discriminators);
        assert_eq!(config.max_transform_depth, 8);
        assert!(config.verify_examples);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = FactoryConfig::from_toml_str("strict_discriminators = true").unwrap();
        assert!(config.strict_discriminators);
        assert_eq!(config.max_transform_depth, 8);
    }

    #[test]
    fn zero_depth_is_rejected() {
        let err = FactoryConfig::from_toml_str("max_transform_depth = 0").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "verify_examples = false").unwrap();
        let config = FactoryConfig::load(file.path()).unwrap();
        assert!(!config.verify_examples);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = FactoryConfig::load("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
