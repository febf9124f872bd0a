// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Codec configuration.
//!
//! Supports both programmatic and file-based (YAML) configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Settings shared by the schema compiler, encoder and decoder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodecConfig {
    /// Maximum structural nesting accepted while compiling, encoding or decoding.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Omit default-valued scalars outside unions (implicit presence).
    #[serde(default = "default_true")]
    pub omit_default_scalars: bool,

    /// Optional `package` line for rendered `.proto` files.
    #[serde(default)]
    pub package: Option<String>,
}

fn default_max_depth() -> usize {
    64
}

fn default_true() -> bool {
    true
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            omit_default_scalars: true,
            package: None,
        }
    }
}

impl CodecConfig {
    /// Load configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Set the nesting limit.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the `.proto` package.
    #[must_use]
    pub fn with_package(mut self, package: impl Into<String>) -> Self {
        self.package = Some(package.into());
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_depth == 0 {
            return Err(ConfigError::Invalid(
                "max_depth must be at least 1".to_string(),
            ));
        }
        if let Some(package) = &self.package {
            let valid = !package.is_empty()
                && package.split('.').all(|part| {
                    part.chars().next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
                        && part.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
                });
            if !valid {
                return Err(ConfigError::Invalid(format!(
                    "invalid package name `{}`",
                    package
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_from_empty_document() {
        let config = CodecConfig::from_yaml("{}").expect("parse");
        assert_eq!(config, CodecConfig::default());
        assert_eq!(config.max_depth, 64);
        assert!(config.omit_default_scalars);
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "max_depth: 8\npackage: acme.billing").expect("write");

        let config = CodecConfig::from_file(file.path()).expect("load");
        assert_eq!(config.max_depth, 8);
        assert_eq!(config.package.as_deref(), Some("acme.billing"));
    }

    #[test]
    fn test_validation() {
        assert!(CodecConfig::default().with_max_depth(0).validate().is_err());
        assert!(CodecConfig::default()
            .with_package("bad-name")
            .validate()
            .is_err());
        assert!(matches!(
            CodecConfig::from_yaml("max_depth: 0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            CodecConfig::from_yaml("max_depth: [1"),
            Err(ConfigError::Yaml(_))
        ));
    }
}
