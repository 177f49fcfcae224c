//! Shared configuration loader for the rml toolchain.
//!
//! `defaults/rml.default.toml` is embedded into every binary so that docs and
//! runtime behavior stay in sync. Applications layer user-specific files on
//! top of those defaults via [`Loader`] before deserializing into
//! [`RmlConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use rml_convert::ToolSettings;
use serde::Deserialize;
use std::path::{Path, PathBuf};

const DEFAULT_TOML: &str = include_str!("../defaults/rml.default.toml");

/// Top-level configuration consumed by rml applications.
#[derive(Debug, Clone, Deserialize)]
pub struct RmlConfig {
    pub convert: ConvertConfig,
}

/// Conversion-related knobs.
#[derive(Debug, Clone, Deserialize)]
pub struct ConvertConfig {
    /// Run the well-formedness check after writing output.
    pub validate: bool,
    pub checker: ToolConfig,
    pub indent: ToolConfig,
}

/// Overrides for one external tool.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolConfig {
    /// Explicit binary path; unset means resolve via environment and PATH.
    pub binary: Option<String>,
}

impl From<&ConvertConfig> for ToolSettings {
    fn from(config: &ConvertConfig) -> Self {
        ToolSettings {
            validate: config.validate,
            checker_binary: config.checker.binary.as_ref().map(PathBuf::from),
            indent_binary: config.indent.binary.as_ref().map(PathBuf::from),
        }
    }
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override (useful for CLI settings).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder and deserialize the resulting configuration.
    pub fn build(self) -> Result<RmlConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<RmlConfig, ConfigError> {
    Loader::new().build()
}
