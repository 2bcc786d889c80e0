//! Parser configuration
//!
//! `defaults/parsetools.default.toml` is embedded into the library so that the
//! documented defaults and [`ParseOptions::default`] stay in sync. Applications layer
//! their own files on top of those defaults via [`Loader`] before deserializing into
//! [`ParseOptions`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../defaults/parsetools.default.toml");

/// Options of [`plist::parse_with`](crate::plist::parse_with).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ParseOptions {
    pub key_policy: KeyPolicy,
    pub excerpt_len: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            key_policy: KeyPolicy::Overwrite,
            excerpt_len: crate::lexing::DEFAULT_EXCERPT_LEN,
        }
    }
}

/// How a dict treats a key that follows another key without a value in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum KeyPolicy {
    /// The later key replaces the pending one.
    #[default]
    Overwrite,
    /// The input is rejected.
    Reject,
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

    /// Layer configuration given as TOML text.
    pub fn with_toml(mut self, toml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(toml, FileFormat::Toml));
        self
    }

    /// Apply a single key/value override.
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder and deserialize the resulting options.
    pub fn build(self) -> Result<ParseOptions, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<ParseOptions, ConfigError> {
    Loader::new().build()
}
