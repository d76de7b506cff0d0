//! Shared configuration loader for the codelab parser.
//!
//! `defaults/codelab.default.toml` is embedded into every binary so that docs and
//! runtime behavior stay in sync. Applications layer user-specific files on top
//! of those defaults via [`Loader`] before deserializing into [`CodelabConfig`].

use codelab_parser::options::{GdocStyles, ParseOptions};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../defaults/codelab.default.toml");

/// Top-level configuration consumed by codelab applications.
#[derive(Debug, Clone, Deserialize)]
pub struct CodelabConfig {
    pub parser: ParserConfig,
    pub embed: EmbedConfig,
    pub gdoc: GdocConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ParserConfig {
    /// Extra metadata keys kept verbatim.
    pub pass_metadata: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbedConfig {
    pub iframe_allowlist: Vec<String>,
}

/// Mirrors the style vocabulary of the word-processor format.
#[derive(Debug, Clone, Deserialize)]
pub struct GdocConfig {
    pub meta_color: String,
    pub button_color: String,
    pub code_font: String,
    pub console_font: String,
    pub infobox_positive_color: String,
    pub infobox_negative_color: String,
    pub survey_color: String,
    pub comment_border: String,
}

impl From<GdocConfig> for GdocStyles {
    fn from(config: GdocConfig) -> Self {
        GdocStyles {
            meta_color: config.meta_color.to_lowercase(),
            button_color: config.button_color.to_lowercase(),
            code_font: config.code_font.to_lowercase(),
            console_font: config.console_font.to_lowercase(),
            infobox_positive_color: config.infobox_positive_color.to_lowercase(),
            infobox_negative_color: config.infobox_negative_color.to_lowercase(),
            survey_color: config.survey_color.to_lowercase(),
            comment_border: config.comment_border.to_lowercase(),
        }
    }
}

impl From<CodelabConfig> for ParseOptions {
    fn from(config: CodelabConfig) -> Self {
        ParseOptions {
            pass_metadata: config.parser.pass_metadata.into_iter().collect(),
            iframe_allowlist: config.embed.iframe_allowlist,
            gdoc: config.gdoc.into(),
        }
    }
}

impl From<&CodelabConfig> for ParseOptions {
    fn from(config: &CodelabConfig) -> Self {
        config.clone().into()
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
    pub fn build(self) -> Result<CodelabConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<CodelabConfig, ConfigError> {
    Loader::new().build()
}
