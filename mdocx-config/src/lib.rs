//! Shared configuration loader for the mdocx toolchain.
//!
//! `defaults/mdocx.default.toml` is embedded into every binary so that docs and
//! runtime behavior stay in sync. Applications layer user-specific files on top
//! of those defaults via [`Loader`] before deserializing into [`MdocxConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use mdocx_babel::diff::{DiffMode, DiffOptions, ReportFormat};
use mdocx_babel::render::RenderOptions;
use serde::Deserialize;
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../defaults/mdocx.default.toml");

/// Top-level configuration consumed by mdocx applications.
#[derive(Debug, Clone, Deserialize)]
pub struct MdocxConfig {
    pub convert: ConvertConfig,
    pub diff: DiffConfig,
}

/// Conversion knobs shared by both directions.
#[derive(Debug, Clone, Deserialize)]
pub struct ConvertConfig {
    /// Empty means no target pivot.
    pub zone_pivot: String,
    pub plain_markdown: bool,
    pub media_folder: String,
    pub strict_directives: bool,
    pub comment_author: String,
}

impl From<&ConvertConfig> for RenderOptions {
    fn from(config: &ConvertConfig) -> Self {
        let non_empty = |value: &str| Some(value.trim().to_string()).filter(|v| !v.is_empty());
        RenderOptions {
            zone_pivot: non_empty(&config.zone_pivot),
            plain_markdown: config.plain_markdown,
            media_folder: non_empty(&config.media_folder)
                .unwrap_or_else(|| RenderOptions::default().media_folder),
            strict_directives: config.strict_directives,
            comment_author: non_empty(&config.comment_author),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffModeConfig {
    Lines,
    Ast,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportConfig {
    Text,
    Csv,
    Markdown,
}

impl From<ReportConfig> for ReportFormat {
    fn from(config: ReportConfig) -> Self {
        match config {
            ReportConfig::Text => ReportFormat::Text,
            ReportConfig::Csv => ReportFormat::Csv,
            ReportConfig::Markdown => ReportFormat::Markdown,
        }
    }
}

/// Round-trip comparison knobs.
#[derive(Debug, Clone, Deserialize)]
pub struct DiffConfig {
    pub mode: DiffModeConfig,
    pub report: ReportConfig,
    pub ignore_marker_substitutions: bool,
    pub ignore_blank_lines: bool,
}

impl From<&DiffConfig> for DiffOptions {
    fn from(config: &DiffConfig) -> Self {
        DiffOptions {
            mode: match config.mode {
                DiffModeConfig::Lines => DiffMode::Lines,
                DiffModeConfig::Ast => DiffMode::Ast,
            },
            ignore_marker_substitutions: config.ignore_marker_substitutions,
            ignore_blank_lines: config.ignore_blank_lines,
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
    pub fn build(self) -> Result<MdocxConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<MdocxConfig, ConfigError> {
    Loader::new().build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn loads_default_config() {
        let config = load_defaults().expect("defaults to deserialize");
        assert_eq!(config.convert.media_folder, "media");
        assert!(!config.convert.plain_markdown);
        assert_eq!(config.diff.mode, DiffModeConfig::Lines);
        assert_eq!(config.diff.report, ReportConfig::Text);
    }

    #[test]
    fn defaults_convert_to_render_options() {
        let config = load_defaults().expect("defaults to deserialize");
        let options = RenderOptions::from(&config.convert);
        assert_eq!(options.zone_pivot, None);
        assert_eq!(options.comment_author.as_deref(), Some("mdocx"));
        assert!(!options.strict_directives);

        let diff = DiffOptions::from(&config.diff);
        assert_eq!(diff, DiffOptions::default());
    }

    #[test]
    fn supports_overrides() {
        let config = Loader::new()
            .set_override("convert.zone_pivot", "mac")
            .expect("override to apply")
            .set_override("diff.mode", "ast")
            .expect("override to apply")
            .build()
            .expect("config to build");
        assert_eq!(
            RenderOptions::from(&config.convert).zone_pivot.as_deref(),
            Some("mac")
        );
        assert_eq!(DiffOptions::from(&config.diff).mode, DiffMode::Ast);
    }

    #[test]
    fn user_file_replaces_only_its_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mdocx.toml");
        fs::write(&path, "[diff]\nreport = \"csv\"\n").unwrap();
        let config = Loader::new().with_file(&path).build().unwrap();
        assert_eq!(ReportFormat::from(config.diff.report), ReportFormat::Csv);
        assert!(config.diff.ignore_blank_lines);
    }

    #[test]
    fn missing_required_file_is_an_error() {
        let result = Loader::new().with_file("/nonexistent/mdocx.toml").build();
        assert!(result.is_err());
        let optional = Loader::new()
            .with_optional_file("/nonexistent/mdocx.toml")
            .build();
        assert!(optional.is_ok());
    }
}
