//! Configuration loading.
//!
//! Settings come from three layers, each overriding the one before:
//!
//! ```text
//! stock defaults  →  webp.toml  →  command-line flags
//! ```
//!
//! ## Config File
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! build_dir = "build"        # Static-site output directory to post-process
//!
//! flags = ""                 # Encoder flags for every image ...
//! # [flags]                  # ... or per extension (case-insensitive)
//! # png = "-lossless"
//! # jpg = "-q 80"
//!
//! default_flags = ""         # Fallback when [flags] has no entry for a file
//!
//! allow_skip = false         # Drop conversions that are not smaller
//! append_extension = false   # photo.jpg -> photo.jpg.webp instead of photo.webp
//! verbose = false            # Echo every encoder command line
//!
//! ignore = [
//!     "**/*.gif",            # plain strings are globs
//!     { regex = "thumb" },   # unanchored regex
//!     { glob = "**/vendor/**" },
//! ]
//! ```
//!
//! Unknown keys and unrecognized `ignore` entries are rejected so typos fail
//! before any image is touched. This module only parses; turning the values
//! into predicates and flag lists happens in [`crate::options`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::matcher::GlobError;

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "webp.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Invalid ignore regex `{pattern}`: {source}")]
    Regex {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("Invalid ignore glob: {0}")]
    Glob(#[from] GlobError),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Encoder flags: one string for everything, or a table keyed by extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlagsSetting {
    Uniform(String),
    PerExtension(BTreeMap<String, String>),
}

impl Default for FlagsSetting {
    fn default() -> Self {
        FlagsSetting::Uniform(String::new())
    }
}

/// One `ignore` entry as written in the config.
///
/// A bare string is a glob; tables pick the kind explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IgnoreSpec {
    Glob(String),
    Pattern(PatternSpec),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternSpec {
    Regex(String),
    Glob(String),
}

impl IgnoreSpec {
    pub fn glob(pattern: impl Into<String>) -> Self {
        IgnoreSpec::Glob(pattern.into())
    }

    pub fn regex(pattern: impl Into<String>) -> Self {
        IgnoreSpec::Pattern(PatternSpec::Regex(pattern.into()))
    }
}

/// Settings loaded from `webp.toml`.
///
/// All fields have defaults; a config file only lists what it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WebpConfig {
    /// Build output directory to scan for images.
    pub build_dir: String,
    /// Encoder flags, uniform or per extension.
    pub flags: FlagsSetting,
    /// Flags for files whose extension has no entry in a per-extension table.
    pub default_flags: String,
    /// Delete conversions that are not smaller than their source.
    pub allow_skip: bool,
    /// Name outputs `<name>.<ext>.webp` instead of replacing the suffix.
    pub append_extension: bool,
    /// Paths to leave alone.
    pub ignore: Vec<IgnoreSpec>,
    /// Echo encoder command lines.
    pub verbose: bool,
}

impl Default for WebpConfig {
    fn default() -> Self {
        Self {
            build_dir: "build".to_string(),
            flags: FlagsSetting::default(),
            default_flags: String::new(),
            allow_skip: false,
            append_extension: false,
            ignore: Vec::new(),
            verbose: false,
        }
    }
}

impl WebpConfig {
    /// Check structural rules serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.build_dir.trim().is_empty() {
            return Err(ConfigError::Validation("build_dir must not be empty".into()));
        }
        match &self.flags {
            FlagsSetting::Uniform(flags) => {
                if !flags.trim().is_empty() && !self.default_flags.trim().is_empty() {
                    return Err(ConfigError::Validation(
                        "default_flags only applies to a per-extension [flags] table".into(),
                    ));
                }
            }
            FlagsSetting::PerExtension(table) => {
                let mut seen = BTreeMap::new();
                for key in table.keys() {
                    let ext = normalize_extension(key)?;
                    if let Some(previous) = seen.insert(ext.clone(), key) {
                        return Err(ConfigError::Validation(format!(
                            "flags entries `{previous}` and `{key}` both name extension `{ext}`"
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}

/// Lowercase an extension key and strip one leading dot.
///
/// Keys must be non-empty and alphanumeric, e.g. `png`, `.JPG`, `tiff`.
pub fn normalize_extension(key: &str) -> Result<String, ConfigError> {
    let ext = key.trim();
    let ext = ext.strip_prefix('.').unwrap_or(ext);
    if ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ConfigError::Validation(format!(
            "flags key `{key}` is not a file extension"
        )));
    }
    Ok(ext.to_ascii_lowercase())
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(WebpConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge overlays onto a base value in order, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlays: impl IntoIterator<Item = toml::Value>,
) -> Result<WebpConfig, ConfigError> {
    let merged = overlays.into_iter().fold(base, merge_toml);
    let config: WebpConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `path`, falling back to stock defaults when it is absent.
pub fn load_config(path: &Path) -> Result<WebpConfig, ConfigError> {
    let overlay = load_raw_config(path)?;
    resolve_config(stock_defaults_value(), overlay)
}

/// Returns a fully-commented stock `webp.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# simple-webp configuration
# ==========================
# All settings are optional. Values shown below are the defaults.
# Unknown keys will cause an error.

# Static-site output directory to post-process.
build_dir = "build"

# ---------------------------------------------------------------------------
# Encoder flags
# ---------------------------------------------------------------------------
# Either one string passed to the encoder for every image:
flags = ""
#
# ...or a table keyed by file extension (case-insensitive, dot optional):
# [flags]
# png = "-lossless"
# jpg = "-q 80 -m 6"
# gif = "-lossy"

# Used for files without an entry when [flags] is a table.
default_flags = ""

# ---------------------------------------------------------------------------
# Behaviour
# ---------------------------------------------------------------------------
# Delete a conversion whose output is not smaller than its source.
allow_skip = false

# Name outputs photo.jpg.webp instead of photo.webp.
append_extension = false

# Print every encoder command line before running it.
verbose = false

# ---------------------------------------------------------------------------
# Ignored paths
# ---------------------------------------------------------------------------
# Plain strings are globs matched against the whole path ('*' crosses '/').
# Tables pick the kind explicitly: { regex = "..." } or { glob = "..." }.
# A path is left alone when any entry matches it.
ignore = []
# ignore = ["**/*.gif", { regex = "-thumb\\.(png|jpg)$" }]
"##
}
