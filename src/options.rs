//! Resolution of loaded config into typed conversion options.
//!
//! [`WebpConfig`] mirrors the file format and keeps loosely-shaped values
//! (a flag string *or* a table, glob strings *or* regex tables). This module
//! resolves them once, up front, into:
//!
//! - a [`FlagTable`]: lowercased extension → tokenized flags, plus a fallback
//! - a list of compiled [`IgnoreRule`]s
//!
//! Any malformed entry surfaces here as a [`ConfigError`], before discovery
//! or encoding starts.

use regex::Regex;
use std::collections::BTreeMap;
use std::path::Path;

use crate::config::{
    ConfigError, FlagsSetting, IgnoreSpec, PatternSpec, WebpConfig, normalize_extension,
};
use crate::matcher::{self, Glob, IgnoreRule};
use crate::naming;

/// Split a flag string on whitespace.
pub fn tokenize_flags(flags: &str) -> Vec<String> {
    flags.split_whitespace().map(str::to_string).collect()
}

/// Per-extension encoder flags with a fallback.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlagTable {
    by_extension: BTreeMap<String, Vec<String>>,
    default: Vec<String>,
}

impl FlagTable {
    /// The same flags for every file.
    pub fn uniform(flags: &str) -> Self {
        Self {
            by_extension: BTreeMap::new(),
            default: tokenize_flags(flags),
        }
    }

    pub fn from_setting(setting: &FlagsSetting, default_flags: &str) -> Result<Self, ConfigError> {
        match setting {
            FlagsSetting::Uniform(flags) if default_flags.trim().is_empty() => {
                Ok(Self::uniform(flags))
            }
            FlagsSetting::Uniform(flags) if flags.trim().is_empty() => {
                Ok(Self::uniform(default_flags))
            }
            FlagsSetting::Uniform(_) => Err(ConfigError::Validation(
                "default_flags only applies to a per-extension [flags] table".into(),
            )),
            FlagsSetting::PerExtension(table) => {
                let mut by_extension = BTreeMap::new();
                for (key, flags) in table {
                    let ext = normalize_extension(key)?;
                    if by_extension.insert(ext.clone(), tokenize_flags(flags)).is_some() {
                        return Err(ConfigError::Validation(format!(
                            "flags table names extension `{ext}` more than once"
                        )));
                    }
                }
                Ok(Self {
                    by_extension,
                    default: tokenize_flags(default_flags),
                })
            }
        }
    }

    /// Flags for `path`, keyed on its lowercased extension.
    pub fn flags_for(&self, path: &Path) -> &[String] {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase());
        ext.and_then(|e| self.by_extension.get(&e))
            .unwrap_or(&self.default)
    }
}

/// Turn one config entry into a compiled rule.
pub fn compile_ignore(spec: &IgnoreSpec) -> Result<IgnoreRule, ConfigError> {
    match spec {
        IgnoreSpec::Glob(pattern) | IgnoreSpec::Pattern(PatternSpec::Glob(pattern)) => {
            Ok(IgnoreRule::Glob(Glob::new(pattern)?))
        }
        IgnoreSpec::Pattern(PatternSpec::Regex(pattern)) => Regex::new(pattern)
            .map(IgnoreRule::Regex)
            .map_err(|source| ConfigError::Regex {
                pattern: pattern.clone(),
                source,
            }),
    }
}

/// Fully resolved parameters for one conversion run.
#[derive(Debug, Clone, Default)]
pub struct ConversionOptions {
    flags: FlagTable,
    ignore: Vec<IgnoreRule>,
    pub allow_skip: bool,
    pub append_extension: bool,
    pub verbose: bool,
}

impl ConversionOptions {
    /// Resolve a loaded config. Fails on the first malformed entry.
    pub fn resolve(config: &WebpConfig) -> Result<Self, ConfigError> {
        let flags = FlagTable::from_setting(&config.flags, &config.default_flags)?;
        let ignore = config
            .ignore
            .iter()
            .map(compile_ignore)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            flags,
            ignore,
            allow_skip: config.allow_skip,
            append_extension: config.append_extension,
            verbose: config.verbose,
        })
    }

    /// Add another ignore rule, e.g. a callable predicate.
    pub fn with_ignore_rule(mut self, rule: IgnoreRule) -> Self {
        self.ignore.push(rule);
        self
    }

    pub fn flags_for(&self, path: &Path) -> &[String] {
        self.flags.flags_for(path)
    }

    pub fn ignore_rules(&self) -> &[IgnoreRule] {
        &self.ignore
    }

    pub fn is_ignored(&self, path: &Path) -> bool {
        matcher::any_matches(&self.ignore, path)
    }

    /// Where the WebP output for `source` goes under these options.
    pub fn destination_path(&self, source: &Path) -> std::path::PathBuf {
        naming::destination_path(source, self.append_extension)
    }
}
