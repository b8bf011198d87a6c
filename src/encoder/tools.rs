//! Dependency check for the encoder binaries.
//!
//! `cwebp` is required: without it the whole step is disabled. `gif2webp` is
//! optional: when it is missing a warning is printed and GIF sources fail
//! individually while every other format still converts.

use crate::naming::Tool;
use crate::output::{Color, StatusSink, TAG_WEBP};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use thiserror::Error;

const CWEBP_HINT: &str = "Please install the latest WebP tools to get cwebp and gif2webp.";
const GIF2WEBP_HINT: &str = "Please install the latest WebP tools to convert GIF files as well.";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ToolError {
    #[error("{0}: command not found")]
    Missing(Tool),
}

/// Resolved locations of the encoder binaries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
    cwebp: PathBuf,
    gif2webp: Option<PathBuf>,
}

impl Toolchain {
    pub fn new(cwebp: PathBuf, gif2webp: Option<PathBuf>) -> Self {
        Self { cwebp, gif2webp }
    }

    pub fn path_for(&self, tool: Tool) -> Option<&Path> {
        match tool {
            Tool::Cwebp => Some(&self.cwebp),
            Tool::Gif2webp => self.gif2webp.as_deref(),
        }
    }

    /// Look both tools up on the process `PATH`.
    pub fn discover(sink: &mut dyn StatusSink) -> Result<Self, ToolError> {
        let path_var = std::env::var_os("PATH").unwrap_or_default();
        Self::discover_in(&path_var, sink)
    }

    /// Look both tools up on a `PATH`-style search list.
    ///
    /// A missing `cwebp` is reported with one red line and nothing else; a
    /// missing `gif2webp` only warns.
    pub fn discover_in(path_var: &OsStr, sink: &mut dyn StatusSink) -> Result<Self, ToolError> {
        let Some(cwebp) = find_program(Tool::Cwebp.program(), path_var) else {
            let err = ToolError::Missing(Tool::Cwebp);
            sink.say_status(TAG_WEBP, &format!("{err} {CWEBP_HINT}"), Some(Color::Red));
            return Err(err);
        };

        let gif2webp = find_program(Tool::Gif2webp.program(), path_var);
        if gif2webp.is_none() {
            sink.say_status(
                TAG_WEBP,
                &format!("{} {GIF2WEBP_HINT}", ToolError::Missing(Tool::Gif2webp)),
                Some(Color::Yellow),
            );
        }

        log::debug!("using {} and {:?}", cwebp.display(), gif2webp);
        Ok(Self { cwebp, gif2webp })
    }
}

/// Find an executable named `name` in a `PATH`-style list.
pub fn find_program(name: &str, path_var: &OsStr) -> Option<PathBuf> {
    std::env::split_paths(path_var)
        .filter(|dir| !dir.as_os_str().is_empty())
        .flat_map(|dir| candidates(&dir, name))
        .find(|candidate| is_executable(candidate))
}

#[cfg(windows)]
fn candidates(dir: &Path, name: &str) -> Vec<PathBuf> {
    vec![dir.join(format!("{name}.exe")), dir.join(name)]
}

#[cfg(not(windows))]
fn candidates(dir: &Path, name: &str) -> Vec<PathBuf> {
    vec![dir.join(name)]
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
