//! Discovery of convertible images under the build root.
//!
//! Walks the build output recursively and keeps every regular file whose name
//! ends in a recognized image suffix (see [`crate::naming`]) and that no
//! ignore rule matches. Paths keep the build root as their prefix, which is
//! also what ignore rules are matched against:
//!
//! ```text
//! build/                           image_files(build, ..)
//! ├── index.html                   (not an image)
//! ├── empty.png                →   build/empty.png
//! ├── images/
//! │   ├── sample.jpg           →   build/images/sample.jpg
//! │   └── sample.webp              (not a source format)
//! └── vendor/logo.gif              (ignored by "**/vendor/**")
//! ```
//!
//! Results come in walk order. Entries that cannot be read below the root are
//! logged and skipped; a missing root is an error.

use crate::naming;
use crate::options::ConversionOptions;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Build directory not found: {0}")]
    RootNotFound(PathBuf),
    #[error("Build path is not a directory: {0}")]
    NotADirectory(PathBuf),
}

/// Every regular file below `root`, in walk order.
pub fn all_files_under(root: &Path) -> Result<Vec<PathBuf>, ScanError> {
    if !root.exists() {
        return Err(ScanError::RootNotFound(root.to_path_buf()));
    }
    if !root.is_dir() {
        return Err(ScanError::NotADirectory(root.to_path_buf()));
    }

    let files = WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                log::warn!("skipping unreadable entry: {err}");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .collect();
    Ok(files)
}

/// Image files below `root` that the options do not ignore.
pub fn image_files(root: &Path, options: &ConversionOptions) -> Result<Vec<PathBuf>, ScanError> {
    let images: Vec<PathBuf> = all_files_under(root)?
        .into_iter()
        .filter(|path| naming::is_image(path))
        .collect();

    let total = images.len();
    let kept: Vec<PathBuf> = images
        .into_iter()
        .filter(|path| !options.is_ignored(path))
        .collect();

    log::info!(
        "found {total} images under {}, {} ignored",
        root.display(),
        total - kept.len()
    );
    Ok(kept)
}
