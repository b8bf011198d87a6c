//! Shared test utilities.
//!
//! Provides an isolated copy of the dummy build directory plus a few helpers
//! for writing sized files and comparing walk results independently of
//! walk order.
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_fixtures();
//! let files = image_files(tmp.path(), &ConversionOptions::default()).unwrap();
//! assert_eq!(sorted_names(tmp.path(), &files), FIXTURE_IMAGES.to_vec());
//! ```

use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Images in `fixtures/dummy-build/`, relative and sorted.
pub const FIXTURE_IMAGES: &[&str] = &["empty.png", "images/loader.gif", "images/sample.jpg"];

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/dummy-build/` to a temp directory and return it.
///
/// Tests get an isolated copy they can convert into without touching the
/// source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/dummy-build");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

/// Write `len` bytes to `path`, creating parent directories.
pub fn write_file(path: &Path, len: usize) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, vec![b'x'; len]).unwrap();
}

/// Paths relative to `root` with `/` separators, sorted.
pub fn sorted_names(root: &Path, paths: &[PathBuf]) -> Vec<String> {
    let mut names: Vec<String> = paths
        .iter()
        .map(|p| {
            p.strip_prefix(root)
                .unwrap_or_else(|_| panic!("{} is not under {}", p.display(), root.display()))
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join("/")
        })
        .collect();
    names.sort();
    names
}
