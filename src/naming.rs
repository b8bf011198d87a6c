//! Image-suffix recognition and the destination naming rule.
//!
//! Every stage agrees on one set of convertible suffixes:
//! `jpg`, `jpeg`, `png`, `tif`, `tiff` and `gif`, compared case-insensitively
//! against the end of the file name. No dot is required in front of the
//! suffix, which keeps discovery and renaming in lockstep.
//!
//! ## Destination names
//!
//! The WebP file always lands next to its source:
//!
//! - `images/sample.jpg` → `images/sample.webp` (default)
//! - `images/sample.jpg` → `images/sample.jpg.webp` (`append_extension = true`)
//! - `images/Banner.TIFF` → `images/Banner.webp`
//!
//! ## Encoders
//!
//! GIF sources go through `gif2webp` so animations survive; every other
//! format goes through `cwebp`.

use std::borrow::Cow;
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::{Path, PathBuf};

/// Suffixes accepted for conversion, lowercase.
///
/// No entry is a suffix of another entry, so at most one can match a name.
pub const IMAGE_SUFFIXES: &[&str] = &["jpeg", "jpg", "png", "tiff", "tif", "gif"];

/// External encoder binary responsible for one source format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tool {
    /// General-purpose encoder for JPEG, PNG and TIFF sources.
    Cwebp,
    /// Animated-GIF encoder.
    Gif2webp,
}

impl Tool {
    /// Executable name looked up on `PATH`.
    pub fn program(self) -> &'static str {
        match self {
            Tool::Cwebp => "cwebp",
            Tool::Gif2webp => "gif2webp",
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.program())
    }
}

/// Return the recognized image suffix at the end of `name`, lowercased.
pub fn image_suffix(name: &str) -> Option<&'static str> {
    suffix_of(name.as_bytes())
}

fn suffix_of(name: &[u8]) -> Option<&'static str> {
    IMAGE_SUFFIXES
        .iter()
        .copied()
        .find(|suffix| ends_with_ignore_case(name, suffix))
}

fn ends_with_ignore_case(name: &[u8], suffix: &str) -> bool {
    name.len() >= suffix.len()
        && name[name.len() - suffix.len()..].eq_ignore_ascii_case(suffix.as_bytes())
}

/// Raw bytes of a file name. Suffixes are ASCII, so matching on bytes works
/// for names that are not valid UTF-8.
#[cfg(unix)]
fn name_bytes(name: &OsStr) -> Cow<'_, [u8]> {
    use std::os::unix::ffi::OsStrExt;
    Cow::Borrowed(name.as_bytes())
}

#[cfg(not(unix))]
fn name_bytes(name: &OsStr) -> Cow<'_, [u8]> {
    match name.to_string_lossy() {
        Cow::Borrowed(s) => Cow::Borrowed(s.as_bytes()),
        Cow::Owned(s) => Cow::Owned(s.into_bytes()),
    }
}

#[cfg(unix)]
fn name_from_bytes(bytes: Vec<u8>) -> OsString {
    use std::os::unix::ffi::OsStringExt;
    OsString::from_vec(bytes)
}

#[cfg(not(unix))]
fn name_from_bytes(bytes: Vec<u8>) -> OsString {
    OsString::from(String::from_utf8_lossy(&bytes).into_owned())
}

/// Whether the path's file name ends in a convertible image suffix.
pub fn is_image(path: &Path) -> bool {
    path.file_name()
        .is_some_and(|name| suffix_of(&name_bytes(name)).is_some())
}

/// Pick the encoder for a source file.
pub fn tool_for(path: &Path) -> Tool {
    let is_gif = path
        .file_name()
        .is_some_and(|name| ends_with_ignore_case(&name_bytes(name), "gif"));
    if is_gif { Tool::Gif2webp } else { Tool::Cwebp }
}

/// Compute where the WebP output for `source` goes.
///
/// With `append_extension` the full file name is kept and `.webp` appended.
/// Otherwise the trailing image suffix is swapped for `webp`. A name without
/// a recognized suffix is left untouched in that mode, so callers should only
/// pass paths that survived discovery. Names are handled as raw bytes and
/// never re-encoded.
pub fn destination_path(source: &Path, append_extension: bool) -> PathBuf {
    let name = source.file_name().unwrap_or_default();

    let dst_name = if append_extension {
        let mut dst = name.to_os_string();
        dst.push(".webp");
        dst
    } else {
        let bytes = name_bytes(name);
        match suffix_of(&bytes) {
            Some(suffix) => {
                let mut dst = bytes[..bytes.len() - suffix.len()].to_vec();
                dst.extend_from_slice(b"webp");
                name_from_bytes(dst)
            }
            None => name.to_os_string(),
        }
    };

    match source.parent() {
        Some(parent) => parent.join(dst_name),
        None => PathBuf::from(dst_name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn destination_replaces_suffix() {
        let d = destination_path(Path::new("build/images/sample.jpg"), false);
        assert_eq!(d, PathBuf::from("build/images/sample.webp"));
    }

    #[test]
    fn destination_appends_extension() {
        let d = destination_path(Path::new("build/images/sample.jpg"), true);
        assert_eq!(d, PathBuf::from("build/images/sample.jpg.webp"));
    }

    #[test]
    fn destination_handles_uppercase_and_long_suffixes() {
        assert_eq!(
            destination_path(Path::new("a/Banner.TIFF"), false),
            PathBuf::from("a/Banner.webp")
        );
        assert_eq!(
            destination_path(Path::new("a/photo.JPEG"), false),
            PathBuf::from("a/photo.webp")
        );
        assert_eq!(
            destination_path(Path::new("a/scan.tif"), false),
            PathBuf::from("a/scan.webp")
        );
    }

    #[test]
    fn destination_does_not_duplicate_dot() {
        let d = destination_path(Path::new("sample.png"), false);
        assert_eq!(d, PathBuf::from("sample.webp"));
        assert!(!d.to_string_lossy().contains(".webp.webp"));
    }

    #[test]
    fn destination_only_touches_trailing_suffix() {
        let d = destination_path(Path::new("img/png-logo.png"), false);
        assert_eq!(d, PathBuf::from("img/png-logo.webp"));
    }

    #[cfg(unix)]
    #[test]
    fn destination_keeps_non_utf8_bytes() {
        use std::os::unix::ffi::OsStrExt;
        let dir = Path::new("build/images");
        let source = dir.join(OsStr::from_bytes(b"caf\xe9.JPG"));

        assert!(is_image(&source));
        assert_eq!(
            destination_path(&source, false),
            dir.join(OsStr::from_bytes(b"caf\xe9.webp"))
        );
        assert_eq!(
            destination_path(&source, true),
            dir.join(OsStr::from_bytes(b"caf\xe9.JPG.webp"))
        );
    }

    #[cfg(unix)]
    #[test]
    fn tool_for_non_utf8_gif() {
        use std::os::unix::ffi::OsStrExt;
        let source = Path::new("b").join(OsStr::from_bytes(b"\xff\xfeanim.GIF"));
        assert_eq!(tool_for(&source), Tool::Gif2webp);
    }

    #[test]
    fn tool_for_gif() {
        assert_eq!(tool_for(Path::new("/some/path/image.gif")), Tool::Gif2webp);
        assert_eq!(tool_for(Path::new("/some/path/image.GIF")), Tool::Gif2webp);
    }

    #[test]
    fn tool_for_other_formats() {
        for name in ["image.jpg", "image.jpeg", "image.png", "image.tif", "image.tiff"] {
            let path = Path::new("/some/path").join(name);
            assert_eq!(tool_for(&path), Tool::Cwebp, "{name}");
        }
    }

    #[test]
    fn is_image_recognizes_suffixes_case_insensitively() {
        assert!(is_image(Path::new("a/b.JPG")));
        assert!(is_image(Path::new("a/b.Png")));
        assert!(is_image(Path::new("a/b.tiff")));
        assert!(!is_image(Path::new("a/b.webp")));
        assert!(!is_image(Path::new("a/index.html")));
        assert!(!is_image(Path::new("a/gif/readme.md")));
    }

    #[test]
    fn image_suffix_matches_exactly_one() {
        assert_eq!(image_suffix("x.jpeg"), Some("jpeg"));
        assert_eq!(image_suffix("x.jpg"), Some("jpg"));
        assert_eq!(image_suffix("x.tif"), Some("tif"));
        assert_eq!(image_suffix("x.TIFF"), Some("tiff"));
        assert_eq!(image_suffix("x.svg"), None);
    }

    #[test]
    fn tool_program_names() {
        assert_eq!(Tool::Cwebp.program(), "cwebp");
        assert_eq!(Tool::Gif2webp.to_string(), "gif2webp");
    }
}
