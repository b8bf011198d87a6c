//! # Simple WebP
//!
//! A post-build step for static sites: finds every JPEG, PNG, TIFF and GIF in
//! the build output and writes a WebP version next to it using the official
//! `cwebp` / `gif2webp` tools. Outputs that turn out no smaller than their
//! source can be thrown away, and the run ends with a one-line savings
//! report.
//!
//! # Pipeline
//!
//! ```text
//! webp.toml + CLI  →  WebpConfig  →  ConversionOptions     (config, options)
//! build/           →  candidate images                     (scan, matcher)
//! each candidate   →  cwebp / gif2webp  →  keep or reject  (encoder, convert)
//! totals           →  "Total conversion savings: ..."      (output)
//! ```
//!
//! Every step before encoding is a pure function of the config and the
//! directory tree, so most of the crate is tested without the WebP tools
//! installed. Encoding goes through the [`encoder::Encoder`] trait; the
//! binary uses [`encoder::CommandEncoder`], tests use a recording fake.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`config`] | `webp.toml` loading, layering with CLI overrides, validation |
//! | [`options`] | Resolves config into per-extension flags and compiled ignore rules |
//! | [`matcher`] | Glob, regex and predicate ignore rules |
//! | [`naming`] | Image suffixes, tool selection, destination naming |
//! | [`scan`] | Recursive discovery of candidate images |
//! | [`encoder`] | Encoder trait, `cwebp`/`gif2webp` subprocess backend, dependency check |
//! | [`convert`] | Per-file conversion, skip policy, running totals |
//! | [`output`] | Status lines, size and percentage formatting |
//!
//! # Output Placement
//!
//! WebP files are written beside their sources, so a page that references
//! `images/hero.jpg` can switch to `images/hero.webp` (or
//! `images/hero.jpg.webp` with `append_extension`) without any path mapping.
//! Sources are never modified.

pub mod config;
pub mod convert;
pub mod encoder;
pub mod matcher;
pub mod naming;
pub mod options;
pub mod output;
pub mod scan;

#[cfg(test)]
pub(crate) mod test_helpers;
