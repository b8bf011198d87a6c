//! One conversion pass over a build directory.
//!
//! ```text
//! image_files(build_dir)          discovery + ignore rules
//!     │
//!     ├─ sample.jpg ─ encode ─ sizes ─ kept      → "sample.webp (12.54 % smaller)"
//!     ├─ hero.png   ─ encode ─ sizes ─ rejected  → "hero.webp skipped" (output deleted)
//!     └─ anim.gif   ─ encode ✗                   → "Converting anim.gif failed"
//!     │
//! summary                                        → "Total conversion savings: ..."
//! ```
//!
//! Files are handled one at a time, in discovery order. Each file ends in a
//! typed `Result<ConversionResult, ConversionFailure>` and a failure never
//! stops the batch. Totals only count kept conversions.
//!
//! A destination that is the same size as its source counts as "not smaller"
//! and is rejected when `allow_skip` is on.

use crate::encoder::{EncodeError, EncodeRequest, Encoder};
use crate::naming;
use crate::options::ConversionOptions;
use crate::output::{self, Color, StatusSink, TAG_RUN, TAG_WEBP};
use crate::scan::{self, ScanError};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Why a single file could not be converted.
#[derive(Error, Debug)]
pub enum ConversionFailure {
    #[error(transparent)]
    Encode(#[from] EncodeError),
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ConversionFailure {
    fn io(path: &Path) -> impl FnOnce(std::io::Error) -> Self + '_ {
        move |source| ConversionFailure::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Outcome of one successful encoder run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionResult {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub source_size: u64,
    pub destination_size: u64,
    /// False when the output was rejected and deleted.
    pub kept: bool,
}

/// Byte and file counts for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunningTotals {
    /// Sum of source sizes over kept conversions.
    pub original_bytes: u64,
    /// Sum of destination sizes over kept conversions.
    pub converted_bytes: u64,
    pub converted: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl RunningTotals {
    pub fn record(&mut self, result: &ConversionResult) {
        if result.kept {
            self.original_bytes += result.source_size;
            self.converted_bytes += result.destination_size;
            self.converted += 1;
        } else {
            self.skipped += 1;
        }
    }

    pub fn record_failure(&mut self) {
        self.failed += 1;
    }

    /// Bytes saved; negative when the outputs grew.
    pub fn savings(&self) -> i128 {
        self.original_bytes as i128 - self.converted_bytes as i128
    }

    /// The summary status line message.
    pub fn summary_message(&self) -> String {
        format!(
            "Total conversion savings: {} ({})",
            output::savings_size(self.original_bytes, self.converted_bytes),
            output::change_percentage(self.original_bytes, self.converted_bytes)
        )
    }
}

impl fmt::Display for RunningTotals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} converted, {} skipped, {} failed",
            self.converted, self.skipped, self.failed
        )
    }
}

/// Converts the images of one build directory.
pub struct Converter<E> {
    build_dir: PathBuf,
    options: ConversionOptions,
    encoder: E,
}

impl<E: Encoder> Converter<E> {
    pub fn new(build_dir: impl Into<PathBuf>, options: ConversionOptions, encoder: E) -> Self {
        Self {
            build_dir: build_dir.into(),
            options,
            encoder,
        }
    }

    pub fn build_dir(&self) -> &Path {
        &self.build_dir
    }

    /// Candidate sources under the build directory.
    pub fn image_files(&self) -> Result<Vec<PathBuf>, ScanError> {
        scan::image_files(&self.build_dir, &self.options)
    }

    /// The encoder invocation for `source`.
    pub fn request_for(&self, source: &Path) -> EncodeRequest {
        EncodeRequest {
            tool: naming::tool_for(source),
            source: source.to_path_buf(),
            destination: self.options.destination_path(source),
            flags: self.options.flags_for(source).to_vec(),
        }
    }

    /// Encode one file and apply the keep/reject policy.
    ///
    /// A rejected output is deleted before returning.
    pub fn convert_file(
        &self,
        request: &EncodeRequest,
    ) -> Result<ConversionResult, ConversionFailure> {
        self.encoder.encode(request)?;

        let source_size = std::fs::metadata(&request.source)
            .map_err(ConversionFailure::io(&request.source))?
            .len();
        let destination_size = std::fs::metadata(&request.destination)
            .map_err(ConversionFailure::io(&request.destination))?
            .len();

        let kept = !(self.options.allow_skip && destination_size >= source_size);
        if !kept {
            std::fs::remove_file(&request.destination)
                .map_err(ConversionFailure::io(&request.destination))?;
        }

        Ok(ConversionResult {
            source: request.source.clone(),
            destination: request.destination.clone(),
            source_size,
            destination_size,
            kept,
        })
    }

    /// Run a full pass: discover, convert each file, print the summary.
    ///
    /// Only discovery errors are returned; per-file failures are reported
    /// through `sink` and counted.
    pub fn convert(&self, sink: &mut dyn StatusSink) -> Result<RunningTotals, ScanError> {
        let sources = self.image_files()?;
        let mut totals = RunningTotals::default();

        for source in &sources {
            let request = self.request_for(source);
            if self.options.verbose {
                sink.say_status(TAG_RUN, &request.command_line(), None);
            }

            match self.convert_file(&request) {
                Ok(result) => {
                    totals.record(&result);
                    report_result(&result, sink);
                }
                Err(err) => {
                    log::warn!("converting {} failed: {err}", source.display());
                    totals.record_failure();
                    sink.say_status(
                        TAG_WEBP,
                        &format!("Converting {} failed", source.display()),
                        Some(Color::Red),
                    );
                }
            }
        }

        sink.say_status(TAG_WEBP, &totals.summary_message(), Some(Color::Blue));
        log::info!("{totals}");
        Ok(totals)
    }
}

fn report_result(result: &ConversionResult, sink: &mut dyn StatusSink) {
    if result.kept {
        sink.say_status(
            TAG_WEBP,
            &format!(
                "{} ({} smaller)",
                result.destination.display(),
                output::change_percentage(result.source_size, result.destination_size)
            ),
            None,
        );
    } else {
        sink.say_status(
            TAG_WEBP,
            &format!("{} skipped", result.destination.display()),
            Some(Color::Yellow),
        );
    }
}
