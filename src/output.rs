//! Status reporting and number formatting.
//!
//! # Status lines
//!
//! Every user-visible line goes through a [`StatusSink`] as a
//! `(tag, message, color)` triple. The call order is the output order, so a
//! run prints like this:
//!
//! ```text
//!          run  cwebp -quiet build/images/sample.jpg -o build/images/sample.webp
//!         webp  build/images/sample.webp (12.54 % smaller)
//!         webp  build/images/hero.webp skipped
//!         webp  Converting build/images/broken.png failed
//!         webp  Total conversion savings: 1.21 KiB (24 %)
//! ```
//!
//! The `run` line only appears in verbose mode.
//!
//! # Architecture
//!
//! Line formatting ([`format_status`], [`change_percentage`], [`human_size`])
//! is pure and unit tested. [`ConsoleSink`] is the thin stdout wrapper and
//! [`MemorySink`] records lines for golden-output tests.

use crate::naming::Tool;
use std::fmt;
use std::io::IsTerminal;
use std::path::Path;

/// Tag used for every conversion status line.
pub const TAG_WEBP: &str = "webp";
/// Tag used when echoing a subprocess command line.
pub const TAG_RUN: &str = "run";
/// Tag used by the `check` command.
pub const TAG_CHECK: &str = "check";

const TAG_WIDTH: usize = 12;
const SIZE_UNITS: &[&str] = &["B", "KiB", "MiB", "GiB", "TiB", "PiB"];

/// Color hint attached to a status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Red,
    Yellow,
    Blue,
    Green,
}

impl Color {
    fn ansi_code(self) -> &'static str {
        match self {
            Color::Red => "31",
            Color::Green => "32",
            Color::Yellow => "33",
            Color::Blue => "34",
        }
    }
}

/// Receives user-visible status lines.
pub trait StatusSink {
    fn say_status(&mut self, tag: &str, message: &str, color: Option<Color>);
}

/// Render a status line: tag right-aligned in a fixed column, then the message.
///
/// With `ansi` set, the tag is wrapped in the color's escape sequence.
pub fn format_status(tag: &str, message: &str, color: Option<Color>, ansi: bool) -> String {
    let padded = format!("{tag:>TAG_WIDTH$}");
    match color {
        Some(color) if ansi => {
            format!("\x1b[1;{}m{padded}\x1b[0m  {message}", color.ansi_code())
        }
        _ => format!("{padded}  {message}"),
    }
}

/// Prints status lines to stdout.
#[derive(Debug)]
pub struct ConsoleSink {
    ansi: bool,
}

impl ConsoleSink {
    /// Colors are enabled only when stdout is a terminal.
    pub fn new() -> Self {
        Self {
            ansi: std::io::stdout().is_terminal(),
        }
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusSink for ConsoleSink {
    fn say_status(&mut self, tag: &str, message: &str, color: Option<Color>) {
        println!("{}", format_status(tag, message, color, self.ansi));
    }
}

/// One recorded status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub tag: String,
    pub message: String,
    pub color: Option<Color>,
}

impl fmt::Display for StatusLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_status(&self.tag, &self.message, self.color, false))
    }
}

/// Keeps every status line in memory, in call order.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub lines: Vec<StatusLine>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages only, in order.
    pub fn messages(&self) -> Vec<&str> {
        self.lines.iter().map(|l| l.message.as_str()).collect()
    }

    /// Lines carrying the given tag.
    pub fn with_tag<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a StatusLine> + 'a {
        self.lines.iter().filter(move |l| l.tag == tag)
    }
}

impl StatusSink for MemorySink {
    fn say_status(&mut self, tag: &str, message: &str, color: Option<Color>) {
        self.lines.push(StatusLine {
            tag: tag.to_string(),
            message: message.to_string(),
            color,
        });
    }
}

// ============================================================================
// Number formatting
// ============================================================================

/// Round to two decimals, then drop trailing zeros and a dangling point.
///
/// `12.50` → `12.5`, `24.00` → `24`, `-0.00` → `0`.
fn trim_decimal(value: f64) -> String {
    let fixed = format!("{value:.2}");
    let trimmed = if fixed.contains('.') {
        fixed.trim_end_matches('0').trim_end_matches('.')
    } else {
        fixed.as_str()
    };
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// How many percent smaller `dst_size` is than `src_size`.
///
/// ```
/// use simple_webp::output::change_percentage;
///
/// assert_eq!(change_percentage(10_000, 8746), "12.54 %");
/// assert_eq!(change_percentage(100, 76), "24 %");
/// assert_eq!(change_percentage(0, 0), "0 %");
/// ```
///
/// A destination larger than its source yields a negative percentage.
pub fn change_percentage(src_size: u64, dst_size: u64) -> String {
    if src_size == 0 {
        return "0 %".to_string();
    }
    let change = 100.0 - 100.0 * dst_size as f64 / src_size as f64;
    format!("{} %", trim_decimal(change))
}

/// Byte count in the largest binary unit that keeps the value at least 1.
///
/// ```
/// use simple_webp::output::human_size;
///
/// assert_eq!(human_size(100), "100 B");
/// assert_eq!(human_size(1234), "1.21 KiB");
/// assert_eq!(human_size(2_634_234), "2.51 MiB");
/// ```
pub fn human_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 B".to_string();
    }
    let mut exponent = 0;
    while exponent + 1 < SIZE_UNITS.len() && bytes >= 1024u64.pow(exponent as u32 + 1) {
        exponent += 1;
    }
    let value = bytes as f64 / 1024f64.powi(exponent as i32);
    format!("{} {}", trim_decimal(value), SIZE_UNITS[exponent])
}

/// Signed savings between two totals, e.g. `-1.5 KiB` when output grew.
pub fn savings_size(original_bytes: u64, converted_bytes: u64) -> String {
    if converted_bytes > original_bytes {
        format!("-{}", human_size(converted_bytes - original_bytes))
    } else {
        human_size(original_bytes - converted_bytes)
    }
}

/// One line of the `check` listing: `source → destination (tool)`.
pub fn format_candidate(source: &Path, destination: &Path, tool: Tool) -> String {
    format!("{} → {} ({tool})", source.display(), destination.display())
}
