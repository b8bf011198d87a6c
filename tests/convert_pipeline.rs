//! End-to-end conversion runs through the public API.
//!
//! The encoder is a local recording fake so these tests do not need the WebP
//! tools installed; `command_encoder.rs` covers the subprocess path.

use simple_webp::config::{self, WebpConfig};
use simple_webp::convert::Converter;
use simple_webp::encoder::{EncodeError, EncodeRequest, Encoder};
use simple_webp::matcher::IgnoreRule;
use simple_webp::naming::Tool;
use simple_webp::options::ConversionOptions;
use simple_webp::output::{Color, MemorySink, TAG_RUN, TAG_WEBP};
use std::cell::RefCell;
use std::path::Path;
use tempfile::TempDir;

/// Writes a destination of a fixed fraction of the source size and records
/// every request. Sources whose name contains `broken` fail.
struct ShrinkingEncoder {
    percent: u64,
    seen: RefCell<Vec<EncodeRequest>>,
}

impl ShrinkingEncoder {
    fn new(percent: u64) -> Self {
        Self {
            percent,
            seen: RefCell::new(Vec::new()),
        }
    }
}

impl Encoder for ShrinkingEncoder {
    fn encode(&self, request: &EncodeRequest) -> Result<(), EncodeError> {
        self.seen.borrow_mut().push(request.clone());
        if request.source.to_string_lossy().contains("broken") {
            return Err(EncodeError::ToolUnavailable(request.tool));
        }
        let len = std::fs::metadata(&request.source).unwrap().len() * self.percent / 100;
        std::fs::write(&request.destination, vec![0u8; len as usize]).unwrap();
        Ok(())
    }
}

fn write_file(path: &Path, len: usize) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, vec![b'x'; len]).unwrap();
}

/// A small site build: two photos, a GIF, a stylesheet, and a vendored logo.
fn site() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    write_file(&root.join("index.html"), 300);
    write_file(&root.join("css/site.css"), 120);
    write_file(&root.join("img/photo.JPG"), 4000);
    write_file(&root.join("img/diagram.png"), 1000);
    write_file(&root.join("img/spinner.gif"), 2000);
    write_file(&root.join("vendor/logo.png"), 500);
    tmp
}

fn options_from_toml(toml: &str) -> ConversionOptions {
    let overlay: toml::Value = toml::from_str(toml).unwrap();
    let config = config::resolve_config(config::stock_defaults_value(), [overlay]).unwrap();
    ConversionOptions::resolve(&config).unwrap()
}

#[test]
fn converts_site_with_config_file_settings() {
    let site = site();
    let options = options_from_toml(
        r#"
allow_skip = true
default_flags = "-q 80"
ignore = [{ glob = "**/vendor/**" }]

[flags]
png = "-lossless"
"#,
    );
    let encoder = ShrinkingEncoder::new(50);
    let converter = Converter::new(site.path(), options, &encoder);
    let mut sink = MemorySink::new();

    let totals = converter.convert(&mut sink).unwrap();

    assert_eq!(totals.converted, 3);
    assert_eq!(totals.original_bytes, 7000);
    assert_eq!(totals.converted_bytes, 3500);
    assert!(site.path().join("img/photo.webp").exists());
    assert!(site.path().join("img/diagram.webp").exists());
    assert!(site.path().join("img/spinner.webp").exists());
    assert!(!site.path().join("vendor/logo.webp").exists());

    let seen = encoder.seen.borrow();
    let png = seen.iter().find(|r| r.source.ends_with("diagram.png")).unwrap();
    assert_eq!(png.flags, vec!["-lossless"]);
    let gif = seen.iter().find(|r| r.source.ends_with("spinner.gif")).unwrap();
    assert_eq!(gif.tool, Tool::Gif2webp);
    assert_eq!(gif.flags, vec!["-q", "80"]);

    assert_eq!(
        sink.lines.last().unwrap().message,
        "Total conversion savings: 3.42 KiB (50 %)"
    );
}

#[test]
fn rejected_outputs_are_deleted_and_not_counted() {
    let site = site();
    let options = options_from_toml("allow_skip = true\nappend_extension = true");
    let converter = Converter::new(site.path(), options, ShrinkingEncoder::new(120));
    let mut sink = MemorySink::new();

    let totals = converter.convert(&mut sink).unwrap();

    assert_eq!(totals.skipped, 4);
    assert_eq!(totals.converted, 0);
    assert!(!site.path().join("img/photo.JPG.webp").exists());
    assert_eq!(
        sink.with_tag(TAG_WEBP)
            .filter(|l| l.color == Some(Color::Yellow))
            .count(),
        4
    );
    assert_eq!(
        sink.lines.last().unwrap().message,
        "Total conversion savings: 0 B (0 %)"
    );
}

#[test]
fn broken_file_does_not_stop_the_batch() {
    let site = site();
    write_file(&site.path().join("img/broken.png"), 800);
    let encoder = ShrinkingEncoder::new(50);
    let converter = Converter::new(site.path(), ConversionOptions::default(), &encoder);
    let mut sink = MemorySink::new();

    let totals = converter.convert(&mut sink).unwrap();

    assert_eq!(encoder.seen.borrow().len(), 5);
    assert_eq!(totals.failed, 1);
    assert_eq!(totals.converted, 4);
    let failure = sink
        .lines
        .iter()
        .find(|l| l.color == Some(Color::Red))
        .unwrap();
    assert!(failure.message.starts_with("Converting "));
    assert!(failure.message.ends_with("broken.png failed"));
}

#[test]
fn predicate_rules_combine_with_configured_rules() {
    let site = site();
    let options = options_from_toml(r#"ignore = ["**/*.gif"]"#)
        .with_ignore_rule(IgnoreRule::predicate(|path| path.contains("vendor")));
    let converter = Converter::new(site.path(), options, ShrinkingEncoder::new(50));

    let files = converter.image_files().unwrap();

    assert_eq!(files.len(), 2);
    assert!(files.iter().all(|p| p.starts_with(site.path().join("img"))));
}

#[test]
fn verbose_run_echoes_each_command() {
    let site = site();
    let options = options_from_toml("verbose = true\nflags = \"-m 6\"");
    let converter = Converter::new(site.path(), options, ShrinkingEncoder::new(50));
    let mut sink = MemorySink::new();

    converter.convert(&mut sink).unwrap();

    let runs: Vec<_> = sink.with_tag(TAG_RUN).collect();
    assert_eq!(runs.len(), 4);
    assert!(runs.iter().any(|l| l.message.starts_with("gif2webp -m 6 -quiet ")));
    assert!(runs.iter().any(|l| l.message.starts_with("cwebp -m 6 -quiet ")));
}

#[test]
fn empty_build_reports_zero_savings() {
    let tmp = TempDir::new().unwrap();
    write_file(&tmp.path().join("index.html"), 10);
    let converter = Converter::new(
        tmp.path(),
        ConversionOptions::default(),
        ShrinkingEncoder::new(50),
    );
    let mut sink = MemorySink::new();

    let totals = converter.convert(&mut sink).unwrap();

    assert_eq!(totals, Default::default());
    assert_eq!(sink.lines.len(), 1);
    assert_eq!(sink.lines[0].message, "Total conversion savings: 0 B (0 %)");
    assert_eq!(sink.lines[0].color, Some(Color::Blue));
}

#[test]
fn stock_config_file_matches_defaults() {
    let parsed: WebpConfig = toml::from_str(config::stock_config_toml()).unwrap();
    assert_eq!(parsed, WebpConfig::default());
}
