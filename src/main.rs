use clap::{Parser, Subcommand, ValueEnum};
use simple_webp::config::{self, IgnoreSpec, WebpConfig};
use simple_webp::convert::Converter;
use simple_webp::encoder::{CommandEncoder, Toolchain};
use simple_webp::options::ConversionOptions;
use simple_webp::output::{self, Color, ConsoleSink, StatusSink, TAG_CHECK};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "simple-webp")]
#[command(about = "Convert the images of a static-site build to WebP")]
#[command(long_about = "\
Convert the images of a static-site build to WebP

Every .jpg/.jpeg/.png/.tif/.tiff/.gif file under the build directory gets a
WebP sibling written by cwebp (gif2webp for GIFs):

  build/
  ├── index.html
  └── images/
      ├── hero.jpg
      ├── hero.webp          # written
      ├── loader.gif
      └── loader.webp        # written by gif2webp

Settings are read from webp.toml (see 'simple-webp gen-config'); command-line
flags override the file.")]
#[command(version)]
struct Cli {
    /// Build output directory to scan [default: build]
    #[arg(long, global = true)]
    build_dir: Option<PathBuf>,

    /// Config file
    #[arg(long, default_value = config::CONFIG_FILE_NAME, global = true)]
    config: PathBuf,

    /// Echo every encoder command line
    #[arg(long, global = true)]
    verbose: bool,

    /// Delete conversions that are not smaller than their source
    #[arg(long, global = true)]
    allow_skip: bool,

    /// Name outputs photo.jpg.webp instead of photo.webp
    #[arg(long, global = true)]
    append_extension: bool,

    /// Encoder flags for every image, replacing any configured flags
    #[arg(long, global = true, allow_hyphen_values = true)]
    flags: Option<String>,

    /// Glob of paths to leave alone (repeatable)
    #[arg(long = "ignore", value_name = "GLOB", global = true)]
    ignore: Vec<String>,

    /// Regex of paths to leave alone (repeatable)
    #[arg(long = "ignore-regex", value_name = "REGEX", global = true)]
    ignore_regex: Vec<String>,

    /// Diagnostic log level
    #[arg(long, value_enum, default_value_t = LogLevel::Warn, global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert every candidate image and report the savings
    Convert,
    /// Check the WebP tools and list candidates without converting
    Check,
    /// Print a stock webp.toml with all options documented
    GenConfig,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.log_level);

    match cli.command {
        Command::Convert => {
            let mut sink = ConsoleSink::new();
            let converter = prepare(&cli, &mut sink)?;
            converter.convert(&mut sink)?;
        }
        Command::Check => {
            let mut sink = ConsoleSink::new();
            let converter = prepare(&cli, &mut sink)?;
            let candidates = converter.image_files()?;
            for source in &candidates {
                let request = converter.request_for(source);
                let line =
                    output::format_candidate(&request.source, &request.destination, request.tool);
                sink.say_status(TAG_CHECK, &line, None);
            }
            sink.say_status(
                TAG_CHECK,
                &format!(
                    "{} images under {}",
                    candidates.len(),
                    converter.build_dir().display()
                ),
                Some(Color::Green),
            );
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Resolve settings and locate the encoders.
///
/// A missing `cwebp` is reported through `sink` and ends the run.
fn prepare(
    cli: &Cli,
    sink: &mut ConsoleSink,
) -> Result<Converter<CommandEncoder>, Box<dyn std::error::Error>> {
    let config = load_config(cli)?;
    let options = ConversionOptions::resolve(&config)?;
    let toolchain = Toolchain::discover(sink)?;
    Ok(Converter::new(
        &config.build_dir,
        options,
        CommandEncoder::new(toolchain),
    ))
}

fn init_logging(level: LogLevel) {
    env_logger::Builder::new()
        .filter_level(level.into())
        .format_target(false)
        .init();
}

/// Stock defaults, then the config file, then command-line overrides.
fn load_config(cli: &Cli) -> Result<WebpConfig, config::ConfigError> {
    let file = config::load_raw_config(&cli.config)?;
    if file.is_none() {
        log::debug!("no config at {}, using defaults", cli.config.display());
    }

    let overlays = file.into_iter().chain(std::iter::once(cli_overrides(cli)));
    let mut config = config::resolve_config(config::stock_defaults_value(), overlays)?;

    config
        .ignore
        .extend(cli.ignore.iter().map(IgnoreSpec::glob));
    config
        .ignore
        .extend(cli.ignore_regex.iter().map(IgnoreSpec::regex));
    Ok(config)
}

/// Flags given on the command line as a TOML overlay.
///
/// Boolean switches can only turn a setting on. `--flags` replaces the whole
/// flag configuration, per-extension table and `default_flags` included.
fn cli_overrides(cli: &Cli) -> toml::Value {
    let mut table = toml::Table::new();
    if let Some(dir) = &cli.build_dir {
        table.insert(
            "build_dir".into(),
            toml::Value::String(dir.to_string_lossy().into_owned()),
        );
    }
    if let Some(flags) = &cli.flags {
        table.insert("flags".into(), toml::Value::String(flags.clone()));
        table.insert("default_flags".into(), toml::Value::String(String::new()));
    }
    for (key, on) in [
        ("verbose", cli.verbose),
        ("allow_skip", cli.allow_skip),
        ("append_extension", cli.append_extension),
    ] {
        if on {
            table.insert(key.into(), toml::Value::Boolean(true));
        }
    }
    toml::Value::Table(table)
}
