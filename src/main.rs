use clap::{Parser, Subcommand};
use pixbatch::config::{self, AppConfig, Codec};
use pixbatch::imaging::{
    DisabledConverter, ImageConverter, RustConverter, TargetFormat, calculate_target_size,
};
use pixbatch::process::{self, BatchError};
use pixbatch::types::BatchResult;
use pixbatch::{output, scan};
use serde::Serialize;
use std::error::Error;
use std::io::Read;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pixbatch")]
#[command(about = "Batch-convert images to WebP or AVIF")]
#[command(long_about = "\
Batch-convert JPEG, PNG and WebP images to WebP or AVIF

Conversions run on a bounded worker pool. A failing file never stops the
rest of the batch: list conversion exits non-zero and names every file
that failed, directory conversion logs failures and reports counts.

Settings come from, lowest to highest precedence:
  stock defaults
  pixbatch.toml (or --config)
  DB_PATH, ASSETS_PATH, IMAGE_FORMAT
  command-line flags

Run 'pixbatch gen-config' to generate a documented pixbatch.toml.")]
#[command(version = config::version())]
struct Cli {
    /// Config file (default: ./pixbatch.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level (default: RUST_LOG, else info)
    #[arg(
        long,
        global = true,
        value_parser = ["error", "warn", "info", "debug", "trace", "off"]
    )]
    log_level: Option<String>,

    /// Target format: webp or avif
    #[arg(long, global = true)]
    format: Option<TargetFormat>,

    /// Codec: rust or disabled
    #[arg(long, global = true)]
    codec: Option<Codec>,

    /// AVIF quality, 1-100
    #[arg(long, global = true)]
    quality: Option<u32>,

    /// Workers per batch; 0 or less means 4
    #[arg(long, global = true, allow_negative_numbers = true)]
    concurrency: Option<i64>,

    /// Keep source files after converting
    #[arg(long, global = true)]
    keep_original: bool,

    /// Write output under the source's file name
    #[arg(long, global = true)]
    keep_extension: bool,

    /// Shrink to fit this width (0 = orientation default)
    #[arg(long, global = true)]
    max_width: Option<u32>,

    /// Shrink to fit this height (0 = orientation default)
    #[arg(long, global = true)]
    max_height: Option<u32>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert one or more files
    Convert {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Convert a JSON array of paths ('-' reads it from stdin)
    ConvertList { payload: String },
    /// Convert every eligible image in a directory
    Dir {
        path: PathBuf,
        /// Descend into subdirectories
        #[arg(long)]
        recursive: bool,
        /// Convert one file at a time on the calling thread
        #[arg(long)]
        sequential: bool,
    },
    /// List the files a directory conversion would pick up
    Scan {
        path: PathBuf,
        #[arg(long)]
        recursive: bool,
    },
    /// Compute the resize target for given dimensions
    Size { width: u32, height: u32 },
    /// Print the effective configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
    /// Print a stock pixbatch.toml with all options documented
    GenConfig,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Switch the target format and print the result
    SetFormat { format: String },
}

#[derive(Serialize)]
struct SizeReport {
    original: (u32, u32),
    bounds: (u32, u32),
    target: (u32, u32),
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    setup_logging(cli.log_level.as_deref());

    let mut app = config::load_config(cli.config.as_deref())?;
    app.apply_env(|key| std::env::var(key).ok());
    apply_flags(&mut app, &cli);
    app.validate()?;

    let options = app.convert_options();
    let concurrency = app.concurrency();

    match cli.command {
        Command::Convert { paths } => {
            app.bootstrap();
            let converter = converter_for(app.conversion.codec);
            let result = if paths.len() == 1 {
                process::convert_one(&*converter, &paths[0], &options).map(|p| vec![p])
            } else {
                process::convert_many(&*converter, paths, &options, concurrency)
            };
            report_list(result, cli.json)?;
        }
        Command::ConvertList { payload } => {
            app.bootstrap();
            let payload = if payload == "-" {
                let mut buf = String::new();
                std::io::stdin().read_to_string(&mut buf)?;
                buf
            } else {
                payload
            };
            let converter = converter_for(app.conversion.codec);
            let result =
                process::convert_serialized_list(&*converter, &payload, &options, concurrency);
            report_list(result, cli.json)?;
        }
        Command::Dir {
            path,
            recursive,
            sequential,
        } => {
            app.bootstrap();
            let converter = converter_for(app.conversion.codec);
            let summary = if sequential {
                process::convert_directory_sync(&*converter, &path, recursive, &options)?
            } else {
                process::convert_directory(&*converter, &path, recursive, &options, concurrency)?
            };
            if cli.json {
                print_json(&summary)?;
            } else {
                output::print_directory_summary(&path, recursive, &summary);
            }
        }
        Command::Scan { path, recursive } => {
            let found = scan::enumerate(&path, recursive)?;
            if cli.json {
                print_json(&found)?;
            } else {
                output::print_candidates(&path, &found);
            }
        }
        Command::Size { width, height } => {
            let bounds = (
                app.conversion.max_width.unwrap_or(0),
                app.conversion.max_height.unwrap_or(0),
            );
            let target = calculate_target_size((width, height), bounds);
            if cli.json {
                print_json(&SizeReport {
                    original: (width, height),
                    bounds,
                    target,
                })?;
            } else {
                println!("{}", output::format_target_size((width, height), bounds, target));
            }
        }
        Command::Config { action } => {
            if let Some(ConfigAction::SetFormat { format }) = action {
                if !app.set_image_format(&format) {
                    return Err(format!(
                        "unsupported image format: {format} (expected webp or avif)"
                    )
                    .into());
                }
            }
            if cli.json {
                print_json(&app)?;
            } else {
                output::print_config(&app);
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Initialise `env_logger`. An explicit level wins over `RUST_LOG`.
fn setup_logging(log_level: Option<&str>) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    // clap has already restricted the value to a known level name
    if let Some(filter) = log_level.and_then(|level| level.parse::<log::LevelFilter>().ok()) {
        builder.filter_level(filter);
    }
    builder.init();
}

/// Command-line flags are the top configuration layer.
fn apply_flags(app: &mut AppConfig, cli: &Cli) {
    let conv = &mut app.conversion;
    if let Some(format) = cli.format {
        conv.format = format;
    }
    if let Some(codec) = cli.codec {
        conv.codec = codec;
    }
    if let Some(quality) = cli.quality {
        conv.quality = quality;
    }
    if let Some(concurrency) = cli.concurrency {
        conv.concurrency = concurrency;
    }
    if cli.keep_original {
        conv.keep_original = true;
    }
    if cli.keep_extension {
        conv.keep_extension = true;
    }
    if cli.max_width.is_some() {
        conv.max_width = cli.max_width;
    }
    if cli.max_height.is_some() {
        conv.max_height = cli.max_height;
    }
}

fn converter_for(codec: Codec) -> Box<dyn ImageConverter> {
    match codec {
        Codec::Rust => Box::new(RustConverter::new()),
        Codec::Disabled => Box::new(DisabledConverter),
    }
}

/// Print a list conversion and turn a partial failure into a non-zero exit
/// after the report has been written.
fn report_list(
    result: Result<Vec<PathBuf>, BatchError>,
    json: bool,
) -> Result<(), Box<dyn Error>> {
    let (report, failure) = match result {
        Ok(succeeded) => (
            BatchResult {
                succeeded,
                failures: Vec::new(),
            },
            None,
        ),
        Err(BatchError::Partial(partial)) => {
            let message = partial.to_string();
            (BatchResult::from(partial), Some(message))
        }
        Err(e) => return Err(e.into()),
    };

    if json {
        print_json(&report)?;
    } else {
        output::print_batch_result(&report);
    }

    match failure {
        Some(message) => Err(message.into()),
        None => Ok(()),
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_log_levels_are_accepted() {
        for level in ["error", "warn", "info", "debug", "trace", "off"] {
            let cli = Cli::try_parse_from(["pixbatch", "--log-level", level, "gen-config"])
                .unwrap_or_else(|e| panic!("{level}: {e}"));
            assert_eq!(cli.log_level.as_deref(), Some(level));
            assert!(level.parse::<log::LevelFilter>().is_ok());
        }
    }

    #[test]
    fn unknown_log_level_is_rejected() {
        let err = Cli::try_parse_from(["pixbatch", "--log-level", "verbose", "gen-config"])
            .err()
            .unwrap();
        assert_eq!(err.kind(), clap::error::ErrorKind::InvalidValue);
    }

    #[test]
    fn log_level_is_optional() {
        let cli = Cli::try_parse_from(["pixbatch", "gen-config"]).unwrap();
        assert!(cli.log_level.is_none());
    }
}
