//! # rcwiden: The Main Entry Point
//!
//! Parses the command line, initialises logging, and runs either a single
//! conversion or a batch over a directory.
//!
//! With no arguments it converts `DriveSizeStrings_temp.rc` (UTF-8) into
//! `DriveSizeStrings.rc` (UTF-16LE with BOM) in the working directory, which is
//! what the Windows resource compiler wants for non-ASCII string tables.
//!
//! stdout always receives exactly one line: `Conversion successful.` or
//! `Error: <description>`. Logs go to stderr.

use std::path::PathBuf;
use std::process::ExitCode;
use clap::Parser;
use log::{debug, LevelFilter};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

mod batch;
mod converter;
mod encoder;
mod invariant;

use converter::{Conversion, DEFAULT_DESTINATION, DEFAULT_SOURCE};

const SUCCESS_LINE: &str = "Conversion successful.";

/// The Command Line Interface (CLI) configuration.
#[derive(Parser, Debug)]
#[command(name = "rcwiden")]
#[command(about = "Convert a UTF-8 .rc script into UTF-16LE with a byte-order mark", long_about = None)]
struct Cli {
    /// Source file, decoded as UTF-8.
    #[arg(short, long, default_value = DEFAULT_SOURCE, conflicts_with = "all")]
    input: PathBuf,

    /// Destination file, created or overwritten.
    #[arg(short, long, default_value = DEFAULT_DESTINATION, conflicts_with = "all")]
    output: PathBuf,

    /// Convert every `*_temp.rc` file in DIR to the same name without `_temp`.
    #[arg(long, value_name = "DIR")]
    all: Option<PathBuf>,

    /// Exit with status 1 when a conversion fails.
    ///
    /// Without this flag the process exits 0 even on failure, so existing build
    /// scripts that ignore the status keep working.
    #[arg(long)]
    strict: bool,

    /// Turn on logging (stderr). Without it nothing is logged.
    ///
    /// - `-v`: Info
    /// - `-vv`: Debug
    /// - `-vvv`: Trace
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// The line to print and whether the run counts as a success.
#[derive(Debug, PartialEq, Eq)]
struct Outcome {
    line: String,
    success: bool,
}

impl Outcome {
    fn success() -> Self {
        Self { line: SUCCESS_LINE.to_string(), success: true }
    }

    fn failure(description: impl std::fmt::Display) -> Self {
        Self { line: format!("Error: {}", description), success: false }
    }
}

fn run(cli: &Cli) -> Outcome {
    match &cli.all {
        Some(dir) => match batch::convert_all(dir) {
            Ok(summary) if summary.is_success() => {
                debug!("Converted {} file(s) in {:?}", summary.converted.len(), dir);
                Outcome::success()
            }
            Ok(summary) => Outcome::failure(format_args!(
                "{} of {} files failed to convert",
                summary.failed.len(),
                summary.total()
            )),
            Err(e) => {
                debug!("Batch conversion failed: {}", e);
                Outcome::failure(e)
            }
        },
        None => {
            let conversion = Conversion::new(&cli.input, &cli.output);
            match converter::convert_file(&conversion) {
                Ok(report) => {
                    debug!(
                        "{} chars, {} UTF-16 code units, {} bytes written",
                        report.chars, report.code_units, report.bytes_written
                    );
                    Outcome::success()
                }
                Err(e) => {
                    debug!("Conversion failed: {}", e);
                    Outcome::failure(e)
                }
            }
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logging failure shouldn't stop the conversion.
    let _ = TermLogger::init(log_level(cli.verbose), Config::default(), TerminalMode::Stderr, ColorChoice::Auto);

    let outcome = run(&cli);
    println!("{}", outcome.line);

    ExitCode::from(exit_status(&outcome, cli.strict))
}

/// Silent by default: the result line on stdout is the whole console output.
fn log_level(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Off,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// 0 unless the run failed under `--strict`.
fn exit_status(outcome: &Outcome, strict: bool) -> u8 {
    if !outcome.success && strict { 1 } else { 0 }
}
