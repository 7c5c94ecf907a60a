//! Binary entry point for oclingo-controller.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use clap::Parser;
use oclingo_controller::cli::output::{OutputFormat, format_error};
use oclingo_controller::cli::{Cli, execute};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);
    let format = cli.output_format();

    match execute(&cli) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            match (format, format_error(&e, format)) {
                (OutputFormat::Json, Ok(error_output)) => {
                    // JSON errors go to stdout for programmatic parsing
                    println!("{error_output}");
                }
                (OutputFormat::Text, Ok(error_output)) => {
                    eprintln!("{error_output}");
                }
                (_, Err(output_error)) => {
                    eprintln!("ERROR: {e} ({output_error})");
                }
            }
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr so they never mix with the transcript. `RUST_LOG`
/// overrides the level picked by `--debug` / `--verbose`.
fn init_logging(cli: &Cli) {
    let level = if cli.debug {
        "debug"
    } else if cli.verbose {
        "info"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
