//! CLI command implementation.
//!
//! Wires the parsed arguments to an input source, an optional local
//! server and a session whose transcript goes to stdout.

use crate::cli::parser::Cli;
use crate::error::Result;
use crate::input::{FragmentSource, InteractiveReader, QueryReader, StepBuffer};
use crate::launch::ServerProcess;
use crate::session::{Session, SessionSummary};
use std::io::{self, BufReader};

/// Executes the controller.
///
/// # Arguments
///
/// * `cli` - Parsed CLI arguments.
///
/// # Returns
///
/// Summary of the finished session.
///
/// # Errors
///
/// Returns an error if the input cannot be read, the server cannot be
/// started or reached, or the session fails.
pub fn execute(cli: &Cli) -> Result<SessionSummary> {
    let config = cli.session_config()?;
    let source = build_source(cli)?;

    let server = if cli.oclenc.is_empty() {
        None
    } else {
        let mut server = ServerProcess::spawn(&cli.oclingo_bin, &cli.oclenc, &cli.oclpar)?;
        server.wait_ready(cli.startup_delay()?)?;
        Some(server)
    };

    let mut session = Session::new(config, io::stdout())?.with_format(cli.output_format());
    let summary = session.run(source);

    if let Some(server) = server
        && let Err(e) = server.shutdown()
    {
        tracing::warn!(error = %e, "failed to stop server");
    }

    let summary = summary?;
    tracing::info!(
        end = ?summary.end,
        steps = summary.steps_received,
        answer_sets = summary.answer_sets_received,
        "session finished"
    );
    Ok(summary)
}

/// Picks the input source: the stream file if one was given, otherwise
/// stdin in classic or query mode.
///
/// # Errors
///
/// Returns an error if the stream file is invalid.
pub fn build_source(cli: &Cli) -> Result<Box<dyn FragmentSource>> {
    if let Some(buffer) = StepBuffer::from_paths(&cli.files)? {
        return Ok(Box::new(buffer));
    }

    let input = BufReader::new(io::stdin());
    if cli.query {
        Ok(Box::new(QueryReader::new(
            input,
            io::stdout(),
            cli.query_options(),
        )))
    } else {
        Ok(Box::new(InteractiveReader::new(input, io::stdout())))
    }
}
