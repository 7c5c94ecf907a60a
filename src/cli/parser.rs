//! Command-line argument parsing.
//!
//! Defines the CLI structure using clap derive macros.

use crate::cli::output::OutputFormat;
use crate::error::{Error, Result};
use crate::input::{QueryOptions, Volatility};
use crate::launch::DEFAULT_OCLINGO_BIN;
use crate::net::{DEFAULT_HOST, DEFAULT_PORT};
use crate::session::{Mode, Pacing, SessionConfig};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

/// Streaming controller for the oClingo reactive ASP server.
///
/// Sends the steps of an online stream file (or input typed on stdin) to a
/// running oclingo server and prints the answer sets it sends back.
#[derive(Parser, Debug)]
#[command(name = "oclingo-controller")]
#[command(version, about, long_about = None)]
#[command(override_usage = "oclingo-controller [online.lp] [OPTIONS]")]
pub struct Cli {
    /// Optional input stream file.
    pub files: Vec<PathBuf>,

    /// Hostname of the oclingo server.
    #[arg(short = 'n', long, env = "OCLINGO_HOST", default_value = DEFAULT_HOST)]
    pub host: String,

    /// Port the oclingo server is listening to.
    #[arg(short, long, env = "OCLINGO_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Delay in seconds between sending steps of the stream file.
    #[arg(short, long, default_value_t = 0)]
    pub time: u64,

    /// Make '-t' a time-out: send the next step as soon as an answer
    /// arrived, or after '-t' seconds without one.
    #[arg(long, visible_alias = "to")]
    pub timeout: bool,

    /// Wait for the answer set before sending new input.
    #[arg(short, long, value_enum, default_value = "yes")]
    pub wait: Wait,

    /// Show debugging output, including the input sent to the server.
    #[arg(short, long)]
    pub debug: bool,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Output format (text, json).
    #[arg(long, default_value = "text")]
    pub format: String,

    /// Add all instances of this predicate in an answer set as constraints
    /// to the next step.
    #[arg(long = "carry-over", visible_alias = "co", value_name = "PREDICATE")]
    pub carry_over: Option<String>,

    /// Wrapper mode: start oclingo on these encodings first.
    #[arg(short, long, num_args = 1.., value_name = "ENCODING")]
    pub oclenc: Vec<PathBuf>,

    /// Wrapper mode: extra oclingo command line parameters.
    #[arg(
        long,
        visible_alias = "op",
        num_args = 1..,
        allow_hyphen_values = true,
        requires = "oclenc",
        value_name = "PARAM"
    )]
    pub oclpar: Vec<String>,

    /// Wrapper mode: oclingo binary to start.
    #[arg(long, default_value = DEFAULT_OCLINGO_BIN)]
    pub oclingo_bin: String,

    /// Wrapper mode: seconds to wait for the server before connecting.
    #[arg(long, default_value_t = 2.0)]
    pub startup_delay: f64,

    /// Activate query mode.
    #[arg(short, long, conflicts_with = "files")]
    pub query: bool,

    /// Query mode: treat queries as classical clauses, not as volatile
    /// queries.
    #[arg(long = "no-volatile", visible_alias = "nv", requires = "query")]
    pub no_volatile: bool,

    /// Query mode: increment the step counter for every query and add it
    /// as last argument of the query atom.
    #[arg(long, requires = "query")]
    pub qii: bool,

    /// Query mode: keep queries for this many steps instead of one.
    #[arg(
        long = "iwindow-size",
        visible_alias = "iws",
        requires = "query",
        conflicts_with = "no_volatile",
        value_name = "STEPS"
    )]
    pub iwindow_size: Option<u64>,

    /// Query mode: advance the program to the step named by the last
    /// argument of the query atom.
    #[arg(long, requires = "query")]
    pub ainc: bool,
}

/// Values of `--wait`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Wait {
    /// Synchronous: receive, then send.
    Yes,
    /// Asynchronous: send and receive independently.
    No,
}

impl Cli {
    /// Returns the output format.
    #[must_use]
    pub fn output_format(&self) -> OutputFormat {
        OutputFormat::parse(&self.format)
    }

    /// Returns the pacing policy for stream files.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for `--timeout` without a time.
    pub fn pacing(&self) -> Result<Pacing> {
        let time = Duration::from_secs(self.time);
        match (self.timeout, self.time) {
            (true, 0) => Err(Error::config("--timeout needs a time-out given with -t")),
            (true, _) => Ok(Pacing::AwaitAnswer { timeout: time }),
            (false, 0) => Ok(Pacing::Immediate),
            (false, _) => Ok(Pacing::Delay(time)),
        }
    }

    /// Builds the session configuration.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for inconsistent options.
    pub fn session_config(&self) -> Result<SessionConfig> {
        let mode = match self.wait {
            Wait::Yes => Mode::Sync,
            Wait::No => Mode::Async,
        };
        Ok(SessionConfig::new()
            .with_address(self.host.clone(), self.port)
            .with_mode(mode)
            .with_pacing(self.pacing()?)
            .with_carry_over(self.carry_over.clone())
            .with_echo_input(self.debug))
    }

    /// Returns the query mode options.
    #[must_use]
    pub fn query_options(&self) -> QueryOptions {
        let volatility = match (self.no_volatile, self.iwindow_size) {
            (true, _) => Volatility::None,
            (false, Some(size)) => Volatility::Window(size),
            (false, None) => Volatility::Input,
        };
        QueryOptions {
            volatility,
            implicit_increment: self.qii,
            auto_increment: self.ainc,
        }
    }

    /// Returns the wrapper-mode startup delay.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for a negative or non-finite delay.
    pub fn startup_delay(&self) -> Result<Duration> {
        Duration::try_from_secs_f64(self.startup_delay)
            .map_err(|e| Error::config(format!("invalid startup delay: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("oclingo-controller").chain(args.iter().copied()))
            .unwrap()
    }

    #[test]
    fn test_cli_parse() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = parse(&[]);
        assert!(cli.files.is_empty());
        assert_eq!(cli.wait, Wait::Yes);
        assert_eq!(cli.output_format(), OutputFormat::Text);

        let config = cli.session_config().unwrap();
        assert_eq!(config.mode, Mode::Sync);
        assert_eq!(config.pacing, Pacing::Immediate);
        assert!(!config.echo_input);
    }

    #[test]
    fn test_stream_options() {
        let cli = parse(&[
            "online.lp", "-n", "solver", "-p", "4000", "-t", "2", "-w", "no", "--co", "pos",
        ]);
        assert_eq!(cli.files, [PathBuf::from("online.lp")]);

        let config = cli.session_config().unwrap();
        assert_eq!(config.host, "solver");
        assert_eq!(config.port, 4000);
        assert_eq!(config.mode, Mode::Async);
        assert_eq!(config.pacing, Pacing::Delay(Duration::from_secs(2)));
        assert_eq!(config.carry_over.as_deref(), Some("pos"));
    }

    #[test]
    fn test_timeout_pacing() {
        let cli = parse(&["online.lp", "-t", "5", "--timeout"]);
        assert_eq!(
            cli.pacing().unwrap(),
            Pacing::AwaitAnswer {
                timeout: Duration::from_secs(5)
            }
        );

        let cli = parse(&["online.lp", "--to"]);
        assert!(cli.pacing().is_err());
    }

    #[test]
    fn test_query_options() {
        let cli = parse(&["-q", "--qii", "--iws", "3"]);
        let options = cli.query_options();
        assert_eq!(options.volatility, Volatility::Window(3));
        assert!(options.implicit_increment);
        assert!(!options.auto_increment);

        let cli = parse(&["-q", "--nv", "--ainc"]);
        assert_eq!(cli.query_options().volatility, Volatility::None);
        assert!(cli.query_options().auto_increment);
    }

    #[test]
    fn test_query_conflicts_with_files() {
        let result = Cli::try_parse_from(["oclingo-controller", "online.lp", "-q"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_query_flags_require_query() {
        let result = Cli::try_parse_from(["oclingo-controller", "--qii"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_wrapper_options() {
        let cli = parse(&["-o", "enc.lp", "base.lp", "--op", "--imax=10"]);
        assert_eq!(cli.oclenc.len(), 2);
        assert_eq!(cli.oclpar, ["--imax=10"]);
        assert_eq!(cli.startup_delay().unwrap(), Duration::from_secs(2));
    }
}
