//! CLI layer for the controller.
//!
//! Provides the command-line interface using clap, the command that runs a
//! session, and the transcript formatting.

pub mod commands;
pub mod output;
pub mod parser;

pub use commands::execute;
pub use output::OutputFormat;
pub use parser::{Cli, Wait};
