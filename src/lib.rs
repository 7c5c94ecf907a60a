//! # oclingo-controller
//!
//! Streaming controller for the oClingo reactive ASP server.
//!
//! The controller connects to a running oclingo server, feeds it program
//! updates one step at a time, and prints the answer sets the server
//! computes after every step. Input comes from an online stream file or is
//! typed interactively.
//!
//! ## Features
//!
//! - **Stream files**: steps separated by `#endstep.`, validated up front
//! - **Sync and async sessions**: wait for each answer, or send and receive
//!   independently with `#stop.` held back until an answer arrived
//! - **Query mode**: ad-hoc queries as volatile one-clause steps
//! - **Answer tables**: atoms grouped by their time argument

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
// Note: unsafe is needed for memory-mapped I/O (memmap2)
#![warn(unsafe_code)]

pub mod cli;
pub mod core;
pub mod error;
pub mod input;
pub mod io;
pub mod launch;
pub mod net;
pub mod protocol;
pub mod session;

// Re-export commonly used types at crate root
pub use error::{Error, Result};

// Re-export core domain types
pub use core::{AnswerSet, Fragment, StepInput, TimeKey};

// Re-export input types
pub use input::{FragmentSource, InteractiveReader, LineKind, QueryReader, StepBuffer, classify};

// Re-export protocol and connection types
pub use net::{Connection, ConnectionState, RecvOutcome};
pub use protocol::{FrameDecoder, Outcome, ResponseParser, StepResult};

// Re-export session types
pub use session::{EndReason, Mode, Pacing, Session, SessionConfig, SessionStatus, SessionSummary};

// Re-export CLI types
pub use cli::{Cli, OutputFormat};
