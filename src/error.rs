//! Error types for controller operations.
//!
//! This module provides the error hierarchy using `thiserror` for every
//! stage of a session: configuration, stream input, the socket connection,
//! the response protocol and messages reported by the server itself.

use thiserror::Error;

/// Result type alias for controller operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Comprehensive error types for controller operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Stream input errors (invalid lines in a stream file).
    #[error("input error: {0}")]
    Input(#[from] InputError),

    /// Connection errors (connect, send, peer closed).
    #[error("connection error: {0}")]
    Connection(#[from] ConnectionError),

    /// Protocol errors (unexpected output from the server).
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Messages reported by the server (`Warning:` / `Error:` lines).
    #[error("{0}")]
    Server(#[from] ServerError),

    /// I/O errors (file operations, terminal).
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// CLI command errors.
    #[error("command error: {0}")]
    Command(#[from] CommandError),

    /// Configuration errors.
    #[error("configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },
}

impl Error {
    /// Creates a configuration error from a message.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Returns `true` if the session may continue after this error.
    ///
    /// Only warnings emitted by the server are recoverable; everything else
    /// ends the session.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Server(ServerError::Warning(_)))
    }
}

/// Errors raised while reading stream input.
#[derive(Error, Debug)]
pub enum InputError {
    /// A line that is neither a clause, a directive nor a comment.
    #[error("invalid rule '{line}' after step {step} in file '{file}'")]
    InvalidLine {
        /// The offending line, without its line terminator.
        line: String,
        /// 1-based index of the fragment being built.
        step: usize,
        /// File the line was read from.
        file: String,
    },
}

/// Errors raised by the connection to the server.
#[derive(Error, Debug)]
pub enum ConnectionError {
    /// Could not connect to the server.
    #[error("could not connect to {host}:{port}: {reason}")]
    ConnectFailed {
        /// Host name.
        host: String,
        /// Port number.
        port: u16,
        /// Underlying transport failure.
        reason: String,
    },

    /// Operation requires an established connection.
    #[error("controller is not yet connected to server")]
    NotConnected,

    /// The session was closed and cannot be reused.
    #[error("session already closed")]
    SessionClosed,

    /// The transport accepted zero bytes.
    #[error("sending input to oclingo failed: socket connection is broken")]
    BrokenPipe,

    /// The server closed the stream.
    #[error(
        "socket was closed by server, probably because '#stop.' was sent, the program is not satisfiable anymore or --imax was reached"
    )]
    PeerClosed,

    /// Any other transport failure.
    #[error("transport error: {0}")]
    Transport(String),
}

/// Errors in the server's response stream.
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// A line that matches none of the response patterns.
    #[error("unknown output received from server: {line}")]
    UnknownOutput {
        /// The offending line.
        line: String,
    },

    /// A message that is not valid UTF-8.
    #[error("invalid UTF-8 at byte offset {offset}")]
    InvalidUtf8 {
        /// Byte offset where invalid UTF-8 was found.
        offset: usize,
    },
}

/// Messages the server reports instead of answer sets.
#[derive(Error, Debug)]
pub enum ServerError {
    /// Recoverable warning, the session continues.
    #[error("Warning: {0}")]
    Warning(String),

    /// Fatal error, the session ends.
    #[error("Error: {0}")]
    Error(String),
}

/// I/O-specific errors for file and terminal operations.
#[derive(Error, Debug)]
pub enum IoError {
    /// File not found.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path to the file that was not found.
        path: String,
    },

    /// Failed to read file.
    #[error("failed to read file: {path}: {reason}")]
    ReadFailed {
        /// Path to the file.
        path: String,
        /// Reason for failure.
        reason: String,
    },

    /// Memory mapping error.
    #[error("memory mapping failed: {path}: {reason}")]
    MmapFailed {
        /// Path to the file.
        path: String,
        /// Reason for failure.
        reason: String,
    },

    /// Generic I/O error wrapper.
    #[error("I/O error: {0}")]
    Generic(String),
}

/// CLI command-specific errors.
#[derive(Error, Debug)]
pub enum CommandError {
    /// Launching the server process failed.
    #[error("failed to launch oclingo: {0}")]
    LaunchFailed(String),

    /// The transcript could not be serialized.
    #[error("output error: {0}")]
    Output(String),
}

// Implement From traits for standard library errors

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(IoError::Generic(err.to_string()))
    }
}

impl From<std::string::FromUtf8Error> for ProtocolError {
    fn from(err: std::string::FromUtf8Error) -> Self {
        Self::InvalidUtf8 {
            offset: err.utf8_error().valid_up_to(),
        }
    }
}

impl From<serde_json::Error> for CommandError {
    fn from(err: serde_json::Error) -> Self {
        Self::Output(err.to_string())
    }
}
