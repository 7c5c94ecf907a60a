//! Network access to the oclingo server.

pub mod connection;

pub use connection::{
    Connection, ConnectionState, DEFAULT_HOST, DEFAULT_PORT, DEFAULT_RETRY_DELAY, RecvOutcome,
};
