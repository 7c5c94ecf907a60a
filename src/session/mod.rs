//! Controller sessions.
//!
//! A [`Session`] drives one connection to an oclingo server from start to
//! `#stop.`, in synchronous or asynchronous [`Mode`].

pub mod carry;
pub mod config;
pub mod driver;
pub mod status;

pub use carry::CarryOver;
pub use config::{DEFAULT_POLL_INTERVAL, Mode, Pacing, SessionConfig};
pub use driver::{EndReason, Session, SessionSummary};
pub use status::SessionStatus;
