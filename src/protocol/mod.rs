//! Wire protocol of the oclingo server.
//!
//! [`framing`] splits the byte stream into messages; [`response`] turns
//! message lines into step results.

pub mod framing;
pub mod response;

pub use framing::{DELIMITER, FrameDecoder, encode_frame};
pub use response::{
    Outcome, ResponseLine, ResponseParser, StepResult, classify_response,
};
