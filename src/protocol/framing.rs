//! NUL-delimited message framing.
//!
//! Both directions of the oclingo protocol terminate every message with a
//! single `\0` byte. A socket read may return several messages, a part of
//! one, or both; [`FrameDecoder`] keeps whatever follows the last
//! delimiter until the rest of the message arrives.

use crate::error::{ProtocolError, Result};

/// Message delimiter on the wire.
pub const DELIMITER: u8 = b'\0';

/// Encodes one outgoing message.
///
/// # Examples
///
/// ```
/// use oclingo_controller::protocol::encode_frame;
///
/// assert_eq!(encode_frame("#stop.\n"), b"#stop.\n\0");
/// ```
#[must_use]
pub fn encode_frame(text: &str) -> Vec<u8> {
    let mut frame = Vec::with_capacity(text.len() + 1);
    frame.extend_from_slice(text.as_bytes());
    frame.push(DELIMITER);
    frame
}

/// Reassembles messages from arbitrarily split byte chunks.
#[derive(Debug, Default, Clone)]
pub struct FrameDecoder {
    residue: Vec<u8>,
}

impl FrameDecoder {
    /// Creates an empty decoder.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            residue: Vec::new(),
        }
    }

    /// Appends bytes read from the socket.
    pub fn push(&mut self, bytes: &[u8]) {
        self.residue.extend_from_slice(bytes);
    }

    /// Pops the next complete message, if one is buffered.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::InvalidUtf8`] if the message is not valid
    /// UTF-8. The message is consumed either way.
    pub fn next_frame(&mut self) -> Result<Option<String>> {
        let Some(end) = self.residue.iter().position(|&b| b == DELIMITER) else {
            return Ok(None);
        };

        let mut frame: Vec<u8> = self.residue.drain(..=end).collect();
        frame.pop();
        let text = String::from_utf8(frame).map_err(ProtocolError::from)?;
        Ok(Some(text))
    }

    /// Returns `true` if bytes of an incomplete message are buffered.
    #[must_use]
    pub fn has_residue(&self) -> bool {
        !self.residue.is_empty()
    }

    /// Takes the incomplete tail, e.g. when the connection broke and no
    /// delimiter will follow.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::InvalidUtf8`] if the tail is not valid UTF-8.
    pub fn take_residue(&mut self) -> Result<Option<String>> {
        if self.residue.is_empty() {
            return Ok(None);
        }
        let bytes = std::mem::take(&mut self.residue);
        let text = String::from_utf8(bytes).map_err(ProtocolError::from)?;
        Ok(Some(text))
    }
}
