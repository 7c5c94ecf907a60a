//! Socket connection to the oclingo server.
//!
//! One [`Connection`] carries a whole session: it is connected once, used
//! for every step and closed after `#stop.`. A closed connection is never
//! reopened.

use crate::error::{ConnectionError, Result};
use crate::protocol::{FrameDecoder, encode_frame};
use std::io::{ErrorKind, Read, Write};
use std::net::{Shutdown, TcpStream};
use std::time::Duration;

/// Default server host.
pub const DEFAULT_HOST: &str = "localhost";

/// Default server port.
pub const DEFAULT_PORT: u16 = 25277;

/// Default delay before retrying a receive that timed out.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(100);

/// Maximum number of bytes taken from the socket per read.
const READ_CHUNK: usize = 2048;

/// Lifecycle of a connection. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Not yet connected.
    Disconnected,
    /// Connected and usable.
    Connected,
    /// Closed by us or the peer.
    Closed,
}

/// Result of a single receive attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecvOutcome {
    /// A complete message (or the residue left by a broken connection).
    Message(String),
    /// Nothing arrived within the read timeout.
    Timeout,
    /// The peer closed the stream.
    Closed,
}

/// Connection to an oclingo server.
#[derive(Debug)]
pub struct Connection {
    host: String,
    port: u16,
    stream: Option<TcpStream>,
    state: ConnectionState,
    lost: bool,
    decoder: FrameDecoder,
    read_timeout: Option<Duration>,
    retry_delay: Duration,
}

impl Connection {
    /// Creates an unconnected connection to `host:port`.
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            stream: None,
            state: ConnectionState::Disconnected,
            lost: false,
            decoder: FrameDecoder::new(),
            read_timeout: None,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }

    /// Sets the delay between receive retries.
    #[must_use]
    pub const fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Sets the read timeout used by [`poll_message`](Self::poll_message).
    ///
    /// `None` blocks until data arrives. A zero duration is treated as
    /// `None`.
    pub fn set_read_timeout(&mut self, timeout: Option<Duration>) {
        self.read_timeout = timeout.filter(|t| !t.is_zero());
    }

    /// Returns the connection state.
    #[must_use]
    pub const fn state(&self) -> ConnectionState {
        self.state
    }

    /// Returns `true` if the connection ended with a socket error rather
    /// than an orderly close.
    #[must_use]
    pub const fn is_lost(&self) -> bool {
        self.lost
    }

    /// Returns `true` while the connection is usable.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    /// Returns `host:port` for messages.
    #[must_use]
    pub fn peer(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Connects to the server. Does nothing if already connected.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectionError::SessionClosed`] after [`close`](Self::close)
    /// and [`ConnectionError::ConnectFailed`] if the server is unreachable.
    pub fn connect(&mut self) -> Result<()> {
        match self.state {
            ConnectionState::Connected => return Ok(()),
            ConnectionState::Closed => return Err(ConnectionError::SessionClosed.into()),
            ConnectionState::Disconnected => {}
        }

        let stream = TcpStream::connect((self.host.as_str(), self.port)).map_err(|e| {
            ConnectionError::ConnectFailed {
                host: self.host.clone(),
                port: self.port,
                reason: e.to_string(),
            }
        })?;

        if let Err(e) = stream.set_nodelay(true) {
            tracing::debug!(error = %e, "could not disable Nagle's algorithm");
        }

        tracing::info!(peer = %self.peer(), "connected to server");
        self.stream = Some(stream);
        self.state = ConnectionState::Connected;
        Ok(())
    }

    fn stream(&mut self) -> Result<&mut TcpStream> {
        match self.state {
            ConnectionState::Disconnected => Err(ConnectionError::NotConnected.into()),
            ConnectionState::Closed => Err(ConnectionError::SessionClosed.into()),
            ConnectionState::Connected => self
                .stream
                .as_mut()
                .ok_or_else(|| ConnectionError::NotConnected.into()),
        }
    }

    /// Sends one message followed by the delimiter.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectionError::NotConnected`] before [`connect`](Self::connect),
    /// [`ConnectionError::BrokenPipe`] if the socket stopped accepting data
    /// and [`ConnectionError::Transport`] for other write failures.
    pub fn send(&mut self, text: &str) -> Result<()> {
        let frame = encode_frame(text);
        let stream = self.stream()?;
        stream.write_all(&frame).map_err(|e| match e.kind() {
            ErrorKind::WriteZero | ErrorKind::BrokenPipe | ErrorKind::ConnectionReset => {
                ConnectionError::BrokenPipe
            }
            _ => ConnectionError::Transport(e.to_string()),
        })?;
        stream.flush()?;

        tracing::debug!(bytes = frame.len(), "sent input");
        Ok(())
    }

    /// Makes one attempt to receive a message.
    ///
    /// Buffered messages are returned without touching the socket. Socket
    /// failures never escape: a failed read closes the connection and
    /// returns whatever partial message was buffered.
    ///
    /// # Errors
    ///
    /// Returns an error before [`connect`](Self::connect), or if a message
    /// is not valid UTF-8.
    pub fn poll_message(&mut self) -> Result<RecvOutcome> {
        if self.state == ConnectionState::Disconnected {
            return Err(ConnectionError::NotConnected.into());
        }

        let mut buf = [0_u8; READ_CHUNK];
        loop {
            if let Some(message) = self.decoder.next_frame()? {
                tracing::debug!(message = %message, "received");
                return Ok(RecvOutcome::Message(message));
            }

            if self.state == ConnectionState::Closed {
                return Ok(self
                    .decoder
                    .take_residue()?
                    .map_or(RecvOutcome::Closed, RecvOutcome::Message));
            }

            let timeout = self.read_timeout;
            let stream = self.stream()?;
            stream.set_read_timeout(timeout)?;

            match stream.read(&mut buf) {
                Ok(0) => {
                    tracing::debug!("socket closed by server");
                    self.decoder = FrameDecoder::new();
                    self.mark_closed();
                    return Ok(RecvOutcome::Closed);
                }
                Ok(n) => self.decoder.push(&buf[..n]),
                Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                    return Ok(RecvOutcome::Timeout);
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => {
                    tracing::warn!(error = %e, "receive failed, returning last received data");
                    self.lost = true;
                    self.mark_closed();
                }
            }
        }
    }

    /// Receives the next message, waiting as long as it takes.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectionError::PeerClosed`] once the server closed the
    /// stream, plus any error of [`poll_message`](Self::poll_message).
    pub fn receive_message(&mut self) -> Result<String> {
        loop {
            match self.poll_message()? {
                RecvOutcome::Message(message) => return Ok(message),
                RecvOutcome::Timeout => {
                    tracing::debug!("answer not yet available");
                    std::thread::sleep(self.retry_delay);
                }
                RecvOutcome::Closed => return Err(ConnectionError::PeerClosed.into()),
            }
        }
    }

    fn mark_closed(&mut self) {
        self.stream = None;
        self.state = ConnectionState::Closed;
    }

    /// Closes the connection after half-closing the write side.
    ///
    /// Closing twice only logs a warning.
    pub fn close(&mut self) {
        if self.state == ConnectionState::Closed {
            tracing::warn!("socket was already closed");
            return;
        }

        if let Some(stream) = self.stream.take()
            && let Err(e) = stream.shutdown(Shutdown::Write)
        {
            tracing::warn!(error = %e, "socket was already closed");
        }
        self.state = ConnectionState::Closed;
        tracing::debug!(peer = %self.peer(), "connection closed");
    }
}
