//! Session configuration.

use crate::net::{DEFAULT_HOST, DEFAULT_PORT, DEFAULT_RETRY_DELAY};
use std::time::Duration;

/// Default wait between socket polls and producer checks in asynchronous
/// mode.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// How input and output are interleaved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    /// Receive a step's answer, then send the next fragment.
    #[default]
    Sync,
    /// Send fragments as soon as they are available and show answers as
    /// they arrive.
    Async,
}

/// Rate at which fragments of a stream file are sent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Pacing {
    /// Send as fast as the mode allows.
    #[default]
    Immediate,
    /// Wait a fixed time before taking each fragment.
    Delay(Duration),
    /// Before taking each fragment wait until an answer set arrived, or
    /// the server took longer than `timeout`.
    AwaitAnswer {
        /// Longest wait for an answer.
        timeout: Duration,
    },
}

/// Configuration for a [`Session`](super::Session).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Server host.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Interleaving of input and output.
    pub mode: Mode,
    /// Rate of stream-file fragments.
    pub pacing: Pacing,
    /// Socket poll interval in asynchronous mode.
    pub poll_interval: Duration,
    /// Delay between receive retries.
    pub retry_delay: Duration,
    /// Predicate whose instances are carried over into the next step.
    pub carry_over: Option<String>,
    /// Echo every sent message on the transcript.
    pub echo_input: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            mode: Mode::default(),
            pacing: Pacing::default(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            retry_delay: DEFAULT_RETRY_DELAY,
            carry_over: None,
            echo_input: false,
        }
    }
}

impl SessionConfig {
    /// Creates a config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the server address.
    #[must_use]
    pub fn with_address(mut self, host: impl Into<String>, port: u16) -> Self {
        self.host = host.into();
        self.port = port;
        self
    }

    /// Sets the mode.
    #[must_use]
    pub const fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the pacing policy.
    #[must_use]
    pub const fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    /// Sets the poll interval.
    #[must_use]
    pub const fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Sets the receive retry delay.
    #[must_use]
    pub const fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Sets the carry-over predicate.
    #[must_use]
    pub fn with_carry_over(mut self, predicate: Option<String>) -> Self {
        self.carry_over = predicate;
        self
    }

    /// Enables echoing of sent input.
    #[must_use]
    pub const fn with_echo_input(mut self, echo: bool) -> Self {
        self.echo_input = echo;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SessionConfig::new();
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 25277);
        assert_eq!(config.mode, Mode::Sync);
        assert_eq!(config.pacing, Pacing::Immediate);
        assert_eq!(config.poll_interval, Duration::from_millis(100));
        assert!(config.carry_over.is_none());
    }

    #[test]
    fn test_builders() {
        let config = SessionConfig::new()
            .with_address("example.org", 4000)
            .with_mode(Mode::Async)
            .with_pacing(Pacing::Delay(Duration::from_secs(1)))
            .with_carry_over(Some("position".to_string()))
            .with_echo_input(true);
        assert_eq!(config.host, "example.org");
        assert_eq!(config.port, 4000);
        assert_eq!(config.mode, Mode::Async);
        assert_eq!(config.pacing, Pacing::Delay(Duration::from_secs(1)));
        assert_eq!(config.carry_over.as_deref(), Some("position"));
        assert!(config.echo_input);
    }
}
