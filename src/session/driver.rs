//! Session driver.
//!
//! A session connects to the server, alternates between receiving step
//! results and sending fragments, and ends once `#stop.` was sent or the
//! server closed the connection.
//!
//! In synchronous mode both directions run on the calling thread: receive
//! one step, print it, take the next input, send it.
//!
//! In asynchronous mode the input source runs on a producer thread and
//! hands its fragments over a channel. The calling thread keeps sole
//! ownership of the socket: it polls the connection with a short read
//! timeout and forwards queued fragments between polls, so results are
//! printed as soon as they arrive regardless of how slowly input is typed.

use crate::cli::output::{OutputFormat, format_step_result};
use crate::core::{Fragment, STOP, StepInput};
use crate::error::{ConnectionError, Error, Result};
use crate::input::FragmentSource;
use crate::net::{Connection, RecvOutcome};
use crate::protocol::{ResponseParser, StepResult};
use crate::session::carry::CarryOver;
use crate::session::config::{Mode, Pacing, SessionConfig};
use crate::session::status::SessionStatus;
use crossbeam::channel::{self, Receiver, Sender, TryRecvError};
use std::io::Write;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// `#stop.` was sent.
    Stopped,
    /// The server closed the connection.
    PeerClosed,
    /// The connection failed with a socket error.
    ConnectionLost,
    /// The input producer went away without asking to stop; `#stop.` was
    /// sent on its behalf.
    InputExhausted,
}

/// Outcome of a finished session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    /// Why the session ended.
    pub end: EndReason,
    /// Number of completed steps received.
    pub steps_received: usize,
    /// Number of answer sets received.
    pub answer_sets_received: usize,
}

/// A controller session against one server.
pub struct Session<W: Write> {
    config: SessionConfig,
    connection: Connection,
    parser: ResponseParser,
    status: Arc<SessionStatus>,
    carry: Option<CarryOver>,
    out: W,
    format: OutputFormat,
    steps_received: usize,
    answer_sets_received: usize,
}

impl<W: Write> Session<W> {
    /// Creates a session writing its transcript to `out`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an invalid carry-over predicate.
    pub fn new(config: SessionConfig, out: W) -> Result<Self> {
        let carry = config
            .carry_over
            .as_deref()
            .map(CarryOver::new)
            .transpose()?;
        let connection =
            Connection::new(config.host.clone(), config.port).with_retry_delay(config.retry_delay);

        Ok(Self {
            config,
            connection,
            parser: ResponseParser::new(),
            status: Arc::new(SessionStatus::new()),
            carry,
            out,
            format: OutputFormat::Text,
            steps_received: 0,
            answer_sets_received: 0,
        })
    }

    /// Sets the transcript format.
    #[must_use]
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Returns the status shared with the input producer.
    #[must_use]
    pub fn status(&self) -> Arc<SessionStatus> {
        Arc::clone(&self.status)
    }

    /// Returns the transcript writer.
    pub const fn output(&self) -> &W {
        &self.out
    }

    /// Connects and runs the session until it ends.
    ///
    /// # Errors
    ///
    /// Returns connection, protocol and fatal server errors. Server
    /// warnings are logged and do not end the session.
    pub fn run<S>(&mut self, source: S) -> Result<SessionSummary>
    where
        S: FragmentSource + 'static,
    {
        self.connection.connect()?;
        tracing::info!(
            mode = ?self.config.mode,
            source = source.name(),
            "session started"
        );

        let end = match self.config.mode {
            Mode::Sync => self.run_sync(source),
            Mode::Async => self.run_async(source),
        };
        self.status.request_exit();

        let end = end?;
        match end {
            EndReason::PeerClosed => tracing::info!(
                "socket was closed by server, probably because '#stop.' was sent, \
                 the program is not satisfiable anymore or the step limit was reached"
            ),
            EndReason::ConnectionLost => tracing::warn!("connection to server was lost"),
            EndReason::Stopped | EndReason::InputExhausted => tracing::debug!("exiting"),
        }

        Ok(SessionSummary {
            end,
            steps_received: self.steps_received,
            answer_sets_received: self.answer_sets_received,
        })
    }

    fn run_sync<S: FragmentSource>(&mut self, mut source: S) -> Result<EndReason> {
        loop {
            let Some(result) = self.receive_result()? else {
                return Ok(self.closed_reason());
            };
            self.display(&result)?;

            if source.paced() {
                pace(self.config.pacing, &self.status, self.config.poll_interval);
            }
            match source.next_input(&self.status)? {
                StepInput::Fragment(fragment) => {
                    self.status.fragment_taken();
                    self.send_fragment(&fragment)?;
                }
                StepInput::Stop => {
                    self.send_stop()?;
                    return Ok(EndReason::Stopped);
                }
            }
        }
    }

    fn run_async<S>(&mut self, source: S) -> Result<EndReason>
    where
        S: FragmentSource + 'static,
    {
        let (tx, rx) = channel::bounded::<Result<StepInput>>(1);
        let status = Arc::clone(&self.status);
        let pacing = self.config.pacing;
        let poll_interval = self.config.poll_interval;

        let producer = thread::Builder::new()
            .name("input".to_string())
            .spawn(move || produce(source, &status, pacing, poll_interval, &tx))?;

        self.connection.set_read_timeout(Some(poll_interval));
        let end = self.forward_and_receive(&rx);

        self.status.request_exit();
        drop(rx);
        if producer.is_finished() {
            let _ = producer.join();
        } else {
            // blocked on input, ends with the process
            tracing::debug!("leaving input thread behind");
        }
        end
    }

    fn forward_and_receive(&mut self, rx: &Receiver<Result<StepInput>>) -> Result<EndReason> {
        let mut waiting_since = Instant::now();
        loop {
            loop {
                match rx.try_recv() {
                    Ok(Ok(StepInput::Fragment(fragment))) => {
                        self.send_fragment(&fragment)?;
                        waiting_since = Instant::now();
                    }
                    Ok(Ok(StepInput::Stop)) => {
                        self.send_stop()?;
                        return Ok(EndReason::Stopped);
                    }
                    Ok(Err(e)) => return Err(e),
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        self.send_stop()?;
                        return Ok(EndReason::InputExhausted);
                    }
                }
            }

            match self.connection.poll_message()? {
                RecvOutcome::Message(message) => {
                    self.parser.push(&message);
                    while let Some(result) = self.next_parsed()? {
                        self.display(&result)?;
                    }
                }
                RecvOutcome::Timeout => self.check_answer_timeout(waiting_since),
                RecvOutcome::Closed => return Ok(self.closed_reason()),
            }
        }
    }

    fn check_answer_timeout(&self, waiting_since: Instant) {
        let Pacing::AwaitAnswer { timeout } = self.config.pacing else {
            return;
        };
        if !self.status.have_answer_set()
            && !self.status.answer_timed_out()
            && waiting_since.elapsed() >= timeout
        {
            tracing::info!("answer timed out");
            self.status.set_answer_timed_out(true);
        }
    }

    /// Parses buffered lines, skipping over server warnings.
    fn next_parsed(&mut self) -> Result<Option<StepResult>> {
        loop {
            match self.parser.next_result() {
                Err(e) if e.is_recoverable() => tracing::warn!("{e}"),
                other => return other,
            }
        }
    }

    /// Blocks until a step completes. `None` means the server closed the
    /// connection.
    fn receive_result(&mut self) -> Result<Option<StepResult>> {
        loop {
            if let Some(result) = self.next_parsed()? {
                return Ok(Some(result));
            }
            match self.connection.receive_message() {
                Ok(message) => self.parser.push(&message),
                Err(Error::Connection(ConnectionError::PeerClosed)) => return Ok(None),
                Err(e) => return Err(e),
            }
        }
    }

    const fn closed_reason(&self) -> EndReason {
        if self.connection.is_lost() {
            EndReason::ConnectionLost
        } else {
            EndReason::PeerClosed
        }
    }

    fn display(&mut self, result: &StepResult) -> Result<()> {
        self.steps_received += 1;
        self.answer_sets_received += result.answer_sets.len();

        if let Some(step) = result.step {
            self.status.set_current_step(step);
        }
        if let Some(carry) = self.carry.as_mut() {
            for answer_set in &result.answer_sets {
                carry.observe(answer_set);
            }
        }

        write!(self.out, "{}", format_step_result(result, self.format)?)?;
        self.out.flush()?;
        self.status.set_have_answer_set(true);
        Ok(())
    }

    fn send_fragment(&mut self, fragment: &Fragment) -> Result<()> {
        let extra = self
            .carry
            .as_ref()
            .map(|carry| carry.constraints().to_vec())
            .unwrap_or_default();
        let text = fragment.render(&extra);

        if self.config.echo_input {
            write!(self.out, "Sending following input to controller:\n{text}")?;
            self.out.flush()?;
        }
        self.connection.send(&text)
    }

    fn send_stop(&mut self) -> Result<()> {
        if self.config.echo_input {
            write!(self.out, "Sending following input to controller:\n{STOP}")?;
        }
        self.connection.send(STOP)?;
        self.connection.close();
        Ok(())
    }
}

/// Waits as the pacing policy requires before taking a fragment.
fn pace(pacing: Pacing, status: &SessionStatus, poll_interval: Duration) {
    match pacing {
        Pacing::Immediate => {}
        Pacing::Delay(delay) => thread::sleep(delay),
        Pacing::AwaitAnswer { .. } => {
            while !(status.have_answer_set() || status.answer_timed_out() || status.exit()) {
                thread::sleep(poll_interval);
            }
        }
    }
}

/// Producer loop of an asynchronous session.
///
/// `Stop` is held back until the first answer set after the last fragment
/// arrived, so the server always gets to answer the final step.
fn produce<S: FragmentSource>(
    mut source: S,
    status: &SessionStatus,
    pacing: Pacing,
    poll_interval: Duration,
    tx: &Sender<Result<StepInput>>,
) {
    while !status.exit() {
        if source.paced() {
            pace(pacing, status, poll_interval);
            if status.exit() {
                return;
            }
        }

        let input = match source.next_input(status) {
            Ok(input) => input,
            Err(e) => {
                let _ = tx.send(Err(e));
                return;
            }
        };

        match input {
            StepInput::Fragment(fragment) => {
                status.fragment_taken();
                if tx.send(Ok(StepInput::Fragment(fragment))).is_err() {
                    return;
                }
            }
            StepInput::Stop => {
                if !status.have_answer_set() {
                    tracing::warn!("Ignoring '#stop.' and waiting for first answer set...");
                }
                while !status.have_answer_set() && !status.exit() {
                    thread::sleep(poll_interval);
                }
                let _ = tx.send(Ok(StepInput::Stop));
                return;
            }
        }
    }
}
