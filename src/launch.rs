//! Launching a local oclingo server.
//!
//! In wrapper mode the controller starts `oclingo` itself on the given
//! encodings, gives it a moment to ground the base program and open its
//! port, and stops it again when the session is over.

use crate::error::{CommandError, Error, Result};
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

/// Default server binary.
pub const DEFAULT_OCLINGO_BIN: &str = "oclingo";

/// Default wait between starting the server and connecting to it.
pub const DEFAULT_STARTUP_DELAY: Duration = Duration::from_secs(2);

/// A running server child process.
#[derive(Debug)]
pub struct ServerProcess {
    child: Option<Child>,
    program: String,
}

impl ServerProcess {
    /// Starts `program` with the encodings followed by the extra
    /// parameters.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for a missing encoding and
    /// [`CommandError::LaunchFailed`] if the process cannot be started.
    pub fn spawn(program: &str, encodings: &[PathBuf], params: &[String]) -> Result<Self> {
        if let Some(missing) = encodings.iter().find(|path| !path.exists()) {
            return Err(Error::config(format!(
                "could not find file '{}'",
                missing.display()
            )));
        }

        let child = Command::new(program)
            .args(encodings)
            .args(params)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .spawn()
            .map_err(|e| CommandError::LaunchFailed(format!("{program}: {e}")))?;

        tracing::info!(program, pid = child.id(), "started server");
        Ok(Self {
            child: Some(child),
            program: program.to_string(),
        })
    }

    /// Returns the process id.
    #[must_use]
    pub fn id(&self) -> Option<u32> {
        self.child.as_ref().map(Child::id)
    }

    /// Waits `delay` for the server to come up.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `delay` is out of range, and
    /// [`CommandError::LaunchFailed`] if the server exits during the wait.
    pub fn wait_ready(&mut self, delay: Duration) -> Result<()> {
        let deadline = Instant::now()
            .checked_add(delay)
            .ok_or_else(|| Error::config(format!("startup delay of {delay:?} is too long")))?;
        loop {
            if let Some(child) = self.child.as_mut()
                && let Some(status) = child.try_wait()?
            {
                self.child = None;
                return Err(CommandError::LaunchFailed(format!(
                    "{} exited during startup ({status})",
                    self.program
                ))
                .into());
            }

            let now = Instant::now();
            if now >= deadline {
                return Ok(());
            }
            std::thread::sleep((deadline - now).min(Duration::from_millis(50)));
        }
    }

    /// Stops the server and reaps it.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be killed or waited for.
    pub fn shutdown(mut self) -> Result<()> {
        self.stop()
    }

    fn stop(&mut self) -> Result<()> {
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };
        if child.try_wait()?.is_none() {
            tracing::debug!(program = %self.program, "stopping server");
            child.kill()?;
        }
        let status = child.wait()?;
        tracing::debug!(program = %self.program, %status, "server exited");
        Ok(())
    }
}

impl Drop for ServerProcess {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            tracing::warn!(error = %e, "failed to stop server");
        }
    }
}
