//! Fragment source trait definition.
//!
//! Defines the interface between the session driver and everything that
//! produces program fragments: the preloaded stream file and the
//! interactive readers.

use crate::core::StepInput;
use crate::error::Result;
use crate::session::SessionStatus;

/// Trait for producers of step input.
///
/// Implementations must be `Send` so an asynchronous session can move the
/// source onto its producer thread. A source yields
/// [`StepInput::Fragment`] for every step and [`StepInput::Stop`] once it
/// has nothing more to send; asking again after `Stop` yields `Stop` again.
///
/// # Examples
///
/// ```
/// use oclingo_controller::core::{Fragment, StepInput};
/// use oclingo_controller::input::{FragmentSource, StepBuffer};
/// use oclingo_controller::session::SessionStatus;
///
/// let mut buffer = StepBuffer::new(vec![Fragment::new(vec!["a.\n".into()])]);
/// let status = SessionStatus::new();
/// assert!(matches!(buffer.next_input(&status).unwrap(), StepInput::Fragment(_)));
/// assert!(buffer.next_input(&status).unwrap().is_stop());
/// ```
pub trait FragmentSource: Send {
    /// Produces the next step input.
    ///
    /// May block, e.g. while waiting for a line on standard input. The
    /// shared session status gives access to the step counter.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying input cannot be read.
    fn next_input(&mut self, status: &SessionStatus) -> Result<StepInput>;

    /// Returns the name of the source, for logging.
    fn name(&self) -> &'static str;

    /// Returns whether the session's pacing policy applies to this source.
    ///
    /// Default is `false`. Preloaded sources that would otherwise flood the
    /// server override this to return `true`.
    fn paced(&self) -> bool {
        false
    }
}

impl<S: FragmentSource + ?Sized> FragmentSource for Box<S> {
    fn next_input(&mut self, status: &SessionStatus) -> Result<StepInput> {
        (**self).next_input(status)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn paced(&self) -> bool {
        (**self).paced()
    }
}
