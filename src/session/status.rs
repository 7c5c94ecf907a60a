//! State shared between the session driver and the input producer.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Flags and counters read and written from both sides of an asynchronous
/// session.
#[derive(Debug, Default)]
pub struct SessionStatus {
    have_answer_set: AtomicBool,
    answer_timed_out: AtomicBool,
    exit: AtomicBool,
    current_step: AtomicU64,
}

impl SessionStatus {
    /// Creates a status with all flags cleared and the step counter at 0.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            have_answer_set: AtomicBool::new(false),
            answer_timed_out: AtomicBool::new(false),
            exit: AtomicBool::new(false),
            current_step: AtomicU64::new(0),
        }
    }

    /// Whether an answer set arrived since the last fragment was taken.
    #[must_use]
    pub fn have_answer_set(&self) -> bool {
        self.have_answer_set.load(Ordering::SeqCst)
    }

    /// Records that an answer set arrived.
    pub fn set_have_answer_set(&self, value: bool) {
        self.have_answer_set.store(value, Ordering::SeqCst);
    }

    /// Whether the server took longer than the answer timeout.
    #[must_use]
    pub fn answer_timed_out(&self) -> bool {
        self.answer_timed_out.load(Ordering::SeqCst)
    }

    /// Records an answer timeout.
    pub fn set_answer_timed_out(&self, value: bool) {
        self.answer_timed_out.store(value, Ordering::SeqCst);
    }

    /// Whether the session is over.
    #[must_use]
    pub fn exit(&self) -> bool {
        self.exit.load(Ordering::SeqCst)
    }

    /// Ends the session. There is no way back.
    pub fn request_exit(&self) {
        self.exit.store(true, Ordering::SeqCst);
    }

    /// Last step announced by the server (or chosen in query mode).
    #[must_use]
    pub fn current_step(&self) -> u64 {
        self.current_step.load(Ordering::SeqCst)
    }

    /// Sets the step counter.
    pub fn set_current_step(&self, step: u64) {
        self.current_step.store(step, Ordering::SeqCst);
    }

    /// Clears the per-fragment flags once a fragment was taken.
    pub fn fragment_taken(&self) {
        self.set_have_answer_set(false);
        self.set_answer_timed_out(false);
    }
}
