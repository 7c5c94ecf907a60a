//! Core domain models for the controller.
//!
//! This module contains the data that flows through a session: program
//! fragments going to the server and answer sets coming back. These are
//! pure domain models with no I/O dependencies.

pub mod answer;
pub mod fragment;

pub use answer::{AnswerSet, Grouping, TimeKey, trailing_step};
pub use fragment::{END_STEP, Fragment, STOP, StepInput};
