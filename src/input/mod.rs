//! Producers of step input.
//!
//! Lines are classified by [`classify`] and assembled into fragments either
//! up front from a stream file ([`StepBuffer`]) or on demand from a
//! terminal ([`InteractiveReader`], [`QueryReader`]). All of them implement
//! [`FragmentSource`].

pub mod classify;
pub mod interactive;
pub mod stream;
pub mod traits;

pub use classify::{LineKind, classify};
pub use interactive::{InteractiveReader, QueryOptions, QueryReader, Volatility};
pub use stream::StepBuffer;
pub use traits::FragmentSource;
