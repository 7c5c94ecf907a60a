//! I/O utilities for the controller.
//!
//! Provides stream-file reading, memory-mapped for large files, along with
//! the Unicode helpers used for table alignment.

pub mod reader;
pub mod unicode;

pub use reader::read_lines;
pub use unicode::{grapheme_count, pad_left, pad_right};
