//! Step buffer built from a stream file.
//!
//! A stream file is a sequence of steps, each closed by `#endstep.`, and
//! optionally terminated by `#stop.`:
//!
//! ```text
//! #step 1.
//! a.
//! #endstep.
//! #step 2.
//! b.
//! #endstep.
//! #stop.
//! ```
//!
//! The whole file is classified up front; the session then takes one
//! fragment per round.

use crate::core::{Fragment, StepInput};
use crate::error::{Error, InputError, Result};
use crate::input::classify::{LineKind, classify};
use crate::input::traits::FragmentSource;
use crate::io::read_lines;
use crate::session::SessionStatus;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

/// Queue of fragments waiting to be sent.
///
/// Once empty, the buffer yields [`StepInput::Stop`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepBuffer {
    fragments: VecDeque<Fragment>,
}

impl StepBuffer {
    /// Creates a buffer from already built fragments.
    #[must_use]
    pub fn new(fragments: Vec<Fragment>) -> Self {
        Self {
            fragments: fragments.into(),
        }
    }

    /// Builds the buffer from the stream-file argument list.
    ///
    /// Returns `None` when no file was given (interactive input).
    ///
    /// # Errors
    ///
    /// Returns a configuration error if more than one file was given, plus
    /// any error of [`StepBuffer::from_file`].
    pub fn from_paths(paths: &[PathBuf]) -> Result<Option<Self>> {
        match paths {
            [] => Ok(None),
            [path] => Self::from_file(path).map(Some),
            _ => Err(Error::config("more than one online file was given")),
        }
    }

    /// Reads and classifies a stream file.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the file does not exist, and an
    /// [`InputError::InvalidLine`] for the first line that is neither a
    /// program line, a comment nor a step boundary.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = path.to_string_lossy().to_string();
        if !path.exists() {
            return Err(Error::config(format!("could not find file '{file}'")));
        }

        let lines = read_lines(path)?;
        Self::from_lines(lines, &file)
    }

    /// Builds the buffer from raw lines.
    ///
    /// `file` is only used in error messages.
    ///
    /// # Errors
    ///
    /// Returns an [`InputError::InvalidLine`] for an unrecognized line.
    pub fn from_lines<I>(lines: I, file: &str) -> Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut fragments: Vec<Fragment> = Vec::new();
        let mut current: Vec<String> = Vec::new();

        for line in lines {
            match classify(&line) {
                kind if kind.is_program_line() => current.push(line),
                LineKind::CommentOrBlank => {}
                LineKind::EndStep => fragments.push(Fragment::new(std::mem::take(&mut current))),
                LineKind::Stop => break,
                _ => {
                    return Err(InputError::InvalidLine {
                        line: line.trim_end_matches(['\n', '\r']).to_string(),
                        step: fragments.len() + 1,
                        file: file.to_string(),
                    }
                    .into());
                }
            }
        }

        if !current.is_empty() {
            fragments.push(Fragment::new(current));
        }

        tracing::debug!(file, fragments = fragments.len(), "loaded stream file");
        Ok(Self::new(fragments))
    }

    /// Takes the next fragment, or `Stop` once the buffer is exhausted.
    pub fn pop_next(&mut self) -> StepInput {
        self.fragments
            .pop_front()
            .map_or(StepInput::Stop, StepInput::Fragment)
    }

    /// Returns the number of fragments left.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    /// Returns `true` if no fragment is left.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Iterates over the remaining fragments in send order.
    pub fn fragments(&self) -> impl Iterator<Item = &Fragment> {
        self.fragments.iter()
    }
}

impl FragmentSource for StepBuffer {
    fn next_input(&mut self, _status: &SessionStatus) -> Result<StepInput> {
        Ok(self.pop_next())
    }

    fn name(&self) -> &'static str {
        "file"
    }

    fn paced(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn lines(text: &str) -> Vec<String> {
        text.split_inclusive('\n').map(str::to_string).collect()
    }

    fn contents(buffer: &StepBuffer) -> Vec<Vec<String>> {
        buffer.fragments().map(|f| f.lines().to_vec()).collect()
    }

    #[test]
    fn test_two_steps_and_stop() {
        let text = "#step 1.\na.\n#endstep.\n#step 2.\nb.\n#endstep.\n#stop.\n";
        let buffer = StepBuffer::from_lines(lines(text), "online.lp").unwrap();
        assert_eq!(
            contents(&buffer),
            [vec!["#step 1.\n", "a.\n"], vec!["#step 2.\n", "b.\n"]]
        );
    }

    #[test]
    fn test_stop_keeps_open_fragment_with_content() {
        let text = "#step 1.\na.\n#stop.\n";
        let buffer = StepBuffer::from_lines(lines(text), "online.lp").unwrap();
        assert_eq!(contents(&buffer), [vec!["#step 1.\n", "a.\n"]]);
    }

    #[test]
    fn test_lines_after_stop_are_ignored() {
        let text = "a.\n#endstep.\n#stop.\nNot a clause at all\n";
        let buffer = StepBuffer::from_lines(lines(text), "online.lp").unwrap();
        assert_eq!(buffer.len(), 1);
    }

    #[test]
    fn test_comments_and_blanks_skipped() {
        let text = "% header\n\n#step 1.\n% inner\na.\n\n#endstep.\n#stop.\n";
        let buffer = StepBuffer::from_lines(lines(text), "online.lp").unwrap();
        assert_eq!(contents(&buffer), [vec!["#step 1.\n", "a.\n"]]);
    }

    #[test]
    fn test_missing_stop_drops_empty_tail() {
        let text = "#step 1.\na.\n#endstep.\n";
        let buffer = StepBuffer::from_lines(lines(text), "online.lp").unwrap();
        assert_eq!(buffer.len(), 1);
    }

    #[test]
    fn test_invalid_line_reports_step() {
        let text = "#step 1.\na.\n#endstep.\n#step 2.\nBad line\n";
        let err = StepBuffer::from_lines(lines(text), "online.lp").unwrap_err();
        match err {
            Error::Input(InputError::InvalidLine { line, step, file }) => {
                assert_eq!(line, "Bad line");
                assert_eq!(step, 2);
                assert_eq!(file, "online.lp");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_istep_not_allowed_in_files() {
        let err = StepBuffer::from_lines(lines("#istep.\n"), "online.lp").unwrap_err();
        assert!(matches!(err, Error::Input(InputError::InvalidLine { step: 1, .. })));
    }

    #[test]
    fn test_pop_next_then_stop() {
        let mut buffer = StepBuffer::new(vec![Fragment::new(vec!["a.".to_string()])]);
        assert!(matches!(buffer.pop_next(), StepInput::Fragment(_)));
        assert!(buffer.is_empty());
        assert_eq!(buffer.pop_next(), StepInput::Stop);
        assert_eq!(buffer.pop_next(), StepInput::Stop);
    }

    #[test]
    fn test_from_file_missing() {
        let err = StepBuffer::from_file("/nonexistent/online.lp").unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
        assert!(err.to_string().contains("could not find file"));
    }

    #[test]
    fn test_from_paths() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("online.lp");
        std::fs::write(&path, "#step 1.\na.\n#endstep.\n#stop.\n").unwrap();

        assert!(StepBuffer::from_paths(&[]).unwrap().is_none());

        let buffer = StepBuffer::from_paths(std::slice::from_ref(&path))
            .unwrap()
            .unwrap();
        assert_eq!(buffer.len(), 1);

        let err = StepBuffer::from_paths(&[path.clone(), path]).unwrap_err();
        assert!(err.to_string().contains("more than one online file"));
    }

    #[test]
    fn test_file_source_is_paced() {
        let buffer = StepBuffer::default();
        assert!(buffer.paced());
        assert_eq!(buffer.name(), "file");
    }
}
