//! Program fragments.
//!
//! A fragment is one step's worth of program update: the raw lines between
//! two `#endstep.` boundaries. Fragments are built once and consumed once.


/// Directive that terminates every fragment on the wire.
pub const END_STEP: &str = "#endstep.\n";

/// Directive that ends the session.
pub const STOP: &str = "#stop.\n";

/// One step's worth of program text.
///
/// # Examples
///
/// ```
/// use oclingo_controller::core::Fragment;
///
/// let fragment = Fragment::new(vec!["#step 1.\n".to_string(), "a.\n".to_string()]);
/// assert_eq!(fragment.render(&[]), "#step 1.\na.\n#endstep.\n");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fragment {
    lines: Vec<String>,
}

impl Fragment {
    /// Creates a fragment from raw lines.
    ///
    /// Lines lacking a terminating newline get one, so the rendered text
    /// always has one statement per line.
    #[must_use]
    pub fn new(lines: Vec<String>) -> Self {
        let lines = lines
            .into_iter()
            .map(|mut line| {
                if !line.ends_with('\n') {
                    line.push('\n');
                }
                line
            })
            .collect();
        Self { lines }
    }

    /// Returns the raw lines of the fragment.
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Returns `true` if the fragment holds no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Returns the number of lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Renders the wire text for this fragment.
    ///
    /// `extra` lines (carry-over constraints) are inserted after the
    /// fragment's own lines and before the closing `#endstep.`.
    #[must_use]
    pub fn render(&self, extra: &[String]) -> String {
        let mut text: String = self.lines.concat();
        for line in extra {
            text.push_str(line);
            if !line.ends_with('\n') {
                text.push('\n');
            }
        }
        text.push_str(END_STEP);
        text
    }
}

/// The next unit of input for the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepInput {
    /// A fragment to send.
    Fragment(Fragment),
    /// No more input: send `#stop.`.
    Stop,
}

impl StepInput {
    /// Returns `true` for [`StepInput::Stop`].
    #[must_use]
    pub const fn is_stop(&self) -> bool {
        matches!(self, Self::Stop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fragment_new_adds_newlines() {
        let fragment = Fragment::new(vec!["a.".to_string(), "b.\n".to_string()]);
        assert_eq!(fragment.lines(), ["a.\n", "b.\n"]);
        assert_eq!(fragment.len(), 2);
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(Fragment::default().render(&[]), "#endstep.\n");
    }

    #[test]
    fn test_render_with_extra() {
        let fragment = Fragment::new(vec!["#step 2.\n".to_string()]);
        let extra = vec![":- not position(1,2).".to_string()];
        assert_eq!(
            fragment.render(&extra),
            "#step 2.\n:- not position(1,2).\n#endstep.\n"
        );
    }

    #[test]
    fn test_step_input_is_stop() {
        assert!(StepInput::Stop.is_stop());
        assert!(!StepInput::Fragment(Fragment::default()).is_stop());
    }
}
