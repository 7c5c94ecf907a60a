//! Response parsing.
//!
//! The server answers each step with a sequence of lines:
//!
//! ```text
//! Step: 2
//! a(1) b(2)
//! Input:
//! End of Step.
//! ```
//!
//! Lines may arrive in one message or spread over several. The
//! [`ResponseParser`] keeps its state between messages and yields a
//! [`StepResult`] once a step is complete.

use crate::core::AnswerSet;
use crate::error::{ProtocolError, Result, ServerError};
use regex::Regex;
use std::collections::VecDeque;
use std::sync::OnceLock;

/// One line of server output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseLine {
    /// `Step: N`
    Step(u64),
    /// A space separated list of atoms.
    Answer(Vec<String>),
    /// `Input:`
    Input,
    /// `End of Step.`
    EndOfStep,
    /// `Warning: ...`, the message after the label.
    Warning(String),
    /// `Error: ...`, the message after the label.
    Error(String),
    /// `UNSAT at step N`
    Unsat(u64),
}

#[derive(Debug, Clone, Copy)]
enum Pattern {
    Step,
    Answer,
    Input,
    EndOfStep,
    Warning,
    Error,
    Unsat,
}

impl Pattern {
    /// Patterns in match order.
    const ALL: [Self; 7] = [
        Self::Step,
        Self::Answer,
        Self::Input,
        Self::EndOfStep,
        Self::Warning,
        Self::Error,
        Self::Unsat,
    ];

    #[allow(clippy::expect_used)]
    fn regex(self) -> &'static Regex {
        macro_rules! static_regex {
            ($name:ident, $pattern:expr) => {{
                static $name: OnceLock<Regex> = OnceLock::new();
                $name.get_or_init(|| Regex::new($pattern).expect("valid regex"))
            }};
        }

        match self {
            Self::Step => static_regex!(STEP, r"^Step: (\d+)$"),
            Self::Answer => static_regex!(ANSWER, r"^(-?[a-z_][a-zA-Z0-9_]*(\(.+?\))? *)+$"),
            Self::Input => static_regex!(INPUT, r"^Input:$"),
            Self::EndOfStep => static_regex!(END_OF_STEP, r"^End of Step\.$"),
            Self::Warning => static_regex!(WARNING, r"^Warning: (.+)$"),
            Self::Error => static_regex!(ERROR, r"^Error: (.+)$"),
            Self::Unsat => static_regex!(UNSAT, r"^UNSAT at step (\d+)$"),
        }
    }
}

fn captured_number(caps: &regex::Captures<'_>) -> Option<u64> {
    caps.get(1)?.as_str().parse().ok()
}

fn captured_text(caps: &regex::Captures<'_>) -> Option<String> {
    Some(caps.get(1)?.as_str().trim().to_string())
}

/// Classifies one line of server output.
///
/// # Errors
///
/// Returns [`ProtocolError::UnknownOutput`] for a line matching no pattern,
/// including the empty line.
///
/// # Examples
///
/// ```
/// use oclingo_controller::protocol::{ResponseLine, classify_response};
///
/// assert_eq!(classify_response("Step: 3").unwrap(), ResponseLine::Step(3));
/// assert!(classify_response("Models: 1").is_err());
/// ```
pub fn classify_response(line: &str) -> Result<ResponseLine> {
    for pattern in Pattern::ALL {
        let Some(caps) = pattern.regex().captures(line) else {
            continue;
        };
        let parsed = match pattern {
            Pattern::Step => captured_number(&caps).map(ResponseLine::Step),
            Pattern::Answer => Some(ResponseLine::Answer(
                line.split_whitespace().map(str::to_string).collect(),
            )),
            Pattern::Input => Some(ResponseLine::Input),
            Pattern::EndOfStep => Some(ResponseLine::EndOfStep),
            Pattern::Warning => captured_text(&caps).map(ResponseLine::Warning),
            Pattern::Error => captured_text(&caps).map(ResponseLine::Error),
            Pattern::Unsat => captured_number(&caps).map(ResponseLine::Unsat),
        };
        if let Some(parsed) = parsed {
            return Ok(parsed);
        }
    }

    Err(ProtocolError::UnknownOutput {
        line: line.to_string(),
    }
    .into())
}

/// How a step ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// `End of Step.` was received.
    Satisfiable,
    /// The server gave up at the given step.
    Unsatisfiable {
        /// Step reported by the server.
        step: u64,
    },
}

/// Everything the server reported for one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepResult {
    /// Step number from the last `Step:` line, if any.
    pub step: Option<u64>,
    /// Answer sets in arrival order.
    pub answer_sets: Vec<AnswerSet>,
    /// How the step ended.
    pub outcome: Outcome,
}

impl StepResult {
    /// Returns `true` if the server reported the program unsatisfiable.
    #[must_use]
    pub const fn is_unsatisfiable(&self) -> bool {
        matches!(self.outcome, Outcome::Unsatisfiable { .. })
    }
}

/// Incremental parser over server messages.
///
/// Feed each decoded message with [`push`](Self::push), then call
/// [`next_result`](Self::next_result) until it returns `Ok(None)`.
///
/// # Examples
///
/// ```
/// use oclingo_controller::protocol::ResponseParser;
///
/// let mut parser = ResponseParser::new();
/// parser.push("Step: 1\na b");
/// assert!(parser.next_result().unwrap().is_none());
///
/// parser.push("End of Step.");
/// let result = parser.next_result().unwrap().unwrap();
/// assert_eq!(result.step, Some(1));
/// assert_eq!(result.answer_sets[0].atoms, ["a", "b"]);
/// ```
#[derive(Debug, Default)]
pub struct ResponseParser {
    pending: VecDeque<String>,
    step: Option<u64>,
    answer_sets: Vec<AnswerSet>,
}

impl ResponseParser {
    /// Creates an empty parser.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues the lines of one message.
    pub fn push(&mut self, message: &str) {
        self.pending.extend(message.lines().map(str::to_string));
    }

    /// Returns the last step announced by the server.
    #[must_use]
    pub const fn current_step(&self) -> Option<u64> {
        self.step
    }

    /// Returns `true` if queued lines are waiting to be parsed.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Parses queued lines until a step completes.
    ///
    /// Returns `Ok(None)` once the queue is drained without completing a
    /// step; the partial state is kept for the next message.
    ///
    /// # Errors
    ///
    /// - [`ServerError::Warning`] for a warning line. The parser state is
    ///   kept and parsing may continue.
    /// - [`ServerError::Error`] for an error line.
    /// - [`ProtocolError::UnknownOutput`] for an unrecognized line.
    pub fn next_result(&mut self) -> Result<Option<StepResult>> {
        while let Some(line) = self.pending.pop_front() {
            match classify_response(&line)? {
                ResponseLine::Step(step) => {
                    tracing::debug!(step, "found answer set for step");
                    self.step = Some(step);
                }
                ResponseLine::Answer(atoms) => {
                    self.answer_sets.push(AnswerSet::new(self.step, atoms));
                }
                ResponseLine::Input => {}
                ResponseLine::EndOfStep => {
                    return Ok(Some(self.finish(Outcome::Satisfiable)));
                }
                ResponseLine::Warning(text) => {
                    return Err(ServerError::Warning(text).into());
                }
                ResponseLine::Error(text) => {
                    return Err(ServerError::Error(text).into());
                }
                ResponseLine::Unsat(step) => {
                    tracing::info!("Program was unsatisfiable and stopped at step {step}!");
                    return Ok(Some(self.finish(Outcome::Unsatisfiable { step })));
                }
            }
        }
        Ok(None)
    }

    fn finish(&mut self, outcome: Outcome) -> StepResult {
        StepResult {
            step: self.step,
            answer_sets: std::mem::take(&mut self.answer_sets),
            outcome,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use test_case::test_case;

    fn parse_all(parser: &mut ResponseParser) -> Vec<StepResult> {
        let mut results = Vec::new();
        while let Some(result) = parser.next_result().unwrap() {
            results.push(result);
        }
        results
    }

    #[test_case("Step: 12", ResponseLine::Step(12) ; "step")]
    #[test_case("Input:", ResponseLine::Input ; "input")]
    #[test_case("End of Step.", ResponseLine::EndOfStep ; "end of step")]
    #[test_case("UNSAT at step 7", ResponseLine::Unsat(7) ; "unsat")]
    #[test_case("p(1) q(a,2) r", ResponseLine::Answer(vec!["p(1)".into(), "q(a,2)".into(), "r".into()]) ; "answer")]
    #[test_case("-moved(b,3)", ResponseLine::Answer(vec!["-moved(b,3)".into()]) ; "classical negation")]
    #[test_case("Warning: a/0 undefined", ResponseLine::Warning("a/0 undefined".into()) ; "warning")]
    #[test_case("Error: syntax", ResponseLine::Error("syntax".into()) ; "error")]
    fn test_classify_response(line: &str, expected: ResponseLine) {
        assert_eq!(classify_response(line).unwrap(), expected);
    }

    #[test_case("" ; "empty line")]
    #[test_case("Models: 1" ; "unknown label")]
    #[test_case("Step: x" ; "non numeric step")]
    #[test_case("End of Step" ; "missing dot")]
    #[test_case("Warning:" ; "bare warning label")]
    #[test_case("Error: " ; "bare error label")]
    fn test_classify_unknown(line: &str) {
        let err = classify_response(line).unwrap_err();
        assert!(matches!(
            err,
            Error::Protocol(ProtocolError::UnknownOutput { .. })
        ));
    }

    #[test]
    fn test_single_message_step() {
        let mut parser = ResponseParser::new();
        parser.push("Step: 1\na(1) b\nInput:\nEnd of Step.\n");
        let results = parse_all(&mut parser);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].step, Some(1));
        assert_eq!(results[0].outcome, Outcome::Satisfiable);
        assert_eq!(results[0].answer_sets[0].atoms, ["a(1)", "b"]);
        assert_eq!(results[0].answer_sets[0].step, Some(1));
    }

    #[test]
    fn test_step_split_over_messages() {
        let mut parser = ResponseParser::new();
        for message in ["Step: 2", "x y", "z", "End of Step."] {
            parser.push(message);
        }
        let results = parse_all(&mut parser);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].answer_sets.len(), 2);
        assert_eq!(parser.current_step(), Some(2));
    }

    #[test]
    fn test_step_without_answer_sets() {
        let mut parser = ResponseParser::new();
        parser.push("Step: 3\nEnd of Step.");
        let result = parser.next_result().unwrap().unwrap();
        assert!(result.answer_sets.is_empty());
    }

    #[test]
    fn test_unsat_yields_accumulated() {
        let mut parser = ResponseParser::new();
        parser.push("Step: 4\np(4)\nUNSAT at step 4");
        let result = parser.next_result().unwrap().unwrap();
        assert!(result.is_unsatisfiable());
        assert_eq!(result.outcome, Outcome::Unsatisfiable { step: 4 });
        assert_eq!(result.answer_sets.len(), 1);
    }

    #[test]
    fn test_warning_keeps_state() {
        let mut parser = ResponseParser::new();
        parser.push("Step: 1\na\nWarning: atom b/0 undefined\nc\nEnd of Step.");

        let err = parser.next_result().unwrap_err();
        assert!(err.is_recoverable());
        assert_eq!(err.to_string(), "Warning: atom b/0 undefined");

        let result = parser.next_result().unwrap().unwrap();
        assert_eq!(result.answer_sets.len(), 2);
        assert!(!parser.has_pending());
    }

    #[test]
    fn test_error_is_fatal() {
        let mut parser = ResponseParser::new();
        parser.push("Error: grounding failed");
        let err = parser.next_result().unwrap_err();
        assert!(!err.is_recoverable());
        assert!(matches!(err, Error::Server(ServerError::Error(_))));
    }

    #[test]
    fn test_two_steps_in_one_message() {
        let mut parser = ResponseParser::new();
        parser.push("Step: 1\na\nEnd of Step.\nStep: 2\nb\nEnd of Step.");
        let results = parse_all(&mut parser);
        assert_eq!(results.len(), 2);
        assert_eq!(results[1].step, Some(2));
        assert_eq!(results[1].answer_sets[0].atoms, ["b"]);
    }
}
