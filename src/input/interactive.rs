//! Interactive input readers.
//!
//! Two readers take input line by line from a terminal (or any
//! `BufRead`):
//!
//! - [`InteractiveReader`] accepts the classic stream format: program lines
//!   and directives until `#endstep.` or `#stop.`.
//! - [`QueryReader`] implements ad-hoc query mode: every clause typed
//!   becomes its own step at the current step counter.
//!
//! Unrecognized lines are never fatal. They are logged, skipped, and the
//! user is prompted again. End of input behaves like `#stop.`.

use crate::core::{Fragment, StepInput};
use crate::error::Result;
use crate::input::classify::{LineKind, classify};
use crate::input::traits::FragmentSource;
use crate::session::SessionStatus;
use regex::Regex;
use std::io::{BufRead, Write};
use std::sync::OnceLock;

const STREAM_PROMPT: &str = "Please enter new information, '#endstep.' on its own line to end:";
const QUERY_PROMPT: &str = "Please enter your query (format: single ground clause)";

/// Reads one line, returning `None` at end of input.
fn read_line<R: BufRead>(input: &mut R) -> Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line))
}

fn ignore_unknown(line: &str) {
    tracing::warn!(line = line.trim_end(), "ignoring unknown input");
}

/// Reader for the classic stream format.
pub struct InteractiveReader<R, W> {
    input: R,
    prompt: W,
    pending_stop: bool,
}

impl<R: BufRead + Send, W: Write + Send> InteractiveReader<R, W> {
    /// Creates a reader taking lines from `input` and writing prompts to
    /// `prompt`.
    pub const fn new(input: R, prompt: W) -> Self {
        Self {
            input,
            prompt,
            pending_stop: false,
        }
    }

    fn ask(&mut self) -> Result<()> {
        writeln!(self.prompt, "{STREAM_PROMPT}")?;
        self.prompt.flush()?;
        Ok(())
    }

    /// Ends the current fragment because `#stop.` or end of input was
    /// reached. Pending lines still go out first.
    fn finish(&mut self, lines: Vec<String>) -> StepInput {
        if lines.is_empty() {
            return StepInput::Stop;
        }
        self.pending_stop = true;
        StepInput::Fragment(Fragment::new(lines))
    }
}

impl<R: BufRead + Send, W: Write + Send> FragmentSource for InteractiveReader<R, W> {
    fn next_input(&mut self, _status: &SessionStatus) -> Result<StepInput> {
        if self.pending_stop {
            return Ok(StepInput::Stop);
        }

        self.ask()?;
        let mut lines = Vec::new();
        loop {
            let Some(line) = read_line(&mut self.input)? else {
                return Ok(self.finish(lines));
            };

            match classify(&line) {
                kind if kind.is_program_line() => lines.push(line),
                LineKind::CommentOrBlank => {}
                LineKind::EndStep => return Ok(StepInput::Fragment(Fragment::new(lines))),
                LineKind::Stop => return Ok(self.finish(lines)),
                _ => {
                    ignore_unknown(&line);
                    self.ask()?;
                }
            }
        }
    }

    fn name(&self) -> &'static str {
        "interactive"
    }
}

/// Volatility directive attached to each query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Volatility {
    /// `#volatile.`: the query is retracted after it was answered.
    #[default]
    Input,
    /// `#volatile : N.`: the query stays valid for `N` steps.
    Window(u64),
    /// No directive: queries are kept as classical clauses.
    None,
}

impl Volatility {
    fn directive(self) -> Option<String> {
        match self {
            Self::Input => Some("#volatile.\n".to_string()),
            Self::Window(size) => Some(format!("#volatile : {size}.\n")),
            Self::None => None,
        }
    }
}

/// Options for ad-hoc query mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryOptions {
    /// Volatility of each query.
    pub volatility: Volatility,
    /// Increment the step counter for every fact or constraint and append
    /// it as the last argument of the query atom.
    pub implicit_increment: bool,
    /// Raise the step counter to the step named by the query atom's last
    /// argument.
    pub auto_increment: bool,
}

/// Reader for ad-hoc query mode.
pub struct QueryReader<R, W> {
    input: R,
    prompt: W,
    options: QueryOptions,
}

impl<R: BufRead + Send, W: Write + Send> QueryReader<R, W> {
    /// Creates a query reader.
    pub const fn new(input: R, prompt: W, options: QueryOptions) -> Self {
        Self {
            input,
            prompt,
            options,
        }
    }

    fn query_step(&self, line: &mut String, kind: LineKind, status: &SessionStatus) -> u64 {
        let mut step = status.current_step();

        if self.options.implicit_increment && matches!(kind, LineKind::Fact | LineKind::Integrity)
        {
            step = step.saturating_add(1);
            *line = append_step_argument(line, step);
        }

        if self.options.auto_increment
            && let Some(min) = last_atom_step(line)
        {
            step = step.max(min);
        }

        status.set_current_step(step);
        step
    }
}

impl<R: BufRead + Send, W: Write + Send> FragmentSource for QueryReader<R, W> {
    fn next_input(&mut self, status: &SessionStatus) -> Result<StepInput> {
        writeln!(self.prompt, "{QUERY_PROMPT}")?;
        self.prompt.flush()?;

        let mut assertion: Option<String> = None;
        loop {
            let Some(mut line) = read_line(&mut self.input)? else {
                return Ok(StepInput::Stop);
            };

            let kind = classify(&line);
            let fragment = match kind {
                LineKind::Fact | LineKind::Integrity | LineKind::Rule => {
                    let step = self.query_step(&mut line, kind, status);
                    let mut lines = vec![format!("#step {step}.\n")];
                    match assertion.take() {
                        Some(assert) => lines.push(assert),
                        None => lines.extend(self.options.volatility.directive()),
                    }
                    lines.push(line);
                    lines
                }
                LineKind::IncrementStep { to } => {
                    let step = to.unwrap_or_else(|| status.current_step().saturating_add(1));
                    vec![format!("#step {step}.\n")]
                }
                LineKind::Retract => vec![format!("#step {}.\n", status.current_step()), line],
                LineKind::EndStep => Vec::new(),
                LineKind::Stop => return Ok(StepInput::Stop),
                LineKind::Assert => {
                    // sent together with the next clause
                    assertion = Some(line);
                    continue;
                }
                LineKind::CommentOrBlank => continue,
                _ => {
                    ignore_unknown(&line);
                    continue;
                }
            };
            return Ok(StepInput::Fragment(Fragment::new(fragment)));
        }
    }

    fn name(&self) -> &'static str {
        "query"
    }
}

/// Appends `step` as the last argument of a clause's final atom.
///
/// `p(a).` becomes `p(a,3).`, `p.` becomes `p(3).`. Trailing comments are
/// dropped.
fn append_step_argument(line: &str, step: u64) -> String {
    let statement = line.split('%').next().unwrap_or_default().trim_end();
    let body = statement.strip_suffix('.').unwrap_or(statement).trim_end();
    match body.strip_suffix(')') {
        Some(open) => format!("{open},{step}).\n"),
        None => format!("{body}({step}).\n"),
    }
}

/// Returns the trailing numeric argument of a clause's final atom.
#[allow(clippy::expect_used)]
fn last_atom_step(line: &str) -> Option<u64> {
    static LAST_ATOM: OnceLock<Regex> = OnceLock::new();
    let regex = LAST_ATOM.get_or_init(|| {
        Regex::new(r"[a-z_][a-zA-Z0-9_]*\((?:.*?[(,])?\s*(\d+)\s*\)\s*\.\s*(?:%.*)?$")
            .expect("valid regex")
    });
    regex.captures(line.trim_end())?.get(1)?.as_str().parse().ok()
}
