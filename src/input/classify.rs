//! Line classification for stream input.
//!
//! Every line read from a stream file or typed interactively is sorted into
//! exactly one [`LineKind`] by a fixed, ordered set of anchored patterns.
//! Directive patterns are tried before clause patterns, and among clauses
//! integrity constraints and rules are tried before facts, so the first
//! match is always the most specific one.

use regex::Regex;
use std::sync::OnceLock;

/// Category of a single input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// `#step N.` or `#step N : W.`
    Step {
        /// Step number.
        step: u64,
        /// Optional window size.
        window: Option<u64>,
    },
    /// `#endstep.`
    EndStep,
    /// `#cumulative.`
    Cumulative,
    /// `#volatile.` or `#volatile : N.`
    Volatile {
        /// Optional number of steps the section stays valid.
        window: Option<u64>,
    },
    /// `#forget N.` or `#forget N..M.`
    Forget {
        /// First step to forget.
        from: u64,
        /// Last step to forget, if a range was given.
        to: Option<u64>,
    },
    /// `#assert : term.`
    Assert,
    /// `#retract : term.`
    Retract,
    /// `#stop.`
    Stop,
    /// `#istep.` or `#istep N.` (query mode step increment).
    IncrementStep {
        /// Explicit target step, `None` for "one more".
        to: Option<u64>,
    },
    /// A ground or non-ground fact.
    Fact,
    /// An integrity constraint `:- body.`
    Integrity,
    /// A rule `head :- body.`
    Rule,
    /// A `%` comment or a blank line.
    CommentOrBlank,
    /// Anything else.
    Unrecognized,
}

impl LineKind {
    /// Returns `true` for lines that become part of a fragment.
    #[must_use]
    pub const fn is_program_line(self) -> bool {
        matches!(
            self,
            Self::Step { .. }
                | Self::Cumulative
                | Self::Volatile { .. }
                | Self::Forget { .. }
                | Self::Assert
                | Self::Retract
                | Self::Fact
                | Self::Integrity
                | Self::Rule
        )
    }

    /// Returns `true` for facts, integrity constraints and rules.
    #[must_use]
    pub const fn is_clause(self) -> bool {
        matches!(self, Self::Fact | Self::Integrity | Self::Rule)
    }
}

/// Trailing whitespace and an optional `%` comment.
macro_rules! tail {
    () => {
        r"\s*(?:%.*)?$"
    };
}

/// Body literal of a rule or integrity constraint.
macro_rules! body {
    () => {
        r"(\s*(not\s+)?-?[a-z_][a-zA-Z0-9_]*(\(.+\))?\s*,?\s*)+"
    };
}

#[derive(Debug, Clone, Copy)]
enum Pattern {
    Step,
    IncrementStep,
    EndStep,
    Cumulative,
    Volatile,
    Forget,
    Assert,
    Retract,
    Stop,
    Integrity,
    Rule,
    Fact,
    CommentOrBlank,
}

impl Pattern {
    /// Returns the compiled regex for this pattern.
    #[allow(clippy::expect_used)]
    fn regex(self) -> &'static Regex {
        macro_rules! static_regex {
            ($name:ident, $pattern:expr) => {{
                static $name: OnceLock<Regex> = OnceLock::new();
                $name.get_or_init(|| Regex::new($pattern).expect("valid regex"))
            }};
        }

        match self {
            Self::Step => static_regex!(STEP, concat!(r"^#step (\d+)(?: *: *(\d+) *)?\.", tail!())),
            Self::IncrementStep => static_regex!(ISTEP, concat!(r"^#istep(?: (\d+))?\.", tail!())),
            Self::EndStep => static_regex!(ENDSTEP, concat!(r"^#endstep\.", tail!())),
            Self::Cumulative => static_regex!(CUMULATIVE, concat!(r"^#cumulative\.", tail!())),
            Self::Volatile => {
                static_regex!(VOLATILE, concat!(r"^#volatile(?: *: *(\d+))?\.", tail!()))
            }
            Self::Forget => {
                static_regex!(FORGET, concat!(r"^#forget (\d+)(?:\.\.(\d+))?\.", tail!()))
            }
            Self::Assert => static_regex!(ASSERT, concat!(r"^#assert *: *.+\.", tail!())),
            Self::Retract => static_regex!(RETRACT, concat!(r"^#retract *: *.+\.", tail!())),
            Self::Stop => static_regex!(STOP, concat!(r"^#stop\.", tail!())),
            Self::Integrity => static_regex!(INTEGRITY, concat!(r"^\s*:-", body!(), r"\.", tail!())),
            Self::Rule => static_regex!(
                RULE,
                concat!(
                    r"^\s*-?[a-z_][a-zA-Z0-9_]*(\(.+\))?\s*:-",
                    body!(),
                    r"\.",
                    tail!()
                )
            ),
            Self::Fact => static_regex!(FACT, concat!(r"^-?[a-z_][a-zA-Z0-9_]*(\(.+\))?\.", tail!())),
            Self::CommentOrBlank => static_regex!(COMMENT, r"^\s*(?:%.*)?$"),
        }
    }
}

/// Classifies one line of stream input.
///
/// The line terminator, if any, is ignored. The input is never modified;
/// callers keep the raw line and forward it unchanged.
///
/// # Examples
///
/// ```
/// use oclingo_controller::input::{LineKind, classify};
///
/// assert_eq!(classify("#step 3.\n"), LineKind::Step { step: 3, window: None });
/// assert_eq!(classify("at(robot, 1).\n"), LineKind::Fact);
/// assert_eq!(classify("Oops"), LineKind::Unrecognized);
/// ```
#[must_use]
pub fn classify(line: &str) -> LineKind {
    let text = line.trim_end_matches(['\n', '\r']);
    classify_directive(text)
        .or_else(|| classify_clause(text))
        .unwrap_or(LineKind::Unrecognized)
}

fn classify_directive(text: &str) -> Option<LineKind> {
    if !text.starts_with('#') {
        return None;
    }

    if let Some(caps) = Pattern::Step.regex().captures(text) {
        let step = number(caps.get(1))?;
        let window = match caps.get(2) {
            Some(m) => Some(m.as_str().parse().ok()?),
            None => None,
        };
        return Some(LineKind::Step { step, window });
    }
    if Pattern::EndStep.regex().is_match(text) {
        return Some(LineKind::EndStep);
    }
    if Pattern::Cumulative.regex().is_match(text) {
        return Some(LineKind::Cumulative);
    }
    if let Some(caps) = Pattern::Volatile.regex().captures(text) {
        let window = match caps.get(1) {
            Some(m) => Some(m.as_str().parse().ok()?),
            None => None,
        };
        return Some(LineKind::Volatile { window });
    }
    if let Some(caps) = Pattern::Forget.regex().captures(text) {
        let from = number(caps.get(1))?;
        let to = match caps.get(2) {
            Some(m) => Some(m.as_str().parse().ok()?),
            None => None,
        };
        return Some(LineKind::Forget { from, to });
    }
    if Pattern::Assert.regex().is_match(text) {
        return Some(LineKind::Assert);
    }
    if Pattern::Retract.regex().is_match(text) {
        return Some(LineKind::Retract);
    }
    if Pattern::Stop.regex().is_match(text) {
        return Some(LineKind::Stop);
    }
    if let Some(caps) = Pattern::IncrementStep.regex().captures(text) {
        let to = match caps.get(1) {
            Some(m) => Some(m.as_str().parse().ok()?),
            None => None,
        };
        return Some(LineKind::IncrementStep { to });
    }
    None
}

fn classify_clause(text: &str) -> Option<LineKind> {
    if Pattern::Integrity.regex().is_match(text) {
        Some(LineKind::Integrity)
    } else if Pattern::Rule.regex().is_match(text) {
        Some(LineKind::Rule)
    } else if Pattern::Fact.regex().is_match(text) {
        Some(LineKind::Fact)
    } else if Pattern::CommentOrBlank.regex().is_match(text) {
        Some(LineKind::CommentOrBlank)
    } else {
        None
    }
}

fn number(m: Option<regex::Match<'_>>) -> Option<u64> {
    m?.as_str().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("#step 1.\n", LineKind::Step { step: 1, window: None } ; "step")]
    #[test_case("#step 12 : 3.\n", LineKind::Step { step: 12, window: Some(3) } ; "step with window")]
    #[test_case("#step 2:5.", LineKind::Step { step: 2, window: Some(5) } ; "step compact window")]
    #[test_case("#endstep.\n", LineKind::EndStep ; "endstep")]
    #[test_case("#cumulative.\n", LineKind::Cumulative ; "cumulative")]
    #[test_case("#volatile.\n", LineKind::Volatile { window: None } ; "volatile")]
    #[test_case("#volatile : 2.\n", LineKind::Volatile { window: Some(2) } ; "volatile window")]
    #[test_case("#forget 3.\n", LineKind::Forget { from: 3, to: None } ; "forget")]
    #[test_case("#forget 1..4.\n", LineKind::Forget { from: 1, to: Some(4) } ; "forget range")]
    #[test_case("#assert : alarm(1).\n", LineKind::Assert ; "assert")]
    #[test_case("#retract : alarm(1).\n", LineKind::Retract ; "retract")]
    #[test_case("#stop.\n", LineKind::Stop ; "stop")]
    #[test_case("#istep.\n", LineKind::IncrementStep { to: None } ; "istep")]
    #[test_case("#istep 7.\n", LineKind::IncrementStep { to: Some(7) } ; "istep target")]
    fn test_directives(line: &str, expected: LineKind) {
        assert_eq!(classify(line), expected);
    }

    #[test_case("a.\n", LineKind::Fact ; "atom")]
    #[test_case("-a.\n", LineKind::Fact ; "classical negation")]
    #[test_case("at(robot,3,1).\n", LineKind::Fact ; "with args")]
    #[test_case("_hidden(1).", LineKind::Fact ; "underscore")]
    #[test_case("light(on). % switched\n", LineKind::Fact ; "trailing comment")]
    #[test_case(":- a, not b.\n", LineKind::Integrity ; "integrity")]
    #[test_case(" :- goal(X).\n", LineKind::Integrity ; "integrity leading space")]
    #[test_case("a :- b.\n", LineKind::Rule ; "rule")]
    #[test_case("p(X) :- q(X), not r(X).\n", LineKind::Rule ; "rule with args")]
    #[test_case("% comment\n", LineKind::CommentOrBlank ; "comment")]
    #[test_case("\n", LineKind::CommentOrBlank ; "blank")]
    #[test_case("   \n", LineKind::CommentOrBlank ; "whitespace")]
    fn test_clauses(line: &str, expected: LineKind) {
        assert_eq!(classify(line), expected);
    }

    #[test_case("Foo.\n" ; "uppercase predicate")]
    #[test_case("a\n" ; "missing dot")]
    #[test_case("#base.\n" ; "unknown directive")]
    #[test_case("#step x.\n" ; "non numeric step")]
    #[test_case("#STOP.\n" ; "case sensitive")]
    #[test_case("1.\n" ; "number")]
    fn test_unrecognized(line: &str) {
        assert_eq!(classify(line), LineKind::Unrecognized);
    }

    #[test]
    fn test_directive_precedence_over_clauses() {
        // "#step" lines never fall through to clause patterns
        assert!(!classify("#step 1.").is_clause());
        assert_eq!(classify("#stop. % done"), LineKind::Stop);
    }

    #[test]
    fn test_program_lines() {
        assert!(classify("a.").is_program_line());
        assert!(classify("#forget 1.").is_program_line());
        assert!(!classify("#endstep.").is_program_line());
        assert!(!classify("#stop.").is_program_line());
        assert!(!classify("#istep.").is_program_line());
        assert!(!classify("% c").is_program_line());
    }

    #[test]
    fn test_huge_step_number_is_unrecognized() {
        assert_eq!(
            classify("#step 99999999999999999999999.\n"),
            LineKind::Unrecognized
        );
    }

    #[test]
    fn test_classify_does_not_need_newline() {
        assert_eq!(classify("a :- b."), LineKind::Rule);
        assert_eq!(classify("a :- b.\r\n"), LineKind::Rule);
    }
}
