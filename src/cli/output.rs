//! Output formatting for the session transcript.
//!
//! Supports text and JSON output formats. The text format prints every
//! answer set as a table with one row per time step:
//!
//! ```text
//! Answer: 1
//!   B. r
//!   1. p(1)
//!   3. q(2,3)
//! ```

use crate::core::{AnswerSet, Grouping, TimeKey};
use crate::error::{CommandError, Error, Result};
use crate::io::{grapheme_count, pad_left, pad_right};
use crate::protocol::{Outcome, StepResult};
use serde::ser::{Serialize, Serializer};
use std::fmt::Write;

/// Output format options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output.
    Json,
}

impl OutputFormat {
    /// Parses format from string.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Text,
        }
    }
}

/// Formats one answer set as an aligned table.
///
/// Rows are keyed `B` for atoms without a time argument, then by step in
/// ascending order. Atoms sharing a column index are padded to the widest
/// of them plus one space.
///
/// # Examples
///
/// ```
/// use oclingo_controller::cli::output::format_answer_set;
/// use oclingo_controller::core::AnswerSet;
///
/// let set = AnswerSet::new(None, vec!["p(1)".into(), "q(2,3)".into(), "r".into()]);
/// assert_eq!(
///     format_answer_set(&set),
///     "  B. r      \n  1. p(1)   \n  3. q(2,3) \n"
/// );
/// ```
#[must_use]
pub fn format_answer_set(answer_set: &AnswerSet) -> String {
    format_grouping(&answer_set.group_by_step())
}

fn format_grouping(groups: &Grouping) -> String {
    let key_width = groups.len().to_string().len();

    let mut widths: Vec<usize> = Vec::new();
    for bucket in groups.values() {
        for (column, atom) in bucket.iter().enumerate() {
            let width = grapheme_count(atom);
            match widths.get_mut(column) {
                Some(max) => *max = (*max).max(width),
                None => widths.push(width),
            }
        }
    }

    let mut output = String::new();
    for (key, bucket) in groups {
        output.push_str("  ");
        output.push_str(&pad_left(&key.to_string(), key_width));
        output.push_str(". ");
        for (atom, width) in bucket.iter().zip(&widths) {
            output.push_str(&pad_right(atom, width + 1));
        }
        output.push('\n');
    }
    output
}

/// Formats all answer sets of a step.
///
/// Answers are numbered from 1 within the step.
///
/// # Errors
///
/// Returns [`CommandError::Output`] if the JSON rendering fails.
pub fn format_answer_sets(answer_sets: &[AnswerSet], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => {
            let mut output = String::new();
            for (i, answer_set) in answer_sets.iter().enumerate() {
                let _ = writeln!(output, "Answer: {}", i + 1);
                output.push_str(&format_answer_set(answer_set));
            }
            Ok(output)
        }
        OutputFormat::Json => {
            let answers: Vec<AnswerJson> = answer_sets
                .iter()
                .enumerate()
                .map(|(i, answer_set)| AnswerJson {
                    answer: i + 1,
                    step: answer_set.step,
                    groups: GroupsJson(answer_set.group_by_step()),
                })
                .collect();
            let mut json = format_json(&answers)?;
            json.push('\n');
            Ok(json)
        }
    }
}

/// Formats a completed step for the transcript.
///
/// # Errors
///
/// Returns [`CommandError::Output`] if the JSON rendering fails.
pub fn format_step_result(result: &StepResult, format: OutputFormat) -> Result<String> {
    let mut output = format_answer_sets(&result.answer_sets, format)?;
    if format == OutputFormat::Text
        && let Outcome::Unsatisfiable { step } = result.outcome
    {
        let _ = writeln!(
            output,
            "Program was unsatisfiable and stopped at step {step}!"
        );
    }
    Ok(output)
}

#[derive(serde::Serialize)]
struct AnswerJson {
    answer: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    step: Option<u64>,
    groups: GroupsJson,
}

/// Buckets serialized as an object in display order.
struct GroupsJson(Grouping);

impl Serialize for GroupsJson {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(key, atoms)| {
            let key = match key {
                TimeKey::Base => "base".to_string(),
                TimeKey::Step(step) => step.to_string(),
            };
            (key, atoms)
        }))
    }
}

/// Formats an error for the user.
///
/// # Errors
///
/// Returns [`CommandError::Output`] if the JSON rendering fails.
pub fn format_error(error: &Error, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(format!("ERROR: {error}")),
        OutputFormat::Json => {
            #[derive(serde::Serialize)]
            struct ErrorOutput {
                error: String,
            }
            format_json(&ErrorOutput {
                error: error.to_string(),
            })
        }
    }
}

/// Formats a value as JSON.
fn format_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(|e| CommandError::from(e).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn set(atoms: &[&str]) -> AnswerSet {
        AnswerSet::new(Some(3), atoms.iter().map(ToString::to_string).collect())
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!(OutputFormat::parse("json"), OutputFormat::Json);
        assert_eq!(OutputFormat::parse("JSON"), OutputFormat::Json);
        assert_eq!(OutputFormat::parse("text"), OutputFormat::Text);
        assert_eq!(OutputFormat::parse("unknown"), OutputFormat::Text);
    }

    #[test]
    fn test_table_layout() {
        let table = format_answer_set(&set(&["p(1)", "q(2,3)", "r"]));
        assert_eq!(table, "  B. r      \n  1. p(1)   \n  3. q(2,3) \n");
    }

    #[test]
    fn test_columns_align_across_rows() {
        let table = format_answer_set(&set(&["a(1)", "bb(1)", "long_name(2)", "c(2)"]));
        let rows: Vec<&str> = table.lines().collect();
        assert_eq!(rows[0], "  1. a(1) bb(1)        ");
        assert_eq!(rows[1], "  2. c(2) long_name(2) ");
    }

    #[test]
    fn test_key_width_follows_bucket_count() {
        let atoms: Vec<String> = (1..=10).map(|t| format!("p({t})")).collect();
        let table = format_answer_set(&AnswerSet::new(None, atoms));
        assert!(table.starts_with("   1. p(1)"));
        assert!(table.contains("  10. p(10)"));
    }

    #[test]
    fn test_empty_answer_set_has_no_rows() {
        assert_eq!(format_answer_set(&AnswerSet::default()), "");
    }

    #[test]
    fn test_answer_numbering() {
        let text = format_answer_sets(&[set(&["a"]), set(&["b"])], OutputFormat::Text).unwrap();
        assert_eq!(text, "Answer: 1\n  B. a \nAnswer: 2\n  B. b \n");
    }

    #[test]
    fn test_json_groups() {
        let json = format_answer_sets(&[set(&["p(10)", "p(2)", "r"])], OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["answer"], 1);
        assert_eq!(value[0]["step"], 3);
        assert_eq!(value[0]["groups"]["base"][0], "r");
        assert_eq!(value[0]["groups"]["10"][0], "p(10)");

        let base = json.find("\"base\"").unwrap();
        let two = json.find("\"2\"").unwrap();
        let ten = json.find("\"10\"").unwrap();
        assert!(base < two && two < ten);
    }

    #[test]
    fn test_unsat_line() {
        let result = StepResult {
            step: Some(4),
            answer_sets: Vec::new(),
            outcome: Outcome::Unsatisfiable { step: 4 },
        };
        assert_eq!(
            format_step_result(&result, OutputFormat::Text).unwrap(),
            "Program was unsatisfiable and stopped at step 4!\n"
        );
        assert_eq!(format_step_result(&result, OutputFormat::Json).unwrap(), "[]\n");
    }

    #[test]
    fn test_format_error() {
        let err = Error::config("more than one online file was given");
        assert_eq!(
            format_error(&err, OutputFormat::Text).unwrap(),
            "ERROR: configuration error: more than one online file was given"
        );
        assert!(
            format_error(&err, OutputFormat::Json)
                .unwrap()
                .contains("\"error\"")
        );
    }

    struct Unserializable;

    impl Serialize for Unserializable {
        fn serialize<S: Serializer>(&self, _serializer: S) -> std::result::Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("not representable"))
        }
    }

    #[test]
    fn test_json_failure_is_output_error() {
        let err = format_json(&Unserializable).unwrap_err();
        assert!(matches!(err, Error::Command(CommandError::Output(_))));
        assert!(err.to_string().contains("not representable"));
    }

    proptest! {
        #[test]
        fn prop_formatting_ignores_atom_order(
            atoms in prop::collection::vec("[a-z]{1,4}(\\([0-9]{1,2}\\))?", 0..12),
        ) {
            let mut shuffled = atoms.clone();
            shuffled.reverse();
            let a = format_answer_set(&AnswerSet::new(None, atoms));
            let b = format_answer_set(&AnswerSet::new(None, shuffled));
            prop_assert_eq!(&a, &b);
        }

        #[test]
        fn prop_formatting_is_idempotent_on_grouped_input(
            atoms in prop::collection::vec("[a-z]{1,4}(\\([0-9]{1,2}\\))?", 0..12),
        ) {
            let set = AnswerSet::new(None, atoms);
            let regrouped: Vec<String> = set.group_by_step().into_values().flatten().collect();
            prop_assert_eq!(
                format_answer_set(&set),
                format_answer_set(&AnswerSet::new(None, regrouped))
            );
        }
    }
}
