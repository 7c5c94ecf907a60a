//! Carry-over of answer-set atoms into the next step.
//!
//! With a carry-over predicate configured, every instance of that predicate
//! in the last displayed answer set becomes an integrity constraint of the
//! next fragment. The trailing time argument is dropped, so `pos(a,3)`
//! turns into `:- not pos(a).`.

use crate::core::AnswerSet;
use crate::error::{Error, Result};
use regex::Regex;

/// Remembers the carried atoms between steps.
#[derive(Debug, Clone)]
pub struct CarryOver {
    predicate: String,
    pattern: Regex,
    constraints: Vec<String>,
}

impl CarryOver {
    /// Creates a carry-over for `predicate`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `predicate` is not a valid
    /// predicate name.
    pub fn new(predicate: &str) -> Result<Self> {
        let valid = predicate
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_lowercase() || c == '_')
            && predicate
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !valid {
            return Err(Error::config(format!(
                "invalid carry-over predicate '{predicate}'"
            )));
        }

        let pattern = Regex::new(&format!(r"^{}(?:\((.*)\))?$", regex::escape(predicate)))
            .map_err(|e| Error::config(e.to_string()))?;

        Ok(Self {
            predicate: predicate.to_string(),
            pattern,
            constraints: Vec::new(),
        })
    }

    /// Returns the carried predicate.
    #[must_use]
    pub fn predicate(&self) -> &str {
        &self.predicate
    }

    /// Replaces the remembered atoms with those of `answer_set`.
    pub fn observe(&mut self, answer_set: &AnswerSet) {
        self.constraints = answer_set
            .atoms
            .iter()
            .filter_map(|atom| self.constraint_for(atom))
            .collect();
        tracing::debug!(
            predicate = %self.predicate,
            carried = self.constraints.len(),
            "updated carry-over"
        );
    }

    fn constraint_for(&self, atom: &str) -> Option<String> {
        let caps = self.pattern.captures(atom)?;
        let atom = match caps.get(1).map(|m| without_time(m.as_str())) {
            Some(args) if !args.is_empty() => format!("{}({args})", self.predicate),
            _ => self.predicate.clone(),
        };
        Some(format!(":- not {atom}."))
    }

    /// Returns the constraints to add to the next fragment.
    #[must_use]
    pub fn constraints(&self) -> &[String] {
        &self.constraints
    }
}

/// Drops a trailing decimal argument from an argument list.
fn without_time(args: &str) -> &str {
    let (head, last) = args.rsplit_once(',').unwrap_or(("", args));
    if !last.is_empty() && last.trim().bytes().all(|b| b.is_ascii_digit()) {
        head
    } else {
        args
    }
}
