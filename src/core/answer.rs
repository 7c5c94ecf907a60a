//! Answer sets returned by the server.
//!
//! An answer set is the list of atoms printed on one line of a step's
//! response. For display the atoms are grouped by their time argument: an
//! atom whose last argument is a decimal number belongs to that step, all
//! other atoms belong to the base bucket.

use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

/// Key of a display bucket.
///
/// Orders `Base` before every step, steps ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TimeKey {
    /// Atoms without a trailing time argument.
    Base,
    /// Atoms whose last argument is this step.
    Step(u64),
}

impl fmt::Display for TimeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Base => f.write_str("B"),
            Self::Step(step) => write!(f, "{step}"),
        }
    }
}

/// Atoms grouped by time key, each bucket sorted.
pub type Grouping = BTreeMap<TimeKey, Vec<String>>;

/// One answer set received from the server.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerSet {
    /// Step reported by the server before this answer, if any.
    pub step: Option<u64>,

    /// Atoms in the order the server printed them.
    pub atoms: Vec<String>,
}

impl AnswerSet {
    /// Creates an answer set from atoms.
    #[must_use]
    pub const fn new(step: Option<u64>, atoms: Vec<String>) -> Self {
        Self { step, atoms }
    }

    /// Returns `true` if the answer set holds no atoms.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    /// Groups atoms by their trailing time argument.
    ///
    /// Grouping is deterministic: the same atoms always produce the same
    /// buckets in the same order, each sorted lexicographically.
    ///
    /// # Examples
    ///
    /// ```
    /// use oclingo_controller::core::{AnswerSet, TimeKey};
    ///
    /// let set = AnswerSet::new(None, vec!["q(2,3)".into(), "r".into(), "p(1)".into()]);
    /// let groups = set.group_by_step();
    /// assert_eq!(groups[&TimeKey::Base], ["r"]);
    /// assert_eq!(groups[&TimeKey::Step(1)], ["p(1)"]);
    /// assert_eq!(groups[&TimeKey::Step(3)], ["q(2,3)"]);
    /// ```
    #[must_use]
    pub fn group_by_step(&self) -> Grouping {
        let mut groups = Grouping::new();
        for atom in &self.atoms {
            let key = trailing_step(atom).map_or(TimeKey::Base, TimeKey::Step);
            groups.entry(key).or_default().push(atom.clone());
        }
        for bucket in groups.values_mut() {
            bucket.sort();
        }
        groups
    }
}

/// Returns the trailing decimal argument of an atom, if it has one.
///
/// `p(a,3)` yields `3`, `p(3)` yields `3`, `p(a)` and `p` yield `None`.
#[must_use]
#[allow(clippy::expect_used)]
pub fn trailing_step(atom: &str) -> Option<u64> {
    static TIMED: OnceLock<Regex> = OnceLock::new();
    let regex = TIMED.get_or_init(|| {
        Regex::new(r"^-?[a-z_][a-zA-Z0-9_]*\((?:.*,)?\s*(\d+)\)$").expect("valid regex")
    });
    regex.captures(atom)?.get(1)?.as_str().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(atoms: &[&str]) -> AnswerSet {
        AnswerSet::new(None, atoms.iter().map(ToString::to_string).collect())
    }

    #[test]
    fn test_trailing_step() {
        assert_eq!(trailing_step("p(1)"), Some(1));
        assert_eq!(trailing_step("q(2,3)"), Some(3));
        assert_eq!(trailing_step("at(robot,12)"), Some(12));
        assert_eq!(trailing_step("q(a1)"), None);
        assert_eq!(trailing_step("p(f(1))"), None);
        assert_eq!(trailing_step("-moved(a,4)"), Some(4));
        assert_eq!(trailing_step("r"), None);
        assert_eq!(trailing_step("p(a)"), None);
        assert_eq!(trailing_step("p(1,a)"), None);
    }

    #[test]
    fn test_group_by_step() {
        let groups = set(&["p(1)", "q(2,3)", "r"]).group_by_step();
        let keys: Vec<TimeKey> = groups.keys().copied().collect();
        assert_eq!(keys, [TimeKey::Base, TimeKey::Step(1), TimeKey::Step(3)]);
        assert_eq!(groups[&TimeKey::Step(3)], ["q(2,3)"]);
    }

    #[test]
    fn test_group_buckets_sorted() {
        let groups = set(&["z(1)", "a(1)", "m(1)", "y", "b"]).group_by_step();
        assert_eq!(groups[&TimeKey::Step(1)], ["a(1)", "m(1)", "z(1)"]);
        assert_eq!(groups[&TimeKey::Base], ["b", "y"]);
    }

    #[test]
    fn test_group_is_order_independent() {
        let a = set(&["p(2)", "q", "p(1)"]).group_by_step();
        let b = set(&["p(1)", "p(2)", "q"]).group_by_step();
        assert_eq!(a, b);
    }

    #[test]
    fn test_steps_order_numerically() {
        let groups = set(&["p(10)", "p(9)", "p(100)"]).group_by_step();
        let keys: Vec<TimeKey> = groups.keys().copied().collect();
        assert_eq!(
            keys,
            [TimeKey::Step(9), TimeKey::Step(10), TimeKey::Step(100)]
        );
    }

    #[test]
    fn test_time_key_display() {
        assert_eq!(TimeKey::Base.to_string(), "B");
        assert_eq!(TimeKey::Step(7).to_string(), "7");
    }

    #[test]
    fn test_empty_answer_set() {
        let empty = AnswerSet::default();
        assert!(empty.is_empty());
        assert!(empty.group_by_step().is_empty());
    }
}
