//! Unicode utilities for text output.
//!
//! Column alignment in the answer-set table counts grapheme clusters, not
//! bytes, so atoms containing string constants with non-ASCII text still
//! line up.

use unicode_segmentation::UnicodeSegmentation;

/// Counts the number of grapheme clusters in a string.
///
/// # Examples
///
/// ```
/// use oclingo_controller::io::unicode::grapheme_count;
///
/// assert_eq!(grapheme_count("at(1)"), 5);
/// assert_eq!(grapheme_count("名(\"世界\")"), 7);
/// ```
#[must_use]
pub fn grapheme_count(s: &str) -> usize {
    s.graphemes(true).count()
}

/// Pads `s` on the right with spaces to `width` grapheme clusters.
///
/// Strings already at least `width` wide are returned unchanged.
#[must_use]
pub fn pad_right(s: &str, width: usize) -> String {
    let len = grapheme_count(s);
    let mut out = String::with_capacity(s.len() + width.saturating_sub(len));
    out.push_str(s);
    out.extend(std::iter::repeat_n(' ', width.saturating_sub(len)));
    out
}

/// Pads `s` on the left with spaces to `width` grapheme clusters.
#[must_use]
pub fn pad_left(s: &str, width: usize) -> String {
    let len = grapheme_count(s);
    let mut out: String = std::iter::repeat_n(' ', width.saturating_sub(len)).collect();
    out.push_str(s);
    out
}
