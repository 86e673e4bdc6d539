//! Small text helpers shared by the strategies and the attributor.
//!
//! Offsets are byte offsets into a document's `text_content`; every helper
//! snaps them to char boundaries before slicing.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

/// Largest char boundary `<= i`.
pub fn floor_boundary(s: &str, i: usize) -> usize {
    let mut i = i.min(s.len());
    while !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}

/// Smallest char boundary `>= i`.
pub fn ceil_boundary(s: &str, i: usize) -> usize {
    let mut i = i.min(s.len());
    while !s.is_char_boundary(i) {
        i += 1;
    }
    i
}

/// Text surrounding `start..end`, at most `max_chars` long, on one line.
pub fn context_window(text: &str, start: usize, end: usize, max_chars: usize) -> String {
    let span = end.saturating_sub(start);
    let side = max_chars.saturating_sub(span) / 2;
    let from = floor_boundary(text, start.saturating_sub(side));
    let to = ceil_boundary(text, end.saturating_add(side));

    let flat = text[from..to].split_whitespace().collect::<Vec<_>>().join(" ");
    flat.chars().take(max_chars).collect()
}

/// Lower-cased alphanumeric words joined by single spaces, padded with a
/// space on both ends so [`contains_term`] can match whole words.
pub fn word_string(text: &str) -> String {
    let words: Vec<String> = text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect();
    format!(" {} ", words.join(" "))
}

/// Whole-word (or whole-phrase) match of a lower-case `term` in a
/// [`word_string`].
pub fn contains_term(words: &str, term: &str) -> bool {
    words.contains(&format!(" {term} "))
}

/// Email-style sign-off phrases ("Kind regards", "Many thanks", ...).
/// Case-insensitive only inside its own group so it can be embedded in
/// case-sensitive patterns.
pub const SIGNATURE_CLOSING_PATTERN: &str = r"\b(?i:kind regards|best regards|warm regards|warmest regards|many thanks|with thanks|yours sincerely|yours faithfully|sincerely|regards|best wishes|all the best|cheers|thanks)\b[,.!]?";

static SIGNATURE_CLOSING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(SIGNATURE_CLOSING_PATTERN).expect("valid regex"));

/// Byte ranges of every sign-off phrase in `text`.
pub fn signature_closings(text: &str) -> Vec<Range<usize>> {
    SIGNATURE_CLOSING_RE
        .find_iter(text)
        .map(|m| m.range())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_window_is_bounded_and_flat() {
        let text = format!("{}John Smith\nis the founder{}", "x ".repeat(200), " y".repeat(200));
        let start = text.find("John").unwrap();
        let ctx = context_window(&text, start, start + 10, 200);
        assert!(ctx.chars().count() <= 200);
        assert!(ctx.contains("John Smith is the founder"));
    }

    #[test]
    fn context_window_handles_multibyte_edges() {
        let text = "Café owner — Zoë Müller runs the shop";
        let start = text.find("Zoë").unwrap();
        let ctx = context_window(text, start, start + "Zoë Müller".len(), 12);
        assert!(ctx.contains("Zoë"));
    }

    #[test]
    fn term_matching_is_whole_word() {
        let words = word_string("John is the co-owner and Managing Director.");
        assert!(contains_term(&words, "owner"));
        assert!(contains_term(&words, "managing director"));
        assert!(!contains_term(&words, "own"));
    }

    #[test]
    fn finds_signature_closings() {
        let text = "Thanks for the call.\n\nKind regards,\nJohn Smith";
        let closings = signature_closings(text);
        assert_eq!(closings.len(), 2);
        assert_eq!(&text[closings[1].clone()], "Kind regards,");
    }
}
