//! Text helpers shared by the extraction and output stages.
//!
//! This module provides:
//! - Whitespace normalization for text pulled out of HTML
//! - Char-boundary safe truncation for logging and previews
//! - Word wrapping for article bodies

use scraper::ElementRef;

/// Collapse every run of whitespace (including newlines, tabs and
/// non-breaking spaces) into a single space and trim both ends.
///
/// Control characters are dropped.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(collapse_whitespace("  a\n\t b  "), "a b");
/// ```
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace()
        .map(|w| w.chars().filter(|c| !c.is_control()).collect::<String>())
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// All text below `element`, whitespace-collapsed.
pub fn element_text(element: &ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<String>())
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut to `max` characters with an ellipsis and a count of
/// the characters that were dropped.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 chars)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    let (head, rest) = split_at_chars(s, max);
    if rest == 0 {
        head.to_string()
    } else {
        format!("{}…(+{} chars)", head, rest)
    }
}

/// Keep at most `max` characters of `s`.
///
/// Returns the kept prefix and whether anything was removed.
pub fn truncate_chars(s: &str, max: usize) -> (&str, bool) {
    let (head, rest) = split_at_chars(s, max);
    (head, rest > 0)
}

fn split_at_chars(s: &str, max: usize) -> (&str, usize) {
    match s.char_indices().nth(max) {
        Some((idx, _)) => (&s[..idx], s[idx..].chars().count()),
        None => (s, 0),
    }
}

/// Wrap a single paragraph at `width` columns, breaking on whitespace.
///
/// Words longer than `width` are kept whole on their own line.
pub fn wrap_text(paragraph: &str, width: usize) -> String {
    let width = width.max(1);
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in paragraph.split_whitespace() {
        let word_len = word.chars().count();
        if current_len > 0 && current_len + 1 + word_len > width {
            lines.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(word);
        current_len += word_len;
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines.join("\n")
}
