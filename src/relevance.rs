//! Lexical relevance of a headline to the search query.
//!
//! Scoring rules, all case-insensitive:
//! - +10 when the query tokens appear on consecutive title words, in any
//!   order (a plain substring match of the whole query always qualifies)
//! - +2 for every query token found anywhere in the title
//! - +5 when the query has more than one token and all of them are found
//!
//! The score depends only on `(title, query)`. Callers recompute it rather
//! than carrying it around separately from the title it was derived from.

pub const PHRASE_BONUS: u32 = 10;
pub const TOKEN_BONUS: u32 = 2;
pub const ALL_TOKENS_BONUS: u32 = 5;

/// Score `title` against `query`.
pub fn score(title: &str, query: &str) -> u32 {
    let title = title.to_lowercase();
    let query = query.to_lowercase();
    let tokens: Vec<&str> = query.split_whitespace().collect();
    if tokens.is_empty() {
        return 0;
    }

    let mut total = 0;
    if phrase_match(&title, &tokens) {
        total += PHRASE_BONUS;
    }

    let found = tokens.iter().filter(|t| title.contains(**t)).count();
    total += TOKEN_BONUS * found as u32;

    if tokens.len() > 1 && found == tokens.len() {
        total += ALL_TOKENS_BONUS;
    }
    total
}

/// True when some window of `tokens.len()` consecutive title words can be
/// paired one-to-one with the tokens so that every token is contained in
/// its word.
fn phrase_match(title: &str, tokens: &[&str]) -> bool {
    let words: Vec<&str> = title.split_whitespace().collect();
    if words.len() < tokens.len() {
        return false;
    }
    words
        .windows(tokens.len())
        .any(|window| perfect_matching(tokens, window))
}

/// Bipartite matching between tokens and window words (Kuhn's algorithm).
fn perfect_matching(tokens: &[&str], window: &[&str]) -> bool {
    let mut owner: Vec<Option<usize>> = vec![None; window.len()];
    (0..tokens.len()).all(|t| {
        let mut seen = vec![false; window.len()];
        augment(t, tokens, window, &mut owner, &mut seen)
    })
}

fn augment(
    t: usize,
    tokens: &[&str],
    window: &[&str],
    owner: &mut [Option<usize>],
    seen: &mut [bool],
) -> bool {
    for w in 0..window.len() {
        if seen[w] || !window[w].contains(tokens[t]) {
            continue;
        }
        seen[w] = true;
        let free = match owner[w] {
            None => true,
            Some(other) => augment(other, tokens, window, owner, seen),
        };
        if free {
            owner[w] = Some(t);
            return true;
        }
    }
    false
}
