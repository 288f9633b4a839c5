//! # Text Matching Module
//!
//! ## Purpose
//! Normalization, tokenization and matching helpers shared by the search
//! engine and the suggestion miner.
//!
//! ## Input/Output Specification
//! - **Input**: Raw query strings and profile field values
//! - **Output**: Normalized text, query tokens, match/overlap decisions
//! - **Normalization**: Unicode NFC plus lowercase folding

use unicode_normalization::UnicodeNormalization;

/// Normalize text for comparison: Unicode NFC, lowercase, collapsed
/// whitespace.
pub fn normalize(text: &str) -> String {
    let folded = text.nfc().collect::<String>().to_lowercase();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Split a query into normalized tokens, dropping punctuation-only pieces.
pub fn tokenize(text: &str) -> Vec<String> {
    normalize(text)
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_string())
        .collect()
}

/// Case-insensitive substring test between a field value and a query.
///
/// Used by the suggestion miner; an empty field never matches.
pub fn contains_ci(field: &str, query: &str) -> bool {
    if field.is_empty() {
        return false;
    }
    let needle = normalize(query);
    if needle.is_empty() {
        return false;
    }
    normalize(field).contains(&needle)
}

/// Count how many of the query tokens occur in the haystack text.
///
/// This is the relevance score used to rank search results: the overlap is
/// counted over distinct query tokens, so repeating a token in the query
/// does not inflate the score.
pub fn token_overlap(haystack_normalized: &str, query_tokens: &[String]) -> usize {
    let mut matched = 0;
    let mut seen: Vec<&str> = Vec::with_capacity(query_tokens.len());
    for token in query_tokens {
        if seen.contains(&token.as_str()) {
            continue;
        }
        seen.push(token);
        if haystack_normalized.contains(token.as_str()) {
            matched += 1;
        }
    }
    matched
}
