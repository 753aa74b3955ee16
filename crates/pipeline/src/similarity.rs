//! Fuzzy name similarity.
//!
//! ## Algorithm
//! Token sort ratio: lower-case both names, split on whitespace, sort the
//! tokens and re-join them with single spaces, then compare the two strings
//! with the normalized Indel similarity
//!
//! ```text
//! ratio = 100 * 2 * LCS(a, b) / (len(a) + len(b))
//! ```
//!
//! where LCS is the longest common subsequence in characters, as computed by
//! `rapidfuzz`. Word order and case therefore do not matter; small
//! punctuation differences cost little ("Luigi's Italian" vs
//! "Italian Luigis" scores ~96.6).

use rapidfuzz::distance::indel;

/// Token-order-insensitive similarity of two names, in 0.0..=100.0.
///
/// Two empty names are identical (100.0).
pub fn token_sort_ratio(a: &str, b: &str) -> f64 {
    let a = sorted_tokens(a);
    let b = sorted_tokens(b);
    if a.is_empty() && b.is_empty() {
        return 100.0;
    }
    100.0 * indel::normalized_similarity(a.chars(), b.chars())
}

fn sorted_tokens(name: &str) -> String {
    let mut tokens: Vec<String> = name.split_whitespace().map(str::to_lowercase).collect();
    tokens.sort_unstable();
    tokens.join(" ")
}
