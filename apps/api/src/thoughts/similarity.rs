//! Repetition detection: does a thought keep coming back in other forms?

use std::collections::HashSet;

use crate::thoughts::models::Thought;

/// Tokens must be longer than this many characters to count toward text overlap.
const MIN_TOKEN_CHARS: usize = 3;
/// Shared significant tokens needed for two texts to count as similar.
const MIN_SHARED_TOKENS: usize = 3;

/// Lower-cased whitespace tokens longer than three characters.
pub fn significant_tokens(text: &str) -> HashSet<String> {
    text.split_whitespace()
        .map(str::to_lowercase)
        .filter(|w| w.chars().count() > MIN_TOKEN_CHARS)
        .collect()
}

pub fn shared_token_count(a: &str, b: &str) -> usize {
    let a = significant_tokens(a);
    let b = significant_tokens(b);
    a.intersection(&b).count()
}

pub fn shares_tag(a: &Thought, b: &Thought) -> bool {
    !a.tags.is_disjoint(&b.tags)
}

/// One boolean per candidate: a match on either rule counts once.
pub fn is_similar(a: &Thought, b: &Thought) -> bool {
    shares_tag(a, b) || shared_token_count(&a.original_text, &b.original_text) >= MIN_SHARED_TOKENS
}

/// Number of other thoughts in `all` similar to `thought`. Self is excluded by id.
pub fn count_similar(thought: &Thought, all: &[Thought]) -> usize {
    all.iter()
        .filter(|other| other.id != thought.id)
        .filter(|other| is_similar(thought, other))
        .count()
}
