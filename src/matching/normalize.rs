// src/matching/normalize.rs

use std::fmt;

/// Comparison form of a name: surrounding whitespace trimmed, case-folded.
///
/// Several raw strings may share one key. Keys are never persisted; they are
/// derived whenever a comparison needs them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NormalizedKey(String);

impl NormalizedKey {
    pub fn new(raw: &str) -> Self {
        NormalizedKey(normalize_name(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for NormalizedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NormalizedKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

pub fn normalize_name(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Converts an arbitrary cell value into a query string.
///
/// Missing values become the empty string so that every row of the input
/// still produces exactly one result.
pub fn coerce_query<T: fmt::Display>(value: Option<T>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => String::new(),
    }
}

/// True when `needle` appears in `haystack` as a run of whole
/// space-separated tokens, i.e. `" " + haystack + " "` contains
/// `" " + needle + " "`.
///
/// An empty needle pads to two spaces, so it is found only in an empty
/// haystack or one holding a double space.
pub fn contains_as_tokens(haystack: &str, needle: &str) -> bool {
    let padded_haystack = format!(" {} ", haystack);
    let padded_needle = format!(" {} ", needle);
    padded_haystack.contains(&padded_needle)
}
