// src/models/matching.rs

use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of resolving one query against a reference set.
///
/// A query resolves to at most one reference entry; the matched value is the
/// reference entry's original text, not its normalized form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchResult {
    Matched(String),
    Unmatched,
}

impl MatchResult {
    pub fn is_matched(&self) -> bool {
        matches!(self, MatchResult::Matched(_))
    }

    pub fn matched(&self) -> Option<&str> {
        match self {
            MatchResult::Matched(reference) => Some(reference.as_str()),
            MatchResult::Unmatched => None,
        }
    }

    pub fn into_option(self) -> Option<String> {
        match self {
            MatchResult::Matched(reference) => Some(reference),
            MatchResult::Unmatched => None,
        }
    }
}

/// Pipeline stage that produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStage {
    Exact,
    Fuzzy,
    ForwardContainment,
    BackwardContainment,
}

impl MatchStage {
    pub const ALL: [MatchStage; 4] = [
        MatchStage::Exact,
        MatchStage::Fuzzy,
        MatchStage::ForwardContainment,
        MatchStage::BackwardContainment,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStage::Exact => "exact",
            MatchStage::Fuzzy => "fuzzy",
            MatchStage::ForwardContainment => "forward_containment",
            MatchStage::BackwardContainment => "backward_containment",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            MatchStage::Exact => "🎯",
            MatchStage::Fuzzy => "🔍",
            MatchStage::ForwardContainment => "➡️",
            MatchStage::BackwardContainment => "⬅️",
        }
    }
}

impl fmt::Display for MatchStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved query together with how it was resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    pub query: String,
    pub result: MatchResult,
    pub stage: Option<MatchStage>,
    /// Similarity score of the accepted candidate, only set for fuzzy matches.
    pub score: Option<f64>,
}

impl Resolution {
    pub fn unmatched(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            result: MatchResult::Unmatched,
            stage: None,
            score: None,
        }
    }

    pub fn matched(
        query: impl Into<String>,
        reference: impl Into<String>,
        stage: MatchStage,
        score: Option<f64>,
    ) -> Self {
        Self {
            query: query.into(),
            result: MatchResult::Matched(reference.into()),
            stage: Some(stage),
            score,
        }
    }
}
