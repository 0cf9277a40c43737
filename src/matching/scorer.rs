// src/matching/scorer.rs
// Character-level similarity scoring on a 0-100 scale, backed by strsim.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use strsim::{
    jaro, jaro_winkler, normalized_damerau_levenshtein, normalized_levenshtein, sorensen_dice,
};

pub const MAX_SCORE: f64 = 100.0;

const ALGORITHM_NAMES: &str = "jaro, jaro_winkler, levenshtein, damerau_levenshtein, sorensen_dice";

/// A candidate kept by [`SimilarityScorer::top_candidates`].
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate<'a> {
    /// Position of the candidate in the slice that was ranked.
    pub index: usize,
    pub candidate: &'a str,
    pub score: f64,
}

/// Similarity provider consumed by the resolver.
///
/// Implementations must be reentrant: one scorer is shared by every worker
/// resolving queries concurrently.
pub trait SimilarityScorer: Send + Sync {
    /// Similarity of `a` and `b` in `[0, 100]`.
    fn score(&self, a: &str, b: &str) -> f64;

    /// The `k` best candidates for `query`, best first.
    ///
    /// Candidates with equal scores keep their relative order from
    /// `candidates` (the sort is stable). This is the "scorer order" the
    /// resolver uses to break ties.
    fn top_candidates<'a>(
        &self,
        query: &str,
        candidates: &[&'a str],
        k: usize,
    ) -> Vec<ScoredCandidate<'a>> {
        let mut scored: Vec<ScoredCandidate<'a>> = candidates
            .iter()
            .enumerate()
            .map(|(index, &candidate)| ScoredCandidate {
                index,
                candidate,
                score: clamp_score(self.score(query, candidate)),
            })
            .collect();
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(k);
        scored
    }
}

/// Pins a raw score into `[0, 100]`. NaN counts as no similarity.
pub fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, MAX_SCORE)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityAlgorithm {
    #[default]
    Jaro,
    JaroWinkler,
    Levenshtein,
    DamerauLevenshtein,
    SorensenDice,
}

impl SimilarityAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            SimilarityAlgorithm::Jaro => "jaro",
            SimilarityAlgorithm::JaroWinkler => "jaro_winkler",
            SimilarityAlgorithm::Levenshtein => "levenshtein",
            SimilarityAlgorithm::DamerauLevenshtein => "damerau_levenshtein",
            SimilarityAlgorithm::SorensenDice => "sorensen_dice",
        }
    }

    /// Raw strsim similarity in `[0, 1]`.
    fn similarity(&self, a: &str, b: &str) -> f64 {
        match self {
            SimilarityAlgorithm::Jaro => jaro(a, b),
            SimilarityAlgorithm::JaroWinkler => jaro_winkler(a, b),
            SimilarityAlgorithm::Levenshtein => normalized_levenshtein(a, b),
            SimilarityAlgorithm::DamerauLevenshtein => normalized_damerau_levenshtein(a, b),
            SimilarityAlgorithm::SorensenDice => sorensen_dice(a, b),
        }
    }
}

impl fmt::Display for SimilarityAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SimilarityAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "jaro" => Ok(SimilarityAlgorithm::Jaro),
            "jaro_winkler" | "jw" => Ok(SimilarityAlgorithm::JaroWinkler),
            "levenshtein" => Ok(SimilarityAlgorithm::Levenshtein),
            "damerau_levenshtein" | "damerau" => Ok(SimilarityAlgorithm::DamerauLevenshtein),
            "sorensen_dice" | "dice" => Ok(SimilarityAlgorithm::SorensenDice),
            other => Err(format!(
                "unknown similarity algorithm '{}' (expected one of: {})",
                other, ALGORITHM_NAMES
            )),
        }
    }
}

/// Stateless scorer delegating to one strsim metric.
#[derive(Debug, Clone, Copy, Default)]
pub struct StrsimScorer {
    algorithm: SimilarityAlgorithm,
}

impl StrsimScorer {
    pub fn new(algorithm: SimilarityAlgorithm) -> Self {
        Self { algorithm }
    }
}

impl SimilarityScorer for StrsimScorer {
    fn score(&self, a: &str, b: &str) -> f64 {
        self.algorithm.similarity(a, b) * MAX_SCORE
    }
}
