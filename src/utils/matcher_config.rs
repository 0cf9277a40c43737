// src/utils/matcher_config.rs

use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

use crate::matching::scorer::SimilarityAlgorithm;

pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 90.0;
pub const DEFAULT_CANDIDATE_LIMIT: usize = 20;

/// Tunable policy for the resolver and the batch runner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatcherConfig {
    /// Minimum accepted fuzzy score, inclusive, on the 0-100 scale
    pub similarity_threshold: f64,
    /// Maximum number of ranked candidates considered by the fuzzy stage
    pub candidate_limit: usize,
    /// strsim metric behind the fuzzy stage
    pub algorithm: SimilarityAlgorithm,
    /// Resolve queries that normalize to "" as unmatched instead of running the pipeline
    pub guard_empty_query: bool,
    /// Number of blocking workers used by the batch runner
    pub worker_threads: usize,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            candidate_limit: DEFAULT_CANDIDATE_LIMIT,
            algorithm: SimilarityAlgorithm::default(),
            guard_empty_query: false,
            worker_threads: num_cpus::get(),
        }
    }
}

impl MatcherConfig {
    /// Create matcher configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            similarity_threshold: env_or(
                "MATCH_SIMILARITY_THRESHOLD",
                defaults.similarity_threshold,
            ),
            candidate_limit: env_or("MATCH_CANDIDATE_LIMIT", defaults.candidate_limit),
            algorithm: env_or("MATCH_ALGORITHM", defaults.algorithm),
            guard_empty_query: env_or("MATCH_GUARD_EMPTY_QUERY", defaults.guard_empty_query),
            worker_threads: env_or("MATCH_WORKER_THREADS", defaults.worker_threads),
        }
        .sanitized()
    }

    /// Clamp values into their usable ranges.
    pub fn sanitized(mut self) -> Self {
        if !self.similarity_threshold.is_finite() {
            warn!(
                "Similarity threshold {} is not a number, using {}",
                self.similarity_threshold, DEFAULT_SIMILARITY_THRESHOLD
            );
            self.similarity_threshold = DEFAULT_SIMILARITY_THRESHOLD;
        } else if !(0.0..=100.0).contains(&self.similarity_threshold) {
            let clamped = self.similarity_threshold.clamp(0.0, 100.0);
            warn!(
                "Similarity threshold {} is outside [0, 100], clamping to {}",
                self.similarity_threshold, clamped
            );
            self.similarity_threshold = clamped;
        }
        if self.candidate_limit == 0 {
            warn!("Candidate limit of 0 would disable fuzzy matching, raising to 1");
            self.candidate_limit = 1;
        }
        if self.worker_threads == 0 {
            self.worker_threads = 1;
        }
        self
    }

    pub fn log_config(&self) {
        info!("⚙️  Matcher configuration:");
        info!("   Similarity algorithm: {}", self.algorithm);
        info!("   Similarity threshold: {:.1}", self.similarity_threshold);
        info!("   Candidate limit: {}", self.candidate_limit);
        info!("   Worker threads: {}", self.worker_threads);
        if self.guard_empty_query {
            info!("   Empty queries: resolved as unmatched");
        } else {
            info!("   Empty queries: run through the full pipeline");
        }
    }
}

fn env_or<T>(key: &str, default: T) -> T
where
    T: FromStr + Copy + std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => match raw.trim().parse::<T>() {
            Ok(value) => value,
            Err(_) => {
                warn!("Invalid value '{}' for {}, using default {}", raw, key, default);
                default
            }
        },
        Err(_) => default,
    }
}

/// Environment variable configuration example
pub fn print_env_config_example() {
    println!("# Matcher Configuration");
    println!();
    println!("# Minimum accepted fuzzy score, inclusive (default: 90)");
    println!("export MATCH_SIMILARITY_THRESHOLD=90");
    println!();
    println!("# Ranked candidates considered by the fuzzy stage (default: 20)");
    println!("export MATCH_CANDIDATE_LIMIT=20");
    println!();
    println!("# Similarity metric (default: jaro)");
    println!("# jaro | jaro_winkler | levenshtein | damerau_levenshtein | sorensen_dice");
    println!("export MATCH_ALGORITHM=jaro");
    println!();
    println!("# Treat blank queries as unmatched (default: false)");
    println!("export MATCH_GUARD_EMPTY_QUERY=false");
    println!();
    println!("# Blocking workers for batch resolution (default: number of CPUs)");
    println!("export MATCH_WORKER_THREADS=8");
}
