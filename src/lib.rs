//! Reconciles free-text organization names against a curated reference list.
//!
//! The core is [`NameResolver`], which maps each query to at most one
//! reference entry by trying, in order: an exact match on the trimmed,
//! case-folded name; the best fuzzy similarity score at or above a threshold;
//! and whole-token containment in either direction. Loading, export and the
//! concurrent batch runner live around it in [`utils`] and
//! [`matching::manager`].

pub mod matching;
pub mod models;
pub mod utils;

pub use matching::{NameResolver, ReferenceSet};
pub use models::{MatchResult, MatchStage, Resolution};
pub use utils::matcher_config::MatcherConfig;
