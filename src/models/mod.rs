pub mod matching;
pub mod stats_models;

pub use matching::{MatchResult, MatchStage, Resolution};
pub use stats_models::{ResolutionStats, RunSummary, StageStats};
