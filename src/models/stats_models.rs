// src/models/stats_models.rs

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::matching::{MatchStage, Resolution};
use crate::utils::matcher_config::MatcherConfig;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StageStats {
    pub matches: usize,
    pub avg_score: Option<f64>,
}

/// Aggregate counters for one resolution run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResolutionStats {
    pub total_queries: usize,
    pub matched: usize,
    pub unmatched: usize,
    pub empty_queries: usize,
    pub stages: BTreeMap<String, StageStats>,
}

impl ResolutionStats {
    pub fn from_resolutions(resolutions: &[Resolution]) -> Self {
        let mut stats = ResolutionStats {
            total_queries: resolutions.len(),
            ..Default::default()
        };
        let mut score_sums: BTreeMap<MatchStage, (f64, usize)> = BTreeMap::new();

        for resolution in resolutions {
            if resolution.query.trim().is_empty() {
                stats.empty_queries += 1;
            }
            match resolution.stage {
                Some(stage) => {
                    stats.matched += 1;
                    stats
                        .stages
                        .entry(stage.as_str().to_string())
                        .or_default()
                        .matches += 1;
                    if let Some(score) = resolution.score {
                        let entry = score_sums.entry(stage).or_insert((0.0, 0));
                        entry.0 += score;
                        entry.1 += 1;
                    }
                }
                None => stats.unmatched += 1,
            }
        }

        for (stage, (sum, count)) in score_sums {
            if count > 0 {
                if let Some(stage_stats) = stats.stages.get_mut(stage.as_str()) {
                    stage_stats.avg_score = Some(sum / count as f64);
                }
            }
        }

        stats
    }

    pub fn stage_matches(&self, stage: MatchStage) -> usize {
        self.stages
            .get(stage.as_str())
            .map(|s| s.matches)
            .unwrap_or(0)
    }

    pub fn match_rate(&self) -> f64 {
        if self.total_queries == 0 {
            0.0
        } else {
            (self.matched as f64 / self.total_queries as f64) * 100.0
        }
    }
}

/// Summary persisted alongside the exported matches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: String,
    pub run_timestamp: NaiveDateTime,
    pub reference_entries: usize,
    pub distinct_reference_keys: usize,
    pub reference_fingerprint: String,
    pub config: MatcherConfig,
    pub stats: ResolutionStats,
    pub duration_secs: f64,
}
