// src/utils/progress_bars/logging.rs - Logging helpers for resolution runs
use log::{debug, info, warn};
use std::time::{Duration, Instant};

use crate::models::matching::MatchStage;
use crate::models::stats_models::ResolutionStats;

#[derive(Clone)]
pub struct ResolutionLogger {
    tag: &'static str,
    emoji: &'static str,
    start_time: Instant,
}

impl Default for ResolutionLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl ResolutionLogger {
    pub fn new() -> Self {
        Self {
            tag: "NAME",
            emoji: "👤",
            start_time: Instant::now(),
        }
    }

    pub fn log_start(
        &self,
        run_id: &str,
        reference_entries: usize,
        distinct_keys: usize,
        queries: usize,
    ) {
        info!(
            "[{}] {} 🚀 Starting name resolution (run ID: {})",
            self.tag, self.emoji, run_id
        );
        info!(
            "[{}] {} 📊 {} reference entries ({} distinct after normalization), {} queries",
            self.tag, self.emoji, reference_entries, distinct_keys, queries
        );
        if distinct_keys < reference_entries {
            debug!(
                "[{}] {} {} duplicate reference entries will never be returned",
                self.tag,
                self.emoji,
                reference_entries - distinct_keys
            );
        }
    }

    pub fn log_phase(&self, phase: &str, details: Option<&str>) {
        let elapsed = self.start_time.elapsed();
        let msg = if let Some(details) = details {
            format!(
                "[{}] {} 🔄 Phase: {} - {} [+{:.1}s]",
                self.tag, self.emoji, phase, details, elapsed.as_secs_f32()
            )
        } else {
            format!(
                "[{}] {} 🔄 Phase: {} [+{:.1}s]",
                self.tag, self.emoji, phase, elapsed.as_secs_f32()
            )
        };
        info!("{}", msg);
    }

    pub fn log_batch_processing_start(
        &self,
        total_queries: usize,
        chunk_size: usize,
        workers: usize,
    ) {
        let chunk_count = if chunk_size == 0 {
            0
        } else {
            (total_queries + chunk_size - 1) / chunk_size
        };
        info!(
            "[{}] {} ⚙️  Resolving {} queries in {} chunks (chunk size: {}, workers: {})",
            self.tag, self.emoji, total_queries, chunk_count, chunk_size, workers
        );
    }

    pub fn log_chunk_complete(
        &self,
        chunk_num: usize,
        total_chunks: usize,
        matched: usize,
        size: usize,
    ) {
        if chunk_num % 5 == 0 || chunk_num == 1 || chunk_num == total_chunks {
            debug!(
                "[{}] {} 📦 Chunk {}/{} done ({}/{} matched)",
                self.tag, self.emoji, chunk_num, total_chunks, matched, size
            );
        }
    }

    pub fn log_stage_breakdown(&self, stats: &ResolutionStats) {
        for stage in MatchStage::ALL {
            let count = stats.stage_matches(stage);
            if count == 0 {
                continue;
            }
            match stats.stages.get(stage.as_str()).and_then(|s| s.avg_score) {
                Some(avg) => info!(
                    "[{}] {} {} {}: {} matches (avg score {:.2})",
                    self.tag, self.emoji, stage.emoji(), stage, count, avg
                ),
                None => info!(
                    "[{}] {} {} {}: {} matches",
                    self.tag, self.emoji, stage.emoji(), stage, count
                ),
            }
        }
    }

    pub fn log_completion(&self, stats: &ResolutionStats) {
        let duration = self.start_time.elapsed();
        info!(
            "[{}] {} 🎉 COMPLETED: {}/{} queries matched ({:.1}%) in {:.2?}",
            self.tag,
            self.emoji,
            stats.matched,
            stats.total_queries,
            stats.match_rate(),
            duration
        );
        self.log_stage_breakdown(stats);
        if stats.unmatched > 0 {
            info!(
                "[{}] {} ❔ {} queries left unmatched",
                self.tag, self.emoji, stats.unmatched
            );
        }
        self.log_data_quality_issue("blank queries", stats.empty_queries);
    }

    pub fn log_data_quality_issue(&self, issue_type: &str, count: usize) {
        if count > 0 {
            warn!(
                "[{}] {} ⚠️  Data quality: {} instances of {}",
                self.tag, self.emoji, count, issue_type
            );
        }
    }

    pub fn log_warning(&self, message: &str) {
        warn!("[{}] {} ⚠️  {}", self.tag, self.emoji, message);
    }

    pub fn get_elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}
