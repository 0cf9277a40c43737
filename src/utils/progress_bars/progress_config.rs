// src/utils/progress_bars/progress_config.rs

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::env;

/// Configuration for progress tracking during batch resolution
#[derive(Debug, Clone)]
pub struct ProgressConfig {
    /// Whether to show progress bars at all
    pub enabled: bool,
    /// Refresh rate for progress bars in milliseconds
    pub refresh_rate_ms: u64,
    /// Whether to show per-stage match counts in progress messages
    pub show_stage_stats: bool,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            refresh_rate_ms: 100,
            show_stage_stats: true,
        }
    }
}

impl ProgressConfig {
    /// Create progress configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            enabled: env::var("PROGRESS_ENABLED")
                .unwrap_or_else(|_| "true".to_string())
                .parse()
                .unwrap_or(true),
            refresh_rate_ms: env::var("PROGRESS_REFRESH_RATE_MS")
                .unwrap_or_else(|_| "100".to_string())
                .parse()
                .unwrap_or(100),
            show_stage_stats: env::var("PROGRESS_SHOW_STAGE_STATS")
                .unwrap_or_else(|_| "true".to_string())
                .parse()
                .unwrap_or(true),
        }
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }

    /// Create a MultiProgress instance if progress is enabled, None otherwise
    pub fn create_multi_progress(&self) -> Option<MultiProgress> {
        if self.enabled {
            let refresh_hz = (1000 / self.refresh_rate_ms.max(1)).clamp(1, 60) as u8;
            Some(MultiProgress::with_draw_target(
                ProgressDrawTarget::stderr_with_hz(refresh_hz),
            ))
        } else {
            None
        }
    }

    /// Progress bar over `total` queries, attached to `multi_progress` when present.
    pub fn create_query_bar(
        &self,
        multi_progress: Option<&MultiProgress>,
        total: u64,
    ) -> Option<ProgressBar> {
        let mp = multi_progress?;
        let pb = mp.add(ProgressBar::new(total));
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▉▊▋▌▍▎▏  ");
        pb.set_style(style);
        Some(pb)
    }

    /// Check if stage statistics should be shown
    pub fn should_show_stage_stats(&self) -> bool {
        self.enabled && self.show_stage_stats
    }
}
