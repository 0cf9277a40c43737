// src/matching/manager.rs - Batch resolution across blocking workers
use anyhow::{Context, Result};
use chrono::Utc;
use futures::future::join_all;
use indicatif::ProgressBar;
use log::info;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::matching::reference::ReferenceSet;
use crate::matching::resolver::NameResolver;
use crate::models::matching::Resolution;
use crate::models::stats_models::{ResolutionStats, RunSummary};
use crate::utils::progress_bars::logging::ResolutionLogger;
use crate::utils::progress_bars::progress_config::ProgressConfig;

// Upper bound on queries handed to one blocking task
const MAX_CHUNK_SIZE: usize = 2_000;

/// Everything produced by one resolution run.
#[derive(Debug, Clone)]
pub struct ResolutionRun {
    pub resolutions: Vec<Resolution>,
    pub summary: RunSummary,
}

impl ResolutionRun {
    pub fn stats(&self) -> &ResolutionStats {
        &self.summary.stats
    }
}

fn calculate_chunk_size(query_count: usize, workers: usize) -> usize {
    let workers = workers.max(1);
    let per_worker = (query_count + workers - 1) / workers;
    per_worker.clamp(1, MAX_CHUNK_SIZE)
}

/// Resolves `queries` against `reference`, spreading the work over
/// `worker_threads` blocking tasks. Results come back in query order.
pub async fn run_resolution(
    resolver: Arc<NameResolver>,
    reference: Arc<ReferenceSet>,
    queries: Vec<String>,
    progress_config: &ProgressConfig,
) -> Result<ResolutionRun> {
    let logger = ResolutionLogger::new();
    let run_id = Uuid::new_v4().to_string();
    let run_timestamp = Utc::now().naive_utc();
    let workers = resolver.config().worker_threads.max(1);
    let total_queries = queries.len();

    logger.log_start(&run_id, reference.len(), reference.distinct_len(), total_queries);
    if reference.is_empty() {
        logger.log_warning("Reference set is empty, every query will be unmatched");
    }

    let chunk_size = calculate_chunk_size(total_queries, workers);
    logger.log_batch_processing_start(total_queries, chunk_size, workers);

    let multi_progress = progress_config.create_multi_progress();
    let pb: Option<ProgressBar> =
        progress_config.create_query_bar(multi_progress.as_ref(), total_queries as u64);
    if let Some(pb) = &pb {
        pb.set_message("Resolving names...");
    }

    let semaphore = Arc::new(Semaphore::new(workers));
    let chunks: Vec<Vec<String>> = queries.chunks(chunk_size).map(|c| c.to_vec()).collect();
    let total_chunks = chunks.len();
    let mut tasks: Vec<JoinHandle<Result<Vec<Resolution>>>> = Vec::with_capacity(total_chunks);

    for chunk in chunks {
        let resolver_clone = resolver.clone();
        let reference_clone = reference.clone();
        let semaphore_clone = semaphore.clone();
        let pb_clone = pb.clone();
        tasks.push(tokio::spawn(async move {
            let permit = semaphore_clone
                .acquire_owned()
                .await
                .context("Failed to acquire worker slot for name resolution")?;
            let resolutions = tokio::task::spawn_blocking(move || {
                let _permit_guard = permit;
                let resolved = resolver_clone.resolve_all_detailed(&chunk, &reference_clone);
                if let Some(pb) = &pb_clone {
                    pb.inc(resolved.len() as u64);
                }
                resolved
            })
            .await
            .context("Name resolution worker panicked")?;
            Ok(resolutions)
        }));
    }

    logger.log_phase("Resolving", Some(&format!("{} chunks queued", total_chunks)));

    let mut resolutions = Vec::with_capacity(total_queries);
    for (chunk_idx, join_result) in join_all(tasks).await.into_iter().enumerate() {
        let chunk_resolutions = join_result.context("Name resolution task failed to join")??;
        let matched = chunk_resolutions
            .iter()
            .filter(|r| r.result.is_matched())
            .count();
        logger.log_chunk_complete(chunk_idx + 1, total_chunks, matched, chunk_resolutions.len());
        resolutions.extend(chunk_resolutions);
    }

    let stats = ResolutionStats::from_resolutions(&resolutions);
    if let Some(pb) = &pb {
        if progress_config.should_show_stage_stats() {
            pb.finish_with_message(format!(
                "{} matched, {} unmatched",
                stats.matched, stats.unmatched
            ));
        } else {
            pb.finish();
        }
    }
    logger.log_completion(&stats);

    let summary = RunSummary {
        run_id,
        run_timestamp,
        reference_entries: reference.len(),
        distinct_reference_keys: reference.distinct_len(),
        reference_fingerprint: reference.fingerprint(),
        config: resolver.config().clone(),
        stats,
        duration_secs: logger.get_elapsed().as_secs_f64(),
    };
    info!(
        "Run {} finished in {:.2}s",
        summary.run_id, summary.duration_secs
    );

    Ok(ResolutionRun {
        resolutions,
        summary,
    })
}
