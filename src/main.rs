use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use name_matching_lib::matching::manager::run_resolution;
use name_matching_lib::matching::scorer::SimilarityAlgorithm;
use name_matching_lib::matching::{NameResolver, ReferenceSet};
use name_matching_lib::utils::env::load_env;
use name_matching_lib::utils::export::{export_matches, export_summary, DEFAULT_OUTPUT_FILE};
use name_matching_lib::utils::matcher_config::{print_env_config_example, MatcherConfig};
use name_matching_lib::utils::progress_bars::progress_config::ProgressConfig;
use name_matching_lib::utils::tabular::{load_queries, load_reference_names};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Tab-delimited file with a REFERENCIA column
    #[arg(long, required_unless_present = "print_env")]
    reference: Option<PathBuf>,

    /// Tab-delimited file with a CONSULTA column
    #[arg(long, required_unless_present = "print_env")]
    queries: Option<PathBuf>,

    /// Output file (.xlsx workbook, .csv comma-separated, tab-separated otherwise)
    #[arg(short, long, default_value = DEFAULT_OUTPUT_FILE)]
    output: PathBuf,

    /// Optional JSON run summary
    #[arg(long)]
    summary: Option<PathBuf>,

    /// Minimum accepted fuzzy score (0-100)
    #[arg(long)]
    threshold: Option<f64>,

    /// Ranked candidates considered by the fuzzy stage
    #[arg(long)]
    candidate_limit: Option<usize>,

    /// jaro | jaro_winkler | levenshtein | damerau_levenshtein | sorensen_dice
    #[arg(long)]
    algorithm: Option<SimilarityAlgorithm>,

    /// Resolve blank queries as unmatched
    #[arg(long)]
    guard_empty_query: bool,

    /// Number of resolution workers
    #[arg(long)]
    workers: Option<usize>,

    /// Disable progress bars
    #[arg(long)]
    no_progress: bool,

    /// Print the supported environment variables and exit
    #[arg(long)]
    print_env: bool,
}

impl Args {
    fn apply_overrides(&self, mut config: MatcherConfig) -> MatcherConfig {
        if let Some(threshold) = self.threshold {
            config.similarity_threshold = threshold;
        }
        if let Some(limit) = self.candidate_limit {
            config.candidate_limit = limit;
        }
        if let Some(algorithm) = self.algorithm {
            config.algorithm = algorithm;
        }
        if self.guard_empty_query {
            config.guard_empty_query = true;
        }
        if let Some(workers) = self.workers {
            config.worker_threads = workers;
        }
        config.sanitized()
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging and environment
    load_env();
    env_logger::init();

    let args = Args::parse();
    if args.print_env {
        print_env_config_example();
        return Ok(());
    }

    info!("Starting name reconciliation");
    let start = Instant::now();

    let config = args.apply_overrides(MatcherConfig::from_env());
    config.log_config();

    let mut progress_config = ProgressConfig::from_env();
    if args.no_progress {
        progress_config.enabled = false;
    }

    let reference_path = args
        .reference
        .as_deref()
        .context("--reference is required")?;
    let queries_path = args.queries.as_deref().context("--queries is required")?;

    let reference_names =
        load_reference_names(reference_path).context("Failed to load reference names")?;
    let queries = load_queries(queries_path).context("Failed to load queries")?;
    info!(
        "Loaded {} reference names and {} queries",
        reference_names.len(),
        queries.len()
    );

    let reference = Arc::new(ReferenceSet::new(reference_names));
    let resolver = Arc::new(NameResolver::new(config));

    let run = run_resolution(resolver, reference, queries, &progress_config)
        .await
        .context("Name resolution failed")?;

    export_matches(&args.output, &run.resolutions).context("Failed to export matches")?;
    if let Some(summary_path) = &args.summary {
        export_summary(summary_path, &run.summary).context("Failed to export run summary")?;
    }

    info!("=== Reconciliation Summary ===");
    info!("Run ID: {}", run.summary.run_id);
    info!(
        "Matched: {}/{} ({:.1}%)",
        run.stats().matched,
        run.stats().total_queries,
        run.stats().match_rate()
    );
    info!("Output: {}", args.output.display());
    info!("Total execution time: {:.2?}", start.elapsed());
    Ok(())
}
