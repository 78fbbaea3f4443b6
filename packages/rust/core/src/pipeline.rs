//! End-to-end `generate` pipeline: wiki page → titles → TMDB → sorted list → JSON files.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use scraper::Html;
use tracing::{info, instrument};
use url::Url;

use seenlist_shared::{OutputConfig, PipelineConfig, ResolvedEntry, Result, TmdbConfig};
use seenlist_tmdb::{MetadataResolver, TmdbClient};

use crate::batch::{BatchProgress, ConcurrentPipeline, TitleOutcome};
use crate::list;

/// Configuration for the `generate` pipeline.
#[derive(Debug, Clone)]
pub struct GenerateConfig {
    /// Wiki page to scrape.
    pub wiki_url: Url,
    /// TMDB client settings, API key already resolved.
    pub tmdb: TmdbConfig,
    /// Concurrency and rate limit.
    pub pipeline: PipelineConfig,
    /// Where to write the list.
    pub output: OutputConfig,
    /// Timeout for the wiki fetch.
    pub fetch_timeout: Duration,
}

/// Result of the `generate` pipeline.
#[derive(Debug)]
pub struct GenerateResult {
    /// Titles that survived filtering.
    pub titles_found: usize,
    /// Titles resolved with an IMDb id.
    pub succeeded: usize,
    /// Titles that failed to resolve or had no IMDb id.
    pub failed: usize,
    /// The sorted list that was written.
    pub entries: Vec<ResolvedEntry>,
    /// Files written, snapshot first.
    pub written: Vec<PathBuf>,
    /// Total elapsed time.
    pub elapsed: Duration,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called as each title finishes resolving.
    fn title_resolved(&self, title: &str, outcome: TitleOutcome, current: usize, total: usize);
    /// Called when the pipeline completes.
    fn done(&self, result: &GenerateResult);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn title_resolved(&self, _title: &str, _outcome: TitleOutcome, _current: usize, _total: usize) {}
    fn done(&self, _result: &GenerateResult) {}
}

/// Adapts a `ProgressReporter` to the batch's progress interface.
struct BatchAdapter<'a> {
    inner: &'a dyn ProgressReporter,
}

impl BatchProgress for BatchAdapter<'_> {
    fn title_finished(&self, title: &str, outcome: TitleOutcome, done: usize, total: usize) {
        self.inner.title_resolved(title, outcome, done, total);
    }
}

/// Scrape the wiki page and return its filtered titles.
///
/// Fetch failures are returned as errors; the caller treats them as fatal.
#[instrument(skip_all, fields(url = %url))]
pub async fn scrape_titles(url: &Url, timeout: Duration) -> Result<Vec<String>> {
    let client = seenlist_wiki::build_client(timeout)?;
    let body = seenlist_wiki::fetch_document(&client, url).await?;
    let doc = Html::parse_document(&body);
    Ok(seenlist_wiki::extract_titles(&doc))
}

/// Run the full `generate` pipeline.
///
/// 1. Fetch the wiki page and extract titles
/// 2. Resolve titles against TMDB with bounded concurrency
/// 3. Sort and dedupe
/// 4. Write the JSON list (skipped when empty)
#[instrument(skip_all, fields(url = %config.wiki_url))]
pub async fn generate(
    config: &GenerateConfig,
    progress: &dyn ProgressReporter,
) -> Result<GenerateResult> {
    let start = Instant::now();

    // --- Phase 1: Scrape ---
    progress.phase("Scraping wiki page");
    info!("scraping wiki page");
    let titles = scrape_titles(&config.wiki_url, config.fetch_timeout).await?;
    let titles_found = titles.len();
    info!(count = titles_found, "found unique movies");

    // --- Phase 2: Resolve ---
    progress.phase("Resolving titles on TMDB");
    let client = TmdbClient::new(config.tmdb.clone())?;
    let resolver = MetadataResolver::new(client, config.tmdb.poster_base_url.clone());
    let batch = ConcurrentPipeline::new(resolver, config.pipeline.clone());
    let outcome = batch
        .resolve_all(titles, &BatchAdapter { inner: progress })
        .await;

    // --- Phase 3: Build list ---
    let entries = list::build_list(outcome.entries);
    info!(total = entries.len(), "movies sorted by title");

    // --- Phase 4: Persist ---
    progress.phase("Saving list");
    let written = list::persist(&entries, &config.output, &chrono::Local::now())?;

    let result = GenerateResult {
        titles_found,
        succeeded: outcome.succeeded,
        failed: outcome.failed,
        entries,
        written,
        elapsed: start.elapsed(),
    };

    progress.done(&result);

    info!(
        successful = result.succeeded,
        failed = result.failed,
        total = result.entries.len(),
        elapsed_ms = result.elapsed.as_millis(),
        "generate pipeline complete"
    );

    Ok(result)
}
