//! Bounded-concurrency resolution of many titles.
//!
//! One task is spawned per title. A semaphore admits at most
//! `concurrency` of them at a time; each task holds its permit through its
//! lookups and the post-lookup rate-limit pause, so the upstream API sees at
//! most `concurrency` resolutions per `rate_limit` window. Results and
//! counters live behind one mutex that is only taken to record an outcome.

use std::sync::Arc;

use tokio::sync::{Mutex, Semaphore};
use tokio::task::JoinSet;
use tracing::{error, info, instrument, warn};

use seenlist_shared::{PipelineConfig, PipelineOutcome, ResolvedEntry};
use seenlist_tmdb::{MetadataResolver, SearchApi};

/// How a single title ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleOutcome {
    Resolved,
    MissingImdbId,
    Failed,
}

/// Called from the collecting loop as tasks finish.
pub trait BatchProgress: Send + Sync {
    fn title_finished(&self, title: &str, outcome: TitleOutcome, done: usize, total: usize);
}

impl BatchProgress for () {
    fn title_finished(&self, _title: &str, _outcome: TitleOutcome, _done: usize, _total: usize) {}
}

/// Shared aggregation state.
#[derive(Default)]
struct Aggregate {
    entries: Vec<ResolvedEntry>,
    succeeded: usize,
    failed: usize,
}

/// Fans titles out to a [`MetadataResolver`] under an admission gate.
pub struct ConcurrentPipeline<C> {
    resolver: Arc<MetadataResolver<C>>,
    config: PipelineConfig,
}

impl<C> ConcurrentPipeline<C>
where
    C: SearchApi + 'static,
{
    pub fn new(resolver: MetadataResolver<C>, config: PipelineConfig) -> Self {
        Self {
            resolver: Arc::new(resolver),
            config,
        }
    }

    pub fn resolver(&self) -> &MetadataResolver<C> {
        &self.resolver
    }

    /// Resolve every title and wait for all of them.
    ///
    /// Entries come back in completion order.
    #[instrument(skip_all, fields(titles = titles.len(), concurrency = self.config.concurrency))]
    pub async fn resolve_all(
        &self,
        titles: Vec<String>,
        progress: &dyn BatchProgress,
    ) -> PipelineOutcome {
        let total = titles.len();
        let gate = Arc::new(Semaphore::new(self.config.concurrency.max(1)));
        let aggregate = Arc::new(Mutex::new(Aggregate::default()));
        let mut tasks = JoinSet::new();

        for (index, title) in titles.into_iter().enumerate() {
            let gate = gate.clone();
            let aggregate = aggregate.clone();
            let resolver = self.resolver.clone();
            let rate_limit = self.config.rate_limit;

            tasks.spawn(async move {
                let Ok(_permit) = gate.acquire_owned().await else {
                    aggregate.lock().await.failed += 1;
                    return (title, TitleOutcome::Failed);
                };

                info!(index = index + 1, total, title = %title, "processing");
                let outcome = match resolver.resolve(&title).await {
                    Ok(entry) if entry.is_importable() => {
                        if entry.poster_url.is_some() {
                            info!(title = %entry.title, imdb_id = %entry.imdb_id, "resolved");
                        } else {
                            info!(title = %entry.title, imdb_id = %entry.imdb_id, poster = false, "resolved");
                        }
                        let mut agg = aggregate.lock().await;
                        agg.entries.push(entry);
                        agg.succeeded += 1;
                        TitleOutcome::Resolved
                    }
                    Ok(entry) => {
                        warn!(title = %title, tmdb_id = entry.tmdb_id, "missing IMDb id");
                        aggregate.lock().await.failed += 1;
                        TitleOutcome::MissingImdbId
                    }
                    Err(e) => {
                        if e.is_per_title() {
                            warn!(title = %title, error = %e, "not found");
                        } else {
                            error!(title = %title, error = %e, "resolution failed");
                        }
                        aggregate.lock().await.failed += 1;
                        TitleOutcome::Failed
                    }
                };

                if !rate_limit.is_zero() {
                    tokio::time::sleep(rate_limit).await;
                }

                (title, outcome)
            });
        }

        let mut done = 0;
        while let Some(joined) = tasks.join_next().await {
            done += 1;
            match joined {
                Ok((title, outcome)) => progress.title_finished(&title, outcome, done, total),
                Err(e) => {
                    warn!(error = %e, "resolution task panicked");
                    aggregate.lock().await.failed += 1;
                }
            }
        }

        let agg = std::mem::take(&mut *aggregate.lock().await);
        info!(
            succeeded = agg.succeeded,
            failed = agg.failed,
            "resolution complete"
        );

        PipelineOutcome {
            entries: agg.entries,
            succeeded: agg.succeeded,
            failed: agg.failed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use seenlist_shared::{Result, SearchResult, SeenlistError};

    /// Resolves every title to itself with id = title length, tracking how
    /// many searches run at once.
    #[derive(Default)]
    struct CountingApi {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
        calls: AtomicUsize,
        missing: HashSet<String>,
        broken: HashSet<String>,
        no_imdb: HashSet<u64>,
        delay: Duration,
    }

    impl CountingApi {
        fn with_delay(ms: u64) -> Self {
            Self {
                delay: Duration::from_millis(ms),
                ..Self::default()
            }
        }
    }

    impl SearchApi for CountingApi {
        async fn search_by_title(&self, title: &str) -> Result<Vec<SearchResult>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if self.missing.contains(title) {
                return Ok(vec![]);
            }
            if self.broken.contains(title) {
                return Err(SeenlistError::config("api key revoked"));
            }
            Ok(vec![SearchResult {
                id: title.len() as u64 * 1000 + title.bytes().map(u64::from).sum::<u64>(),
                title: title.to_string(),
                poster_path: None,
                release_date: None,
                genre_ids: vec![],
            }])
        }

        async fn fetch_imdb_id(&self, tmdb_id: u64) -> Result<String> {
            if self.no_imdb.contains(&tmdb_id) {
                return Ok(String::new());
            }
            Ok(format!("tt{tmdb_id:07}"))
        }
    }

    fn pipeline(api: CountingApi, concurrency: usize) -> ConcurrentPipeline<CountingApi> {
        ConcurrentPipeline::new(
            MetadataResolver::new(api, "https://img.example"),
            PipelineConfig {
                concurrency,
                rate_limit: Duration::from_millis(5),
            },
        )
    }

    fn titles(n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("Movie {i}")).collect()
    }

    #[tokio::test]
    async fn admission_gate_bounds_in_flight_work() {
        let p = pipeline(CountingApi::with_delay(30), 5);
        let outcome = p.resolve_all(titles(12), &()).await;

        let api = p.resolver().client();
        assert_eq!(api.calls.load(Ordering::SeqCst), 12);
        let peak = api.peak.load(Ordering::SeqCst);
        assert!(peak <= 5, "peak in-flight was {peak}");
        assert!(peak > 1, "expected some overlap, peak was {peak}");
        assert_eq!(outcome.succeeded, 12);
        assert_eq!(outcome.failed, 0);
        assert_eq!(outcome.entries.len(), 12);
    }

    #[tokio::test]
    async fn concurrency_of_one_serializes() {
        let p = pipeline(CountingApi::with_delay(5), 1);
        let outcome = p.resolve_all(titles(4), &()).await;
        assert_eq!(p.resolver().client().peak.load(Ordering::SeqCst), 1);
        assert_eq!(outcome.succeeded, 4);
    }

    #[tokio::test]
    async fn failures_are_counted_not_fatal() {
        let mut api = CountingApi::with_delay(1);
        api.missing.insert("Movie 2".into());
        api.missing.insert("Movie 4".into());
        let p = pipeline(api, 3);

        let outcome = p.resolve_all(titles(5), &()).await;
        assert_eq!(outcome.succeeded, 3);
        assert_eq!(outcome.failed, 2);

        let got: HashSet<_> = outcome.entries.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(got, HashSet::from(["Movie 1", "Movie 3", "Movie 5"]));
    }

    #[tokio::test]
    async fn empty_imdb_id_is_a_failure() {
        let mut api = CountingApi::with_delay(1);
        let id = 7 * 1000 + "Movie 1".bytes().map(u64::from).sum::<u64>();
        api.no_imdb.insert(id);
        let p = pipeline(api, 2);

        let outcome = p.resolve_all(titles(2), &()).await;
        assert_eq!(outcome.succeeded, 1);
        assert_eq!(outcome.failed, 1);
        assert!(outcome.entries.iter().all(|e| e.title != "Movie 1"));
        assert!(outcome.entries.iter().all(|e| !e.imdb_id.is_empty()));
    }

    #[tokio::test]
    async fn progress_sees_every_title() {
        struct Recorder(std::sync::Mutex<Vec<(String, TitleOutcome, usize)>>);
        impl BatchProgress for Recorder {
            fn title_finished(&self, title: &str, outcome: TitleOutcome, done: usize, total: usize) {
                assert_eq!(total, 3);
                self.0.lock().unwrap().push((title.to_string(), outcome, done));
            }
        }

        let mut api = CountingApi::with_delay(1);
        api.missing.insert("Movie 3".into());
        let recorder = Recorder(std::sync::Mutex::new(Vec::new()));
        pipeline(api, 5).resolve_all(titles(3), &recorder).await;

        let seen = recorder.0.into_inner().unwrap();
        assert_eq!(seen.len(), 3);
        let mut done: Vec<_> = seen.iter().map(|(_, _, d)| *d).collect();
        done.sort_unstable();
        assert_eq!(done, vec![1, 2, 3]);
        let movie_3 = seen.iter().find(|s| s.0 == "Movie 3").expect("Movie 3 reported");
        assert_eq!(movie_3.1, TitleOutcome::Failed);
    }

    #[tokio::test]
    async fn no_titles_no_work() {
        let p = pipeline(CountingApi::default(), 5);
        let outcome = p.resolve_all(Vec::new(), &()).await;
        assert!(outcome.entries.is_empty());
        assert_eq!(outcome.succeeded + outcome.failed, 0);
    }

    #[tokio::test]
    async fn rate_limit_pause_holds_the_slot() {
        // 12 instant lookups through 5 slots with a 100ms pause each: the
        // pause keeps the slot busy, so at least three waves of it elapse.
        let p = ConcurrentPipeline::new(
            MetadataResolver::new(CountingApi::default(), "https://img.example"),
            PipelineConfig {
                concurrency: 5,
                rate_limit: Duration::from_millis(100),
            },
        );

        let started = std::time::Instant::now();
        let outcome = p.resolve_all(titles(12), &()).await;
        let elapsed = started.elapsed();

        assert_eq!(outcome.succeeded, 12);
        assert!(
            elapsed >= Duration::from_millis(300),
            "finished in {elapsed:?}"
        );
    }

    #[tokio::test]
    async fn non_per_title_errors_still_count_as_failures() {
        let mut api = CountingApi::default();
        api.broken.insert("Movie 3".into());
        let p = pipeline(api, 2);

        let outcome = p.resolve_all(titles(4), &()).await;

        assert_eq!(outcome.succeeded, 3);
        assert_eq!(outcome.failed, 1);
        assert!(outcome.entries.iter().all(|e| e.title != "Movie 3"));
    }
}
