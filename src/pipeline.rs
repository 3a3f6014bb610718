use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use futures::future::join_all;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use crate::checkpoint::{Checkpoint, CheckpointFile};
use crate::config::{Config, ExistingCheck, WriteMode};
use crate::error::Result;
use crate::models::{Food, IngredientTranslation};
use crate::progress::{self, ProgressReporter, Stats, StatsSnapshot};
use crate::store::{ExistingLocales, TranslationStore};
use crate::translate::{RetryPolicy, RetryingTranslator, TranslationOutcome, Translator};

/// Knobs of a bulk run that do not come from the backends themselves
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub languages: Vec<String>,
    pub source_language: String,
    pub page_size: usize,
    pub delay_between_batches: Duration,
    pub existing_check: ExistingCheck,
    pub write_mode: WriteMode,
    /// Translate but never write
    pub dry_run: bool,
    /// Stop after this many foods in the current run
    pub limit_foods: Option<u64>,
    /// Retries for page reads
    pub page_retry: RetryPolicy,
    pub show_progress: bool,
}

impl PipelineOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            languages: config.pipeline.languages.clone(),
            source_language: config.translate.source_language.clone(),
            page_size: config.pipeline.page_size,
            delay_between_batches: Duration::from_millis(config.pipeline.delay_between_batches_ms),
            existing_check: config.pipeline.existing_check,
            write_mode: config.pipeline.write_mode,
            dry_run: false,
            limit_foods: None,
            page_retry: RetryPolicy::new(
                config.database.max_retries.saturating_sub(1),
                Duration::from_millis(config.database.retry_base_delay_ms),
                config.translate.backoff,
            ),
            show_progress: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Ran out of foods; the checkpoint was removed
    Completed,
    /// Stopped by the shutdown signal; the checkpoint of the last full page is kept
    Interrupted,
    /// Stopped at `limit_foods`; the checkpoint is kept for the next run
    LimitReached,
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub status: RunStatus,
    /// Totals including earlier resumed runs
    pub stats: StatsSnapshot,
    /// Counts of this run only
    pub session: StatsSnapshot,
    pub total_foods: Option<u64>,
    pub compute_secs: f64,
}

/// Pages through the source table and fills in missing translations
pub struct Pipeline {
    store: Arc<dyn TranslationStore>,
    translator: RetryingTranslator,
    db_limit: Arc<Semaphore>,
    checkpoint: CheckpointFile,
    options: PipelineOptions,
}

impl Pipeline {
    pub fn new(
        config: &Config,
        translator: Arc<dyn Translator>,
        store: Arc<dyn TranslationStore>,
    ) -> Self {
        let translation_limit = Arc::new(Semaphore::new(config.pipeline.max_concurrent_translations));
        let translator = RetryingTranslator::new(translator, RetryPolicy::from_config(&config.translate))
            .with_limit(translation_limit);

        Self {
            store,
            translator,
            db_limit: Arc::new(Semaphore::new(config.pipeline.max_concurrent_db_operations)),
            checkpoint: CheckpointFile::new(&config.pipeline.checkpoint_path),
            options: PipelineOptions::from_config(config),
        }
    }

    pub fn with_options(mut self, options: PipelineOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Run until done or until Ctrl-C
    pub async fn run(&self) -> Result<RunSummary> {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Could not listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    /// Run until done or until `shutdown` resolves
    pub async fn run_until<F>(&self, shutdown: F) -> Result<RunSummary>
    where
        F: Future<Output = ()>,
    {
        info!("Starting bulk translation");
        info!("Languages: {}", self.options.languages.join(", "));
        info!("Page size: {}", self.options.page_size);

        self.translator.inner().health_check().await?;
        info!("Translation API ({}) is reachable", self.translator.inner().name());

        let mut checkpoint = self.checkpoint.load().await.unwrap_or_else(Checkpoint::fresh);
        if checkpoint.processed_foods > 0 {
            info!("Resuming from {} foods processed", checkpoint.processed_foods);
            info!(
                "Previous compute time: {}",
                progress::format_duration(checkpoint.total_compute_time as u64)
            );
            if let Some(started) = checkpoint.started_at() {
                info!("Job started: {}", started.format("%Y-%m-%d %H:%M:%S"));
            }
        }

        let resumed = checkpoint.stats();
        let base_compute = checkpoint.total_compute_time;
        let started = Instant::now();
        let stats = Stats::from_snapshot(&resumed);

        let total = match self.store.count_foods().await {
            Ok(total) => total,
            Err(e) => {
                warn!("Could not count foods, progress will have no total: {}", e);
                None
            }
        };
        if let Some(total) = total {
            info!("Total foods: {}", total);
            info!("Total translations needed: {}", total * self.options.languages.len() as u64);
        }

        let reporter = ProgressReporter::new(total, resumed.processed_foods, self.options.show_progress);
        let mut offset = checkpoint.processed_foods as usize;
        let mut status = RunStatus::Completed;

        tokio::pin!(shutdown);

        loop {
            if let Some(total) = total.filter(|t| *t > 0) {
                if offset as u64 >= total {
                    break;
                }
            }

            let limit = match self.options.limit_foods {
                Some(max) => {
                    let done = stats.snapshot().since(&resumed).processed_foods;
                    if done >= max {
                        info!("Reached the limit of {} foods for this run", max);
                        status = RunStatus::LimitReached;
                        break;
                    }
                    self.options.page_size.min((max - done) as usize)
                }
                None => self.options.page_size,
            };

            let foods = tokio::select! {
                biased;
                _ = &mut shutdown => { status = RunStatus::Interrupted; break; }
                page = self.fetch_page(offset, limit) => page?,
            };

            if foods.is_empty() {
                info!("No more foods to process");
                break;
            }

            debug!("Processing foods {}-{}", offset + 1, offset + foods.len());

            let page = tokio::select! {
                biased;
                _ = &mut shutdown => { status = RunStatus::Interrupted; break; }
                page = self.process_page(&foods) => page,
            };

            stats.add_translated(page.translated);
            stats.add_skipped(page.skipped);
            stats.add_failed(page.failed);
            stats.add_processed(foods.len() as u64);
            offset += limit;

            let snapshot = stats.snapshot();
            if !self.options.dry_run {
                checkpoint.record(&snapshot, base_compute + started.elapsed().as_secs_f64());
                if let Err(e) = self.checkpoint.save(&checkpoint).await {
                    warn!("Could not save progress: {}", e);
                }
            }
            reporter.update(&snapshot);

            if !self.options.delay_between_batches.is_zero() {
                tokio::select! {
                    biased;
                    _ = &mut shutdown => { status = RunStatus::Interrupted; break; }
                    _ = tokio::time::sleep(self.options.delay_between_batches) => {}
                }
            }
        }

        reporter.finish();

        let stats = stats.snapshot();
        let compute_secs = base_compute + started.elapsed().as_secs_f64();
        let summary = RunSummary {
            status,
            stats,
            session: stats.since(&resumed),
            total_foods: total,
            compute_secs,
        };

        match summary.status {
            RunStatus::Interrupted | RunStatus::LimitReached => {
                let title = if status == RunStatus::Interrupted {
                    "Translation interrupted"
                } else {
                    "Translation paused at the food limit"
                };
                progress::report(title, &stats, total, compute_secs as u64);
                if !self.options.dry_run {
                    info!(
                        "Progress saved to {}; run again to resume",
                        self.checkpoint.path().display()
                    );
                }
            }
            RunStatus::Completed => {
                progress::report("Bulk translation completed", &stats, total, compute_secs as u64);
                if !self.options.dry_run {
                    self.checkpoint.remove().await?;
                }
            }
        }

        Ok(summary)
    }

    /// Read one page, retrying transient failures
    async fn fetch_page(&self, offset: usize, limit: usize) -> Result<Vec<Food>> {
        let policy = self.options.page_retry;
        let mut attempt = 0;

        loop {
            let result = {
                let _permit = self.db_limit.acquire().await.ok();
                self.store.fetch_foods(offset, limit).await
            };

            match result {
                Ok(foods) => return Ok(foods),
                Err(e) if attempt < policy.max_retries => {
                    let delay = policy.delay_for(attempt);
                    warn!("Retrying page at offset {} in {:?}: {}", offset, delay, e);
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Check, translate and write every (food, locale) pair of a page
    async fn process_page(&self, foods: &[Food]) -> StatsSnapshot {
        let existing = match self.options.existing_check {
            ExistingCheck::Batched => {
                let ids: Vec<String> = foods.iter().map(|f| f.id.clone()).collect();
                let _permit = self.db_limit.acquire().await.ok();
                match self.store.existing_locales(&ids).await {
                    Ok(existing) => existing,
                    Err(e) => {
                        warn!("Failed to check existing translations: {}", e);
                        ExistingLocales::new()
                    }
                }
            }
            ExistingCheck::PerItem => ExistingLocales::new(),
        };

        let page_stats = Stats::default();
        let pending = Mutex::new(Vec::new());

        let items = foods.iter().flat_map(|food| {
            self.options
                .languages
                .iter()
                .map(move |locale| (food, locale.as_str()))
        });
        join_all(items.map(|(food, locale)| {
            self.process_item(food, locale, &existing, &page_stats, &pending)
        }))
        .await;

        let rows = pending.into_inner().unwrap_or_else(|e| e.into_inner());
        if !rows.is_empty() {
            let _permit = self.db_limit.acquire().await.ok();
            match self.store.upsert_translations(&rows).await {
                Ok(()) => {
                    debug!("Saved {} translations", rows.len());
                    page_stats.add_translated(rows.len() as u64);
                }
                Err(e) => {
                    warn!("Batch save of {} translations failed: {}", rows.len(), e);
                    page_stats.add_failed(rows.len() as u64);
                }
            }
        }

        page_stats.snapshot()
    }

    async fn process_item(
        &self,
        food: &Food,
        locale: &str,
        existing: &ExistingLocales,
        stats: &Stats,
        pending: &Mutex<Vec<IngredientTranslation>>,
    ) {
        let name = match food.name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => {
                debug!("Food {} has no name, skipping {}", food.id, locale);
                stats.add_skipped(1);
                return;
            }
        };

        let exists = match self.options.existing_check {
            ExistingCheck::Batched => existing
                .get(&food.id)
                .is_some_and(|locales| locales.contains(locale)),
            ExistingCheck::PerItem => {
                let _permit = self.db_limit.acquire().await.ok();
                match self.store.translation_exists(&food.id, locale).await {
                    Ok(exists) => exists,
                    Err(e) => {
                        warn!("Failed to check translation for {} ({}): {}", food.id, locale, e);
                        false
                    }
                }
            }
        };

        if exists {
            stats.add_skipped(1);
            return;
        }

        let translation = match self
            .translator
            .translate_text(name, &self.options.source_language, locale)
            .await
        {
            TranslationOutcome::Translated(text) => text,
            TranslationOutcome::Unchanged => {
                stats.add_skipped(1);
                return;
            }
            TranslationOutcome::Exhausted { .. } => {
                stats.add_failed(1);
                return;
            }
        };

        let row = IngredientTranslation::new(&food.id, locale, &translation);

        if self.options.dry_run {
            debug!("[dry run] {} -> {} ({})", name, translation, locale);
            stats.add_translated(1);
            return;
        }

        match self.options.write_mode {
            WriteMode::PerRow => {
                let _permit = self.db_limit.acquire().await.ok();
                match self.store.upsert_translation(&row).await {
                    Ok(()) => {
                        debug!("Saved {} -> {} ({})", name, translation, locale);
                        stats.add_translated(1);
                    }
                    Err(e) => {
                        warn!("Failed to save translation for {} ({}): {}", food.id, locale, e);
                        stats.add_failed(1);
                    }
                }
            }
            WriteMode::Batched => {
                pending.lock().unwrap_or_else(|e| e.into_inner()).push(row);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::Ordering;

    use crate::error::CibusError;
    use crate::store::testing::MemoryStore;
    use crate::translate::testing::{DictionaryTranslator, FlakyTranslator};

    fn dictionary() -> Arc<DictionaryTranslator> {
        Arc::new(DictionaryTranslator::new(&[
            ("Apple", "es", "Manzana"),
            ("Apple", "de", "Apfel"),
            ("Apple", "it", "Mela"),
            ("Bread", "es", "Pan"),
            ("Bread", "de", "Brot"),
            ("Bread", "it", "Pane"),
        ]))
    }

    fn test_config(dir: &tempfile::TempDir) -> Config {
        let mut config = Config::default();
        config.database.api_key = "key".to_string();
        config.pipeline.page_size = 2;
        config.pipeline.delay_between_batches_ms = 0;
        config.pipeline.checkpoint_path = dir.path().join("progress.json").display().to_string();
        config.translate.retry_base_delay_ms = 1;
        config.database.retry_base_delay_ms = 1;
        config
    }

    fn pipeline(
        config: &Config,
        translator: Arc<dyn Translator>,
        store: Arc<MemoryStore>,
    ) -> Pipeline {
        let pipeline = Pipeline::new(config, translator, store);
        let mut options = pipeline.options().clone();
        options.show_progress = false;
        pipeline.with_options(options)
    }

    fn never() -> impl Future<Output = ()> {
        std::future::pending()
    }

    #[tokio::test]
    async fn test_fresh_run_translates_missing_pairs() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(&dir);
        let store = Arc::new(MemoryStore::with_foods(&["Apple", "Bread", "Tofu"]));
        store.seed("1", "es", "Manzana");
        let translator = dictionary();

        let summary = pipeline(&config, translator.clone(), store.clone())
            .run_until(never())
            .await
            .unwrap();

        assert_eq!(summary.status, RunStatus::Completed);
        assert_eq!(summary.total_foods, Some(3));
        assert_eq!(
            summary.stats,
            StatsSnapshot { processed_foods: 3, translated: 5, failed: 0, skipped: 4 }
        );
        // The seeded pair is never sent to the translator
        assert_eq!(translator.calls(), 8);
        assert_eq!(store.row_count(), 6);
        assert_eq!(store.get("2", "de").as_deref(), Some("Brot"));
        assert_eq!(store.get("3", "es"), None);
        assert!(!dir.path().join("progress.json").exists());
    }

    #[tokio::test]
    async fn test_resumes_from_checkpoint() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(&dir);

        let mut checkpoint = Checkpoint::fresh();
        checkpoint.record(
            &StatsSnapshot { processed_foods: 2, translated: 6, failed: 0, skipped: 0 },
            30.0,
        );
        CheckpointFile::new(&config.pipeline.checkpoint_path)
            .save(&checkpoint)
            .await
            .unwrap();

        let store = Arc::new(MemoryStore::with_foods(&["Apple", "Bread", "Tofu"]));
        let translator = dictionary();

        let summary = pipeline(&config, translator.clone(), store.clone())
            .run_until(never())
            .await
            .unwrap();

        // Only the third food is looked at
        assert_eq!(translator.calls(), 3);
        assert_eq!(summary.stats.processed_foods, 3);
        assert_eq!(summary.stats.translated, 6);
        assert_eq!(summary.stats.skipped, 3);
        assert_eq!(summary.session.processed_foods, 1);
        assert!(summary.compute_secs >= 30.0);
    }

    #[tokio::test]
    async fn test_per_item_checks_and_batched_writes_agree() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = test_config(&dir);
        config.pipeline.existing_check = ExistingCheck::PerItem;
        config.pipeline.write_mode = WriteMode::Batched;

        let store = Arc::new(MemoryStore::with_foods(&["Apple", "Bread", "Tofu"]));
        store.seed("1", "es", "Manzana");

        let summary = pipeline(&config, dictionary(), store.clone())
            .run_until(never())
            .await
            .unwrap();

        assert_eq!(
            summary.stats,
            StatsSnapshot { processed_foods: 3, translated: 5, failed: 0, skipped: 4 }
        );
        // One write for the first page; the Tofu page has nothing to write
        assert_eq!(store.write_requests.load(Ordering::SeqCst), 1);
        assert_eq!(store.lookups.load(Ordering::SeqCst), 9);
    }

    #[tokio::test]
    async fn test_failed_writes_are_counted() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(&dir);
        let store = Arc::new(MemoryStore::with_foods(&["Apple", "Bread"]));
        store.fail_writes.store(true, Ordering::SeqCst);

        let summary = pipeline(&config, dictionary(), store.clone())
            .run_until(never())
            .await
            .unwrap();

        assert_eq!(summary.stats.failed, 6);
        assert_eq!(summary.stats.success_rate(), Some(0.0));
        assert_eq!(store.row_count(), 0);
    }

    #[tokio::test]
    async fn test_failed_batched_write_counts_every_row() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = test_config(&dir);
        config.pipeline.write_mode = WriteMode::Batched;
        let store = Arc::new(MemoryStore::with_foods(&["Apple", "Bread"]));
        store.fail_writes.store(true, Ordering::SeqCst);

        let summary = pipeline(&config, dictionary(), store.clone())
            .run_until(never())
            .await
            .unwrap();

        assert_eq!(
            summary.stats,
            StatsSnapshot { processed_foods: 2, translated: 0, failed: 6, skipped: 0 }
        );
        assert_eq!(store.write_requests.load(Ordering::SeqCst), 1);
        assert_eq!(store.row_count(), 0);
    }

    #[tokio::test]
    async fn test_failed_existence_checks_count_as_missing() {
        for mode in [ExistingCheck::Batched, ExistingCheck::PerItem] {
            let dir = tempfile::tempdir().unwrap();
            let mut config = test_config(&dir);
            config.pipeline.existing_check = mode;
            let store = Arc::new(MemoryStore::with_foods(&["Apple", "Bread"]));
            store.seed("1", "es", "Manzana");
            store.fail_lookups.store(true, Ordering::SeqCst);
            let translator = dictionary();

            let summary = pipeline(&config, translator.clone(), store.clone())
                .run_until(never())
                .await
                .unwrap();

            assert_eq!(
                summary.stats,
                StatsSnapshot { processed_foods: 2, translated: 6, failed: 0, skipped: 0 },
                "{:?}",
                mode
            );
            // The seeded pair is translated again and merged
            assert_eq!(translator.calls(), 6);
            assert_eq!(store.row_count(), 6);
            assert_eq!(store.get("1", "es").as_deref(), Some("Manzana"));
        }
    }

    #[tokio::test]
    async fn test_foods_without_names_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(&dir);
        let mut store = MemoryStore::with_foods(&["Apple"]);
        store.foods.push(Food { id: "2".to_string(), name: None });
        store.foods.push(Food { id: "3".to_string(), name: Some("  ".to_string()) });
        let store = Arc::new(store);
        let translator = dictionary();

        let summary = pipeline(&config, translator.clone(), store.clone())
            .run_until(never())
            .await
            .unwrap();

        assert_eq!(summary.status, RunStatus::Completed);
        assert_eq!(
            summary.stats,
            StatsSnapshot { processed_foods: 3, translated: 3, failed: 0, skipped: 6 }
        );
        assert_eq!(translator.calls(), 3);
        assert_eq!(store.row_count(), 3);
    }

    #[tokio::test]
    async fn test_unhealthy_backend_stops_before_reading() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(&dir);
        let store = Arc::new(MemoryStore::with_foods(&["Apple"]));
        let flaky = Arc::new(FlakyTranslator::new(0, "Manzana"));

        let err = pipeline(&config, flaky.clone(), store.clone())
            .run_until(never())
            .await
            .unwrap_err();

        assert!(matches!(err, CibusError::Translation(_)));
        assert_eq!(flaky.calls(), 0);
    }

    #[tokio::test]
    async fn test_exhausted_retries_count_as_failed() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(&dir);
        let store = Arc::new(MemoryStore::with_foods(&["Apple"]));
        let flaky = Arc::new(FlakyTranslator::new(usize::MAX, "never"));

        let mut pipeline = pipeline(&config, dictionary(), store.clone());
        pipeline.translator = RetryingTranslator::new(
            flaky.clone(),
            RetryPolicy::new(1, Duration::from_millis(1), config.translate.backoff),
        );

        let page = pipeline.process_page(&store.foods).await;
        assert_eq!(page, StatsSnapshot { processed_foods: 0, translated: 0, failed: 3, skipped: 0 });
        assert_eq!(flaky.calls(), 6);
        assert_eq!(store.row_count(), 0);
    }

    #[tokio::test]
    async fn test_interrupt_keeps_last_page_checkpoint() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = test_config(&dir);
        config.pipeline.delay_between_batches_ms = 10_000;
        let store = Arc::new(MemoryStore::with_foods(&["Apple", "Bread", "Tofu"]));

        let summary = pipeline(&config, dictionary(), store.clone())
            .run_until(tokio::time::sleep(Duration::from_millis(200)))
            .await
            .unwrap();

        assert_eq!(summary.status, RunStatus::Interrupted);
        assert_eq!(summary.stats.processed_foods, 2);

        let saved = CheckpointFile::new(&config.pipeline.checkpoint_path).load().await.unwrap();
        assert_eq!(saved.processed_foods, 2);
        assert_eq!(saved.translated_count, 6);
    }

    #[tokio::test]
    async fn test_page_read_failure_stops_with_checkpoint_intact() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(&dir);
        let mut store = MemoryStore::with_foods(&["Apple", "Bread", "Tofu"]);
        store.fail_reads_at = Some(2);
        let store = Arc::new(store);

        let err = pipeline(&config, dictionary(), store.clone())
            .run_until(never())
            .await
            .unwrap_err();
        assert!(matches!(err, CibusError::Store(_)));

        let saved = CheckpointFile::new(&config.pipeline.checkpoint_path).load().await.unwrap();
        assert_eq!(saved.processed_foods, 2);
    }

    #[tokio::test]
    async fn test_limit_and_dry_run() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(&dir);
        let store = Arc::new(MemoryStore::with_foods(&["Apple", "Bread", "Tofu"]));

        let pipeline = pipeline(&config, dictionary(), store.clone());
        let mut options = pipeline.options().clone();
        options.limit_foods = Some(1);
        options.dry_run = true;
        let summary = pipeline.with_options(options).run_until(never()).await.unwrap();

        assert_eq!(summary.status, RunStatus::LimitReached);
        assert_eq!(summary.stats.processed_foods, 1);
        assert_eq!(summary.stats.translated, 3);
        assert_eq!(store.row_count(), 0);
        assert_eq!(store.write_requests.load(Ordering::SeqCst), 0);
        assert!(!dir.path().join("progress.json").exists());
    }

    #[tokio::test]
    async fn test_limit_keeps_checkpoint_for_next_run() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(&dir);
        let store = Arc::new(MemoryStore::with_foods(&["Apple", "Bread", "Tofu"]));

        let first = pipeline(&config, dictionary(), store.clone());
        let mut options = first.options().clone();
        options.limit_foods = Some(2);
        let summary = first.with_options(options).run_until(never()).await.unwrap();
        assert_eq!(summary.status, RunStatus::LimitReached);
        assert!(dir.path().join("progress.json").exists());

        let summary = pipeline(&config, dictionary(), store.clone())
            .run_until(never())
            .await
            .unwrap();
        assert_eq!(summary.status, RunStatus::Completed);
        assert_eq!(summary.session.processed_foods, 1);
        assert_eq!(summary.stats.processed_foods, 3);
        assert!(!dir.path().join("progress.json").exists());
    }
}
