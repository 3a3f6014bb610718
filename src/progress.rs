use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use tracing::info;

/// Counters shared by every task of a run
#[derive(Debug, Default)]
pub struct Stats {
    processed_foods: AtomicU64,
    translated: AtomicU64,
    failed: AtomicU64,
    skipped: AtomicU64,
}

/// Plain copy of `Stats` at one point in time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub processed_foods: u64,
    pub translated: u64,
    pub failed: u64,
    pub skipped: u64,
}

impl Stats {
    pub fn from_snapshot(snapshot: &StatsSnapshot) -> Self {
        Self {
            processed_foods: AtomicU64::new(snapshot.processed_foods),
            translated: AtomicU64::new(snapshot.translated),
            failed: AtomicU64::new(snapshot.failed),
            skipped: AtomicU64::new(snapshot.skipped),
        }
    }

    pub fn add_processed(&self, n: u64) {
        self.processed_foods.fetch_add(n, Ordering::Relaxed);
    }

    pub fn add_translated(&self, n: u64) {
        self.translated.fetch_add(n, Ordering::Relaxed);
    }

    pub fn add_failed(&self, n: u64) {
        self.failed.fetch_add(n, Ordering::Relaxed);
    }

    pub fn add_skipped(&self, n: u64) {
        self.skipped.fetch_add(n, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            processed_foods: self.processed_foods.load(Ordering::Relaxed),
            translated: self.translated.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
        }
    }
}

impl StatsSnapshot {
    /// Share of attempted writes that succeeded, in percent
    pub fn success_rate(&self) -> Option<f64> {
        let attempted = self.translated + self.failed;
        if attempted == 0 {
            None
        } else {
            Some(self.translated as f64 / attempted as f64 * 100.0)
        }
    }

    /// Counts accumulated since `earlier`
    pub fn since(&self, earlier: &StatsSnapshot) -> StatsSnapshot {
        StatsSnapshot {
            processed_foods: self.processed_foods.saturating_sub(earlier.processed_foods),
            translated: self.translated.saturating_sub(earlier.translated),
            failed: self.failed.saturating_sub(earlier.failed),
            skipped: self.skipped.saturating_sub(earlier.skipped),
        }
    }
}

/// Terminal progress bar over foods processed
pub struct ProgressReporter {
    bar: ProgressBar,
}

impl ProgressReporter {
    pub fn new(total: Option<u64>, already_done: u64, visible: bool) -> Self {
        let bar = match total {
            Some(total) if total > 0 => {
                let bar = ProgressBar::new(total);
                bar.set_style(ProgressStyle::default_bar()
                    .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} foods ({per_sec}, ETA {eta}) {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("█▉░"));
                bar
            }
            _ => {
                let bar = ProgressBar::new_spinner();
                bar.set_style(ProgressStyle::default_spinner()
                    .template("{spinner:.green} [{elapsed_precise}] {pos} foods ({per_sec}) {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()));
                bar
            }
        };

        if !visible {
            bar.set_draw_target(ProgressDrawTarget::hidden());
        }
        // Resumed offset is not throughput
        bar.set_position(already_done);
        bar.reset_eta();
        bar.enable_steady_tick(Duration::from_millis(200));

        Self { bar }
    }

    pub fn update(&self, stats: &StatsSnapshot) {
        self.bar.set_position(stats.processed_foods);
        self.bar.set_message(format!(
            "✓{} ↷{} ✗{}",
            stats.translated, stats.skipped, stats.failed
        ));
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

/// Log a run report in the same shape for completion and interruption
pub fn report(title: &str, stats: &StatsSnapshot, total: Option<u64>, compute_secs: u64) {
    info!("{}", title);
    match total {
        Some(total) if total > 0 => info!(
            "  Foods: {}/{} ({:.1}%)",
            stats.processed_foods,
            total,
            stats.processed_foods as f64 / total as f64 * 100.0
        ),
        _ => info!("  Foods: {}", stats.processed_foods),
    }
    info!("  Translated: {}", stats.translated);
    info!("  Skipped: {}", stats.skipped);
    info!("  Failed: {}", stats.failed);
    if let Some(rate) = stats.success_rate() {
        info!("  Success rate: {:.1}%", rate);
    }
    info!("  Total compute time: {}", format_duration(compute_secs));
}

/// Format duration in seconds to a human-readable string
pub fn format_duration(seconds: u64) -> String {
    let days = seconds / (24 * 60 * 60);
    let hours = (seconds % (24 * 60 * 60)) / (60 * 60);
    let minutes = (seconds % (60 * 60)) / 60;
    let secs = seconds % 60;

    if days > 0 {
        format!("{}d {}h", days, hours)
    } else if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, secs)
    } else {
        format!("{}s", secs)
    }
}
