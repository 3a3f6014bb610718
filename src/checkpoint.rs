use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, TimeZone};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{debug, info, warn};

use crate::error::{Result, CibusError};
use crate::progress::StatsSnapshot;

/// Progress snapshot written after every page so an interrupted run can resume
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    #[serde(default)]
    pub processed_foods: u64,
    #[serde(default)]
    pub translated_count: u64,
    #[serde(default)]
    pub failed_count: u64,
    #[serde(default)]
    pub skipped_count: u64,
    /// Unix seconds at which the first run of this job started
    #[serde(default = "unix_now")]
    pub session_start_time: f64,
    /// Seconds spent running, summed over every resumed run
    #[serde(default)]
    pub total_compute_time: f64,
    /// Unix seconds of the last write
    #[serde(default)]
    pub timestamp: f64,
    #[serde(default)]
    pub last_update: Option<String>,
}

pub fn unix_now() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
}

impl Default for Checkpoint {
    fn default() -> Self {
        Self::fresh()
    }
}

impl Checkpoint {
    pub fn fresh() -> Self {
        Self {
            processed_foods: 0,
            translated_count: 0,
            failed_count: 0,
            skipped_count: 0,
            session_start_time: unix_now(),
            total_compute_time: 0.0,
            timestamp: 0.0,
            last_update: None,
        }
    }

    pub fn stats(&self) -> StatsSnapshot {
        StatsSnapshot {
            processed_foods: self.processed_foods,
            translated: self.translated_count,
            failed: self.failed_count,
            skipped: self.skipped_count,
        }
    }

    /// Copy counters in and stamp the write time.
    ///
    /// `compute_time` is the running total including earlier runs.
    pub fn record(&mut self, stats: &StatsSnapshot, compute_time: f64) {
        self.processed_foods = stats.processed_foods;
        self.translated_count = stats.translated;
        self.failed_count = stats.failed;
        self.skipped_count = stats.skipped;
        self.total_compute_time = compute_time;
        self.timestamp = unix_now();
        self.last_update = Some(Local::now().to_rfc3339());
    }

    /// Local wall-clock time the job was first started
    pub fn started_at(&self) -> Option<DateTime<Local>> {
        let secs = self.session_start_time.trunc() as i64;
        let nanos = (self.session_start_time.fract() * 1e9) as u32;
        Local.timestamp_opt(secs, nanos).single()
    }
}

/// JSON checkpoint on local disk
#[derive(Debug, Clone)]
pub struct CheckpointFile {
    path: PathBuf,
}

impl CheckpointFile {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Read the checkpoint; a missing or unreadable file means "start fresh"
    pub async fn load(&self) -> Option<Checkpoint> {
        if !fs::try_exists(&self.path).await.unwrap_or(false) {
            return None;
        }

        match fs::read_to_string(&self.path).await {
            Ok(content) => match serde_json::from_str::<Checkpoint>(&content) {
                Ok(checkpoint) => {
                    debug!("Loaded checkpoint from {}", self.path.display());
                    Some(checkpoint)
                }
                Err(e) => {
                    warn!("Could not parse checkpoint {}, starting fresh: {}", self.path.display(), e);
                    None
                }
            },
            Err(e) => {
                warn!("Could not read checkpoint {}, starting fresh: {}", self.path.display(), e);
                None
            }
        }
    }

    /// Overwrite the checkpoint through a temporary sibling file
    pub async fn save(&self, checkpoint: &Checkpoint) -> Result<()> {
        let content = serde_json::to_string_pretty(checkpoint)
            .map_err(|e| CibusError::Checkpoint(format!("Failed to serialize checkpoint: {}", e)))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let temp_path = self.temp_path();
        fs::write(&temp_path, content).await
            .map_err(|e| CibusError::Checkpoint(format!("Failed to write {}: {}", temp_path.display(), e)))?;
        fs::rename(&temp_path, &self.path).await
            .map_err(|e| CibusError::Checkpoint(format!("Failed to replace {}: {}", self.path.display(), e)))?;

        debug!("Saved checkpoint: {} foods processed", checkpoint.processed_foods);
        Ok(())
    }

    /// Delete the checkpoint; returns whether one existed
    pub async fn remove(&self) -> Result<bool> {
        match fs::remove_file(&self.path).await {
            Ok(()) => {
                info!("Removed checkpoint {}", self.path.display());
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(CibusError::Checkpoint(format!(
                "Failed to remove {}: {}", self.path.display(), e
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(processed: u64) -> StatsSnapshot {
        StatsSnapshot { processed_foods: processed, translated: 5, failed: 1, skipped: 2 }
    }

    #[tokio::test]
    async fn test_save_load_remove() {
        let dir = tempfile::tempdir().unwrap();
        let file = CheckpointFile::new(dir.path().join("nested").join("progress.json"));

        assert!(file.load().await.is_none());

        let mut checkpoint = Checkpoint::fresh();
        checkpoint.record(&snapshot(200), 12.5);
        file.save(&checkpoint).await.unwrap();

        let loaded = file.load().await.unwrap();
        assert_eq!(loaded, checkpoint);
        assert_eq!(loaded.stats(), snapshot(200));
        assert!(loaded.last_update.is_some());
        assert!(!file.temp_path().exists());

        assert!(file.remove().await.unwrap());
        assert!(!file.remove().await.unwrap());
        assert!(file.load().await.is_none());
    }

    #[tokio::test]
    async fn test_corrupt_file_starts_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("progress.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(CheckpointFile::new(&path).load().await.is_none());
    }

    #[tokio::test]
    async fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("progress.json");
        std::fs::write(&path, r#"{"processed_foods": 300, "translated_count": 850}"#).unwrap();

        let loaded = CheckpointFile::new(&path).load().await.unwrap();
        assert_eq!(loaded.processed_foods, 300);
        assert_eq!(loaded.translated_count, 850);
        assert_eq!(loaded.failed_count, 0);
        assert_eq!(loaded.total_compute_time, 0.0);
        assert!(loaded.session_start_time > 0.0);
    }

    #[test]
    fn test_started_at() {
        let mut checkpoint = Checkpoint::fresh();
        checkpoint.session_start_time = 1_700_000_000.25;
        let started = checkpoint.started_at().unwrap();
        assert_eq!(started.timestamp(), 1_700_000_000);
    }
}
