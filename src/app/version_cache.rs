// File version cache - Per-file derivation chain with per-file writer locks

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use chrono::Utc;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::{debug, warn};

use crate::app::sidecar;
use crate::domain::errors::*;
use crate::domain::model::*;

/// Process-wide map from file id to its latest derived version
///
/// Readers never block on a running transform: records are swapped in
/// whole under a short lock. Writers for one file id serialize on the
/// guard returned by [`FileVersionCache::lock_file`].
#[derive(Default)]
pub struct FileVersionCache {
    records: RwLock<HashMap<String, FileVersionRecord>>,
    locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
    snapshot: Option<PathBuf>,
    snapshot_lock: Mutex<()>,
}

impl FileVersionCache {
    /// In-memory cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache mirrored to a JSON snapshot so later runs see earlier artifacts
    pub fn with_snapshot(path: impl Into<PathBuf>) -> Result<Self, DomainError> {
        let path = path.into();
        let records: HashMap<String, FileVersionRecord> = if path.exists() {
            sidecar::read_json(&path)?
        } else {
            HashMap::new()
        };
        debug!("Loaded {} file versions from {}", records.len(), path.display());

        Ok(Self {
            records: RwLock::new(records),
            locks: Mutex::new(HashMap::new()),
            snapshot: Some(path),
            snapshot_lock: Mutex::new(()),
        })
    }

    /// Exclusive right to run steps for `file_id`
    ///
    /// Locks nobody holds or waits on are dropped here, so the map only
    /// tracks files with a step in flight.
    pub async fn lock_file(&self, file_id: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            Arc::clone(locks.entry(file_id.to_string()).or_default())
        };
        lock.lock_owned().await
    }

    /// Number of per-file locks currently tracked
    pub fn lock_count(&self) -> usize {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn get_latest(&self, file_id: &str) -> Option<FileVersionRecord> {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(file_id)
            .cloned()
    }

    /// Append `step` to the chain and make `output_path` the latest artifact
    ///
    /// A missing `segments_path` keeps the previously recorded sidecar.
    /// When the snapshot cannot be written the previous record is restored
    /// and the error returned.
    pub fn record_step(
        &self,
        file_id: &str,
        step: ToolKind,
        output_path: &Path,
        segments_path: Option<&Path>,
    ) -> Result<FileVersionRecord, DomainError> {
        let _writing = self.snapshot_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let (record, previous) = {
            let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
            let previous = records.get(file_id).cloned();
            let prior = previous.as_ref();

            let mut applied_steps = prior.map(|r| r.applied_steps.clone()).unwrap_or_default();
            applied_steps.push(step);

            let record = FileVersionRecord {
                source_file_id: file_id.to_string(),
                latest_artifact_path: output_path.to_path_buf(),
                derived_segments_path: segments_path
                    .map(Path::to_path_buf)
                    .or_else(|| prior.and_then(|r| r.derived_segments_path.clone())),
                applied_steps,
                updated_at: Utc::now(),
            };
            records.insert(file_id.to_string(), record.clone());
            (record, previous)
        };

        if let Err(e) = self.save_snapshot() {
            warn!("Failed to save version snapshot for {}: {}", file_id, e);
            let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
            match previous {
                Some(previous) => records.insert(file_id.to_string(), previous),
                None => records.remove(file_id),
            };
            return Err(e);
        }
        Ok(record)
    }

    /// Ids with at least one recorded version
    pub fn file_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        ids.sort();
        ids
    }

    /// Caller holds `snapshot_lock`
    fn save_snapshot(&self) -> Result<(), DomainError> {
        let Some(path) = &self.snapshot else {
            return Ok(());
        };
        let records = self
            .records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        sidecar::write_json_atomic(path, &records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_record_then_get_latest() {
        let cache = FileVersionCache::new();
        assert!(cache.get_latest("f1").is_none());

        cache
            .record_step("f1", ToolKind::RemoveDuplicates, Path::new("a.mp4"), Some(Path::new("s.json")))
            .unwrap();
        let record = cache
            .record_step("f1", ToolKind::AddCaptions, Path::new("b.mp4"), None)
            .unwrap();

        assert_eq!(record.applied_steps.last(), Some(&ToolKind::AddCaptions));
        let latest = cache.get_latest("f1").unwrap();
        assert_eq!(latest.latest_artifact_path, PathBuf::from("b.mp4"));
        assert_eq!(latest.derived_segments_path, Some(PathBuf::from("s.json")));
        assert_eq!(
            latest.applied_steps,
            vec![ToolKind::RemoveDuplicates, ToolKind::AddCaptions]
        );
        assert!(cache.get_latest("f2").is_none());
    }

    #[test]
    fn test_snapshot_survives_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("versions.json");

        let cache = FileVersionCache::with_snapshot(&path).unwrap();
        cache
            .record_step("f1", ToolKind::AddMusic, Path::new("m.mp4"), None)
            .unwrap();
        drop(cache);

        let reloaded = FileVersionCache::with_snapshot(&path).unwrap();
        let record = reloaded.get_latest("f1").unwrap();
        assert!(record.has_applied(ToolKind::AddMusic));
        assert_eq!(reloaded.file_ids(), vec!["f1".to_string()]);
    }

    #[tokio::test]
    async fn test_lock_file_serializes_same_id() {
        let cache = Arc::new(FileVersionCache::new());
        let guard = cache.lock_file("f1").await;

        let other = Arc::clone(&cache);
        let waiter = tokio::spawn(async move {
            let _guard = other.lock_file("f1").await;
        });

        // A different file id is not blocked
        let _unrelated = tokio::time::timeout(Duration::from_millis(200), cache.lock_file("f2"))
            .await
            .expect("other file ids must not wait");

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!waiter.is_finished());
        drop(guard);
        waiter.await.unwrap();
    }

    #[test]
    fn test_failed_snapshot_keeps_previous_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("processed").join("versions.json");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();

        let cache = FileVersionCache::with_snapshot(&path).unwrap();
        cache
            .record_step("f1", ToolKind::RemoveDuplicates, Path::new("a.mp4"), None)
            .unwrap();

        // A file where the directory should be makes every write fail
        std::fs::remove_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path.parent().unwrap(), b"not a directory").unwrap();

        assert!(cache
            .record_step("f1", ToolKind::AddCaptions, Path::new("b.mp4"), None)
            .is_err());
        assert!(cache
            .record_step("f2", ToolKind::AddMusic, Path::new("m.mp4"), None)
            .is_err());

        let latest = cache.get_latest("f1").unwrap();
        assert_eq!(latest.latest_artifact_path, PathBuf::from("a.mp4"));
        assert_eq!(latest.applied_steps, vec![ToolKind::RemoveDuplicates]);
        assert!(cache.get_latest("f2").is_none());
    }

    #[tokio::test]
    async fn test_idle_locks_are_pruned() {
        let cache = FileVersionCache::new();
        drop(cache.lock_file("f1").await);
        drop(cache.lock_file("f2").await);

        let held = cache.lock_file("f3").await;
        assert_eq!(cache.lock_count(), 1);

        let _other = cache.lock_file("f4").await;
        assert_eq!(cache.lock_count(), 2);
        drop(held);
    }
}
