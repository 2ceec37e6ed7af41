//! The keyed ephemeral store

use crate::clock::{Clock, SystemClock};
use crate::error::{Result, StoreError};
use crate::types::{ArtifactRecord, StoreStats};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Default retention window for stored artifacts (1 hour).
pub const DEFAULT_TTL_SECS: u64 = 60 * 60;

/// Keyed ephemeral store: maps a key to a materialized artifact on disk
/// and forgets the mapping once the artifact outlives its TTL.
///
/// The entry map is the sole synchronization boundary. No lock is held
/// across network I/O; fetching and archiving happen entirely outside the
/// store. Backing files are owned exclusively by their records: record and
/// file are removed together, with file deletion on a best-effort basis.
pub struct ArtifactStore {
    entries: Arc<RwLock<HashMap<String, ArtifactRecord>>>,
    ttl_secs: u64,
    clock: Arc<dyn Clock>,
    hits: Arc<AtomicU64>,
    misses: Arc<AtomicU64>,
    evicted: Arc<AtomicU64>,
}

impl ArtifactStore {
    /// Create a store with the given TTL, reading wall-clock time.
    pub fn new(ttl_secs: u64) -> Self {
        Self::with_clock(ttl_secs, Arc::new(SystemClock))
    }

    /// Create a store with an injected time source.
    pub fn with_clock(ttl_secs: u64, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            ttl_secs,
            clock,
            hits: Arc::new(AtomicU64::new(0)),
            misses: Arc::new(AtomicU64::new(0)),
            evicted: Arc::new(AtomicU64::new(0)),
        }
    }

    fn expired(&self, record: &ArtifactRecord) -> bool {
        let age_secs = (self.clock.now() - record.created_at).num_seconds();
        age_secs > self.ttl_secs as i64
    }

    /// Register a materialized artifact under `key`, replacing any
    /// existing record. The superseded record's backing file is deleted
    /// unless the new record reuses the same path.
    ///
    /// The file at `path` must already be fully written; `put` verifies it
    /// is a readable regular file before the record becomes visible, so a
    /// crash mid-pipeline leaves "record absent, file orphaned", never a
    /// record without its file.
    pub async fn put(
        &self,
        key: &str,
        path: PathBuf,
        display_name: &str,
    ) -> Result<ArtifactRecord> {
        let meta = fs::metadata(&path).await?;
        if !meta.is_file() {
            return Err(StoreError::StorageWrite(Box::new(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("not a regular file: {}", path.display()),
            ))));
        }

        let record = ArtifactRecord {
            key: key.to_string(),
            path,
            display_name: display_name.to_string(),
            created_at: self.clock.now(),
        };

        let replaced = {
            let mut entries = self.entries.write().await;
            entries.insert(key.to_string(), record.clone())
        };

        if let Some(old) = replaced {
            if old.path != record.path {
                if let Err(e) = fs::remove_file(&old.path).await {
                    warn!(key = %key, path = ?old.path, error = %e, "Failed to delete superseded artifact file");
                }
            }
        }

        debug!(key = %key, path = ?record.path, "Stored artifact");
        Ok(record)
    }

    /// Look up `key`, treating entries past the TTL as absent. An expired
    /// entry encountered here is evicted on the spot, backing file
    /// included. Never fails outward.
    pub async fn try_get(&self, key: &str) -> Option<ArtifactRecord> {
        let record = {
            let entries = self.entries.read().await;
            entries.get(key).cloned()
        };

        if let Some(record) = record {
            if self.expired(&record) {
                debug!(key = %key, ttl_secs = self.ttl_secs, "Store entry expired");
                if self.remove_record(&record).await {
                    self.evicted.fetch_add(1, Ordering::Relaxed);
                }
                self.misses.fetch_add(1, Ordering::Relaxed);
                return None;
            }
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Some(record);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    /// Look up `key` and open its backing file for serving.
    ///
    /// `Ok(None)` means absent or expired, indistinguishable by design. A
    /// record whose file has been deleted out from under it yields
    /// [`StoreError::Vanished`] and the dangling record is dropped.
    pub async fn open(&self, key: &str) -> Result<Option<(ArtifactRecord, fs::File)>> {
        let Some(record) = self.try_get(key).await else {
            return Ok(None);
        };

        match fs::File::open(&record.path).await {
            Ok(file) => Ok(Some((record, file))),
            Err(e) => {
                warn!(key = %key, path = ?record.path, error = %e, "Artifact backing file unreadable, dropping record");
                self.remove_record(&record).await;
                Err(StoreError::Vanished(key.to_string()))
            }
        }
    }

    /// Evict every entry older than the TTL. File deletion failures are
    /// swallowed and the map removal proceeds regardless; the pass never
    /// fails outward. Returns the number of entries removed.
    pub async fn sweep(&self) -> usize {
        let stale: Vec<ArtifactRecord> = {
            let entries = self.entries.read().await;
            entries
                .values()
                .filter(|record| self.expired(record))
                .cloned()
                .collect()
        };

        let mut removed = 0;
        for record in &stale {
            if self.remove_record(record).await {
                self.evicted.fetch_add(1, Ordering::Relaxed);
                removed += 1;
            }
        }

        if removed > 0 {
            debug!(removed, "Swept expired artifacts");
        }
        removed
    }

    /// Remove `record`'s map entry and attempt to delete its backing
    /// file. A no-op when a newer record has already replaced it under
    /// the same key, so a sweep racing a fresh `put` never deletes the
    /// replacement. Returns whether the entry was removed.
    async fn remove_record(&self, record: &ArtifactRecord) -> bool {
        let removed = {
            let mut entries = self.entries.write().await;
            match entries.get(&record.key) {
                Some(current)
                    if current.created_at == record.created_at
                        && current.path == record.path =>
                {
                    entries.remove(&record.key)
                }
                _ => None,
            }
        };

        match removed {
            Some(entry) => {
                if let Err(e) = fs::remove_file(&entry.path).await {
                    debug!(key = %entry.key, path = ?entry.path, error = %e, "Artifact file already gone or undeletable");
                }
                true
            }
            None => false,
        }
    }

    /// Current store statistics.
    pub async fn stats(&self) -> StoreStats {
        let entries = self.entries.read().await;
        StoreStats {
            entries: entries.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evicted: self.evicted.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, Utc};
    use std::path::Path;
    use std::sync::Mutex;
    use tempfile::tempdir;

    struct ManualClock {
        now: Mutex<DateTime<Utc>>,
    }

    impl ManualClock {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                now: Mutex::new(Utc::now()),
            })
        }

        fn advance_secs(&self, secs: i64) {
            let mut now = self.now.lock().unwrap();
            *now += Duration::seconds(secs);
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            *self.now.lock().unwrap()
        }
    }

    async fn write_artifact(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, b"artifact bytes").await.unwrap();
        path
    }

    #[tokio::test]
    async fn test_try_get_on_empty_store() {
        let store = ArtifactStore::new(DEFAULT_TTL_SECS);
        assert!(store.try_get("anything.zip").await.is_none());

        let stats = store.stats().await;
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 0);
    }

    #[tokio::test]
    async fn test_put_then_try_get() {
        let dir = tempdir().unwrap();
        let store = ArtifactStore::new(DEFAULT_TTL_SECS);
        let path = write_artifact(dir.path(), "a.zip").await;

        store.put("a.zip", path.clone(), "a.zip").await.unwrap();

        let record = store.try_get("a.zip").await.expect("fresh entry");
        assert_eq!(record.path, path);
        assert_eq!(record.display_name, "a.zip");

        let stats = store.stats().await;
        assert_eq!(stats.entries, 1);
        assert_eq!(stats.hits, 1);
    }

    #[tokio::test]
    async fn test_put_rejects_missing_file() {
        let dir = tempdir().unwrap();
        let store = ArtifactStore::new(DEFAULT_TTL_SECS);

        let result = store
            .put("a.zip", dir.path().join("never-written.zip"), "a.zip")
            .await;
        assert!(matches!(result, Err(StoreError::StorageWrite(_))));
        assert!(store.try_get("a.zip").await.is_none());
    }

    #[tokio::test]
    async fn test_put_overwrite_deletes_superseded_file() {
        let dir = tempdir().unwrap();
        let store = ArtifactStore::new(DEFAULT_TTL_SECS);
        let first = write_artifact(dir.path(), "first.zip").await;
        let second = write_artifact(dir.path(), "second.zip").await;

        store.put("a.zip", first.clone(), "a.zip").await.unwrap();
        store.put("a.zip", second.clone(), "a.zip").await.unwrap();

        let record = store.try_get("a.zip").await.unwrap();
        assert_eq!(record.path, second);

        // The superseded backing file is gone, the new one remains.
        assert!(!first.exists());
        assert!(second.exists());
    }

    #[tokio::test]
    async fn test_put_overwrite_same_path_keeps_file() {
        let dir = tempdir().unwrap();
        let store = ArtifactStore::new(DEFAULT_TTL_SECS);
        let path = write_artifact(dir.path(), "a.zip").await;

        store.put("a.zip", path.clone(), "a.zip").await.unwrap();
        store.put("a.zip", path.clone(), "renamed.zip").await.unwrap();

        let record = store.try_get("a.zip").await.unwrap();
        assert_eq!(record.display_name, "renamed.zip");
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_expiry_without_explicit_sweep() {
        let dir = tempdir().unwrap();
        let clock = ManualClock::new();
        let store = ArtifactStore::with_clock(DEFAULT_TTL_SECS, clock.clone());
        let path = write_artifact(dir.path(), "a.zip").await;

        store.put("a.zip", path.clone(), "a.zip").await.unwrap();

        clock.advance_secs(DEFAULT_TTL_SECS as i64 + 1);
        assert!(store.try_get("a.zip").await.is_none());

        // Lazy eviction removed the backing file along with the entry.
        assert!(!path.exists());
        let stats = store.stats().await;
        assert_eq!(stats.entries, 0);
        assert_eq!(stats.evicted, 1);
    }

    #[tokio::test]
    async fn test_sweep_removes_only_expired() {
        let dir = tempdir().unwrap();
        let clock = ManualClock::new();
        let store = ArtifactStore::with_clock(DEFAULT_TTL_SECS, clock.clone());

        let old = write_artifact(dir.path(), "old.zip").await;
        store.put("old.zip", old.clone(), "old.zip").await.unwrap();

        clock.advance_secs(DEFAULT_TTL_SECS as i64 + 1);

        let fresh = write_artifact(dir.path(), "fresh.zip").await;
        store.put("fresh.zip", fresh.clone(), "fresh.zip").await.unwrap();

        assert_eq!(store.sweep().await, 1);

        assert!(store.try_get("old.zip").await.is_none());
        assert!(store.try_get("fresh.zip").await.is_some());
        assert!(!old.exists());
        assert!(fresh.exists());
    }

    #[tokio::test]
    async fn test_sweep_tolerates_already_deleted_file() {
        let dir = tempdir().unwrap();
        let clock = ManualClock::new();
        let store = ArtifactStore::with_clock(DEFAULT_TTL_SECS, clock.clone());
        let path = write_artifact(dir.path(), "a.zip").await;

        store.put("a.zip", path.clone(), "a.zip").await.unwrap();
        fs::remove_file(&path).await.unwrap();

        clock.advance_secs(DEFAULT_TTL_SECS as i64 + 1);

        // The file is already gone; the map entry must still be dropped.
        assert_eq!(store.sweep().await, 1);
        assert_eq!(store.stats().await.entries, 0);
    }

    #[tokio::test]
    async fn test_one_hour_retention_scenario() {
        let dir = tempdir().unwrap();
        let clock = ManualClock::new();
        let store = ArtifactStore::with_clock(DEFAULT_TTL_SECS, clock.clone());
        let path = write_artifact(dir.path(), "a.zip").await;

        store.put("a.zip", path.clone(), "a.zip").await.unwrap();

        clock.advance_secs(30 * 60);
        assert!(store.try_get("a.zip").await.is_some());

        clock.advance_secs(31 * 60);
        assert!(store.try_get("a.zip").await.is_none());

        // The 61-minute sweep finds nothing left to do: lazy eviction
        // already dropped entry and file together.
        assert_eq!(store.sweep().await, 0);
        assert_eq!(store.stats().await.entries, 0);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_open_serves_fresh_entry() {
        let dir = tempdir().unwrap();
        let store = ArtifactStore::new(DEFAULT_TTL_SECS);
        let path = write_artifact(dir.path(), "a.zip").await;

        store.put("a.zip", path, "a.zip").await.unwrap();

        let (record, _file) = store.open("a.zip").await.unwrap().expect("open hit");
        assert_eq!(record.display_name, "a.zip");
    }

    #[tokio::test]
    async fn test_open_missing_key_is_none() {
        let store = ArtifactStore::new(DEFAULT_TTL_SECS);
        assert!(store.open("nope.zip").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_open_vanished_backing_file() {
        let dir = tempdir().unwrap();
        let store = ArtifactStore::new(DEFAULT_TTL_SECS);
        let path = write_artifact(dir.path(), "a.zip").await;

        store.put("a.zip", path.clone(), "a.zip").await.unwrap();
        fs::remove_file(&path).await.unwrap();

        let result = store.open("a.zip").await;
        assert!(matches!(result, Err(StoreError::Vanished(_))));

        // The dangling record was dropped; the key now reads as absent.
        assert!(store.open("a.zip").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_stats_counters() {
        let dir = tempdir().unwrap();
        let store = ArtifactStore::new(DEFAULT_TTL_SECS);

        store.try_get("a.zip").await;
        let path = write_artifact(dir.path(), "a.zip").await;
        store.put("a.zip", path, "a.zip").await.unwrap();
        store.try_get("a.zip").await;

        let stats = store.stats().await;
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.entries, 1);
    }
}
