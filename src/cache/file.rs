//! Flat-File Cache Backend
//!
//! One file per key inside the namespace directory. Mutations are
//! serialized by a per-namespace lock so the sweep can never delete a write
//! that landed after its scan; reads stay lock-free because writes are
//! atomic renames.

use std::path::PathBuf;

use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::cache::entry;
use crate::config::CacheConfig;
use crate::error::CacheError;
use crate::store::FileStore;

/// Per-key file storage for one namespace
pub(crate) struct FileBackend {
    root_path: PathBuf,
    ns_path: PathBuf,
    ttl_seconds: u64,
    verbose: bool,
    store: FileStore,
    /// Serializes insert/remove/sweep/sync for this namespace
    op_lock: Mutex<()>,
}

impl FileBackend {
    pub(crate) fn new(config: &CacheConfig, store: FileStore) -> Self {
        Self {
            root_path: config.root_path.clone(),
            ns_path: config.namespace_path(),
            ttl_seconds: config.ttl_seconds,
            verbose: config.verbose,
            store,
            op_lock: Mutex::new(()),
        }
    }

    /// Map a key to its file inside the namespace
    ///
    /// Filesystem-hostile characters are flattened so a key can never
    /// escape the namespace directory.
    fn key_path(&self, key: &str) -> PathBuf {
        let safe: String = key
            .chars()
            .map(|c| match c {
                '/' | '\\' | ':' | '\0' => '_',
                c => c,
            })
            .collect();
        self.ns_path.join(safe)
    }

    pub(crate) async fn fetch(&self, key: &str) -> Result<String, CacheError> {
        self.store.read(&self.key_path(key)).await
    }

    /// Write one key's entry
    ///
    /// A vanished namespace directory triggers a resync; the write itself
    /// stays best-effort for this call.
    pub(crate) async fn insert(&self, key: &str, content: String) -> Result<(), CacheError> {
        let _guard = self.op_lock.lock().await;
        match self.store.write(&self.key_path(key), &content).await {
            Err(err) if err.needs_resync() => {
                if self.verbose {
                    warn!(key = %key, error = %err, "Cache write lost its directory, resyncing");
                }
                self.sync_locked().await
            }
            other => other,
        }
    }

    pub(crate) async fn contains(&self, key: &str) -> bool {
        self.store.exists(&self.key_path(key)).await.is_some()
    }

    pub(crate) async fn remove(&self, key: &str) -> bool {
        let _guard = self.op_lock.lock().await;
        self.store.remove(&self.key_path(key)).await
    }

    /// Delete every entry past its TTL horizon
    ///
    /// Each file is judged independently: corrupt entries are deleted (they
    /// can never be served), unreadable ones are left for the next sweep.
    pub(crate) async fn sweep(&self) {
        let _guard = self.op_lock.lock().await;
        let now = entry::now_ms();

        for name in self.store.readdir(&self.ns_path).await {
            let path = self.ns_path.join(&name);
            let verdict = match self.store.read(&path).await {
                Ok(content) => entry::stamp(&content)
                    .map(|stored_at| entry::is_expired(stored_at, self.ttl_seconds, now)),
                Err(err) => Err(err),
            };

            match verdict {
                Ok(true) => {
                    if self.store.remove(&path).await && self.verbose {
                        debug!(key = %name, "Swept expired cache entry");
                    }
                }
                Ok(false) => {}
                Err(CacheError::Parse(detail)) => {
                    warn!(key = %name, error = %detail, "Removing corrupt cache file");
                    self.store.remove(&path).await;
                }
                Err(err) => {
                    if self.verbose {
                        warn!(key = %name, error = %err, "Skipping unreadable cache file");
                    }
                }
            }
        }
    }

    pub(crate) async fn sync(&self) -> Result<(), CacheError> {
        let _guard = self.op_lock.lock().await;
        self.sync_locked().await
    }

    /// Reconciliation body; callers must hold `op_lock`
    async fn sync_locked(&self) -> Result<(), CacheError> {
        self.store.mkdir(&self.root_path).await?;

        match self.store.exists(&self.ns_path).await {
            Some(meta) if meta.is_dir() => Ok(()),
            Some(_) => {
                // memory-mode snapshot occupying the directory slot
                self.store.remove(&self.ns_path).await;
                self.store.mkdir(&self.ns_path).await
            }
            None => self.store.mkdir(&self.ns_path).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn backend_in(dir: &TempDir, ttl_seconds: u64) -> FileBackend {
        let config = CacheConfig::new()
            .with_root_path(dir.path())
            .with_ttl_seconds(ttl_seconds)
            .with_only_file_system(true);
        let backend = FileBackend::new(&config, FileStore::new(false));
        backend.sync().await.expect("initial sync");
        backend
    }

    fn entry_stored_at(stored_at_ms: u64) -> String {
        format!(r#"{{"value":"v","stored_at_ms":{}}}"#, stored_at_ms)
    }

    #[tokio::test]
    async fn test_insert_fetch_contains_remove() {
        let dir = TempDir::new().expect("temp dir");
        let backend = backend_in(&dir, 0).await;
        let content = entry_stored_at(entry::now_ms());

        assert!(!backend.contains("k").await);
        backend.insert("k", content.clone()).await.expect("insert");
        assert!(backend.contains("k").await);
        assert_eq!(backend.fetch("k").await.expect("fetch"), content);

        assert!(backend.remove("k").await);
        assert!(!backend.remove("k").await);
        assert!(!backend.contains("k").await);
    }

    #[tokio::test]
    async fn test_fetch_absent_is_not_found() {
        let dir = TempDir::new().expect("temp dir");
        let backend = backend_in(&dir, 0).await;

        let err = backend.fetch("absent").await.expect_err("must miss");
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_keys_with_separators_stay_inside_the_namespace() {
        let dir = TempDir::new().expect("temp dir");
        let backend = backend_in(&dir, 0).await;
        let content = entry_stored_at(entry::now_ms());

        backend
            .insert("api/v1:users", content.clone())
            .await
            .expect("insert");

        assert!(dir.path().join("default").join("api_v1_users").exists());
        assert_eq!(backend.fetch("api/v1:users").await.expect("fetch"), content);
    }

    #[tokio::test]
    async fn test_sweep_removes_only_expired_files() {
        let dir = TempDir::new().expect("temp dir");
        let backend = backend_in(&dir, 5).await;
        let now = entry::now_ms();

        backend
            .insert("stale", entry_stored_at(now - 10_000))
            .await
            .expect("insert");
        backend
            .insert("fresh", entry_stored_at(now))
            .await
            .expect("insert");
        backend.sweep().await;

        assert!(!backend.contains("stale").await);
        assert!(backend.contains("fresh").await);
    }

    #[tokio::test]
    async fn test_sweep_isolates_corrupt_files() {
        let dir = TempDir::new().expect("temp dir");
        let backend = backend_in(&dir, 5).await;
        let now = entry::now_ms();

        backend
            .insert("stale", entry_stored_at(now - 10_000))
            .await
            .expect("insert");
        backend
            .insert("fresh", entry_stored_at(now))
            .await
            .expect("insert");
        std::fs::write(dir.path().join("default").join("junk"), "{broken")
            .expect("plant corrupt file");

        backend.sweep().await;

        // the corrupt file neither survives nor aborts the rest of the sweep
        assert!(!backend.contains("junk").await);
        assert!(!backend.contains("stale").await);
        assert!(backend.contains("fresh").await);
    }

    #[tokio::test]
    async fn test_sweep_with_zero_ttl_keeps_everything() {
        let dir = TempDir::new().expect("temp dir");
        let backend = backend_in(&dir, 0).await;
        let now = entry::now_ms();

        backend
            .insert("old", entry_stored_at(now - 86_400_000))
            .await
            .expect("insert");
        backend.sweep().await;

        assert!(backend.contains("old").await);
    }

    #[tokio::test]
    async fn test_sync_replaces_snapshot_file_with_directory() {
        let dir = TempDir::new().expect("temp dir");
        let ns_path = dir.path().join("default");
        std::fs::write(&ns_path, "{}").expect("plant snapshot file");

        let backend = backend_in(&dir, 0).await;
        assert!(ns_path.is_dir());

        // idempotent: a second pass leaves the directory in place
        backend.sync().await.expect("second sync");
        assert!(ns_path.is_dir());
    }

    #[tokio::test]
    async fn test_insert_resyncs_when_namespace_vanishes() {
        let dir = TempDir::new().expect("temp dir");
        let backend = backend_in(&dir, 0).await;
        let ns_path = dir.path().join("default");

        std::fs::remove_dir_all(&ns_path).expect("remove namespace out-of-band");

        backend
            .insert("x", entry_stored_at(entry::now_ms()))
            .await
            .expect("insert repairs the namespace");
        assert!(ns_path.is_dir());

        backend
            .insert("x", entry_stored_at(entry::now_ms()))
            .await
            .expect("second insert");
        assert!(backend.contains("x").await);
    }
}
