//! In-Memory Cache Backend
//!
//! Keeps serialized entries in a map guarded by an async RwLock. The map is
//! the source of truth; the namespace path only carries the snapshot written
//! by `save` and is reconciled back into the map at startup.

use std::collections::HashMap;
use std::path::PathBuf;

use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::cache::entry;
use crate::config::CacheConfig;
use crate::error::CacheError;
use crate::store::FileStore;

/// Map-backed storage for one namespace
pub(crate) struct MemoryBackend {
    /// Key to serialized entry
    entries: RwLock<HashMap<String, String>>,
    root_path: PathBuf,
    ns_path: PathBuf,
    ttl_seconds: u64,
    verbose: bool,
    store: FileStore,
}

impl MemoryBackend {
    pub(crate) fn new(config: &CacheConfig, store: FileStore) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            root_path: config.root_path.clone(),
            ns_path: config.namespace_path(),
            ttl_seconds: config.ttl_seconds,
            verbose: config.verbose,
            store,
        }
    }

    pub(crate) async fn fetch(&self, key: &str) -> Result<String, CacheError> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .cloned()
            .ok_or_else(|| CacheError::NotFound(key.to_string()))
    }

    pub(crate) async fn insert(&self, key: &str, content: String) {
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), content);
    }

    pub(crate) async fn contains(&self, key: &str) -> bool {
        let entries = self.entries.read().await;
        entries.contains_key(key)
    }

    pub(crate) async fn remove(&self, key: &str) -> bool {
        let mut entries = self.entries.write().await;
        entries.remove(key).is_some()
    }

    /// Delete every entry past its TTL horizon
    ///
    /// Runs entirely under the write guard so a concurrent insert cannot
    /// slip between the scan and the removals. Entries that no longer parse
    /// (a hand-edited snapshot can inject anything) are dropped with the
    /// expired ones.
    pub(crate) async fn sweep(&self) {
        let now = entry::now_ms();
        let mut entries = self.entries.write().await;

        let expired: Vec<String> = entries
            .iter()
            .filter(|(key, content)| match entry::stamp(content) {
                Ok(stored_at) => entry::is_expired(stored_at, self.ttl_seconds, now),
                Err(err) => {
                    warn!(key = %key, error = %err, "Dropping unparseable cache entry");
                    true
                }
            })
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            entries.remove(key);
        }

        if self.verbose && !expired.is_empty() {
            debug!(count = expired.len(), "Swept expired cache entries");
        }
    }

    /// Reconcile the namespace path with the map
    ///
    /// A plain file there is a snapshot from an earlier run and is loaded
    /// into the map; a directory is a file-mode leftover and is deleted
    /// wholesale. A snapshot that cannot be read or parsed is removed so
    /// the next start is clean.
    pub(crate) async fn sync(&self) -> Result<(), CacheError> {
        let mut entries = self.entries.write().await;

        self.store.mkdir(&self.root_path).await?;

        match self.store.exists(&self.ns_path).await {
            Some(meta) if meta.is_dir() => {
                // per-key files from a file-mode run; this backend never reads them
                self.store.remove(&self.ns_path).await;
            }
            Some(_) => match self.load_snapshot().await {
                Ok(snapshot) => {
                    let count = snapshot.len();
                    entries.extend(snapshot);
                    if self.verbose {
                        debug!(count = count, path = %self.ns_path.display(), "Loaded cache snapshot");
                    }
                }
                Err(err) => {
                    self.store.remove(&self.ns_path).await;
                    warn!(
                        path = %self.ns_path.display(),
                        error = %err,
                        "Removed unreadable cache snapshot"
                    );
                }
            },
            None => {}
        }
        Ok(())
    }

    async fn load_snapshot(&self) -> Result<HashMap<String, String>, CacheError> {
        let data = self.store.read(&self.ns_path).await?;
        Ok(serde_json::from_str(&data)?)
    }

    /// Serialize the whole map into the namespace snapshot file
    pub(crate) async fn save(&self) -> Result<(), CacheError> {
        let snapshot = {
            let entries = self.entries.read().await;
            serde_json::to_string(&*entries)?
        };
        self.store.write(&self.ns_path, &snapshot).await
    }
}
