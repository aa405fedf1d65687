//! Cache Manager
//!
//! Owns the configuration, the storage backend, and the expiry watcher.
//! Every public operation converts internal failures into benign results
//! (None / false) so a broken cache degrades to misses instead of taking
//! the caller down with it.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::cache::backend::Backend;
use crate::cache::entry;
use crate::cache::file::FileBackend;
use crate::cache::memory::MemoryBackend;
use crate::cache::watcher::ExpiryWatcher;
use crate::config::CacheConfig;
use crate::error::CacheError;
use crate::store::FileStore;

/// TTL cache over an in-memory map or a per-key file tree
///
/// The backend is chosen once from [`CacheConfig::only_file_system`] and
/// fixed for the manager's lifetime. A background watcher runs the expiry
/// sweep every check period until [`stop`](CacheManager::stop) or drop.
pub struct CacheManager {
    config: CacheConfig,
    backend: Arc<Backend>,
    watcher: ExpiryWatcher,
}

impl CacheManager {
    /// Build a manager, reconcile its namespace, and start the sweep timer
    ///
    /// Construction never fails: reconciliation problems are logged and the
    /// cache starts cold.
    pub async fn new(config: CacheConfig) -> Self {
        let store = FileStore::new(config.verbose);

        let backend = if config.only_file_system {
            Backend::File(FileBackend::new(&config, store))
        } else {
            Backend::Memory(MemoryBackend::new(&config, store))
        };
        let backend = Arc::new(backend);

        if let Err(err) = backend.sync().await {
            warn!(namespace = %config.namespace, error = %err, "Initial cache sync failed");
        }

        let sweep_target = Arc::clone(&backend);
        let watcher = ExpiryWatcher::spawn(config.check_period(), move || {
            let backend = Arc::clone(&sweep_target);
            async move { backend.sweep().await }
        });

        debug!(
            namespace = %config.namespace,
            file_mode = config.only_file_system,
            ttl_seconds = config.ttl_seconds,
            "Cache manager ready"
        );

        Self {
            config,
            backend,
            watcher,
        }
    }

    /// Look up a key
    ///
    /// # Returns
    /// The stored value, or None if the key is absent, expired-and-swept,
    /// or its entry cannot be read or parsed
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.lookup(key).await {
            Ok(value) => Some(value),
            Err(err) => {
                if self.config.verbose {
                    warn!(key = %key, error = %err, "Cannot get cached value");
                }
                None
            }
        }
    }

    /// Typed lookup keeping absent and corrupt distinguishable
    async fn lookup<T: DeserializeOwned>(&self, key: &str) -> Result<T, CacheError> {
        let content = self.backend.fetch(key).await?;
        entry::decode(&content)
    }

    /// Store a value under a key, stamped with the current time
    ///
    /// Overwrites any previous entry. In file-mode a write whose namespace
    /// directory vanished triggers a resync; the value lands on the next set.
    pub async fn set<T: Serialize>(&self, key: &str, value: &T) {
        let content = match entry::encode(value) {
            Ok(content) => content,
            Err(err) => {
                warn!(key = %key, error = %err, "Cannot serialize value for cache");
                return;
            }
        };

        if let Err(err) = self.backend.insert(key, content).await {
            if self.config.verbose {
                warn!(key = %key, error = %err, "Cannot write cache entry");
            }
        }
    }

    /// Whether a key currently exists (expired-but-unswept entries count)
    pub async fn has(&self, key: &str) -> bool {
        self.backend.contains(key).await
    }

    /// Remove a key
    ///
    /// # Returns
    /// true if an entry was removed
    pub async fn delete(&self, key: &str) -> bool {
        self.backend.remove(key).await
    }

    /// Run the expiry sweep now, independent of the watcher
    pub async fn check(&self) {
        self.backend.sweep().await;
    }

    /// Reconcile the namespace path with the active backend
    pub async fn sync(&self) {
        if let Err(err) = self.backend.sync().await {
            warn!(namespace = %self.config.namespace, error = %err, "Cache sync failed");
        }
    }

    /// Persist the whole in-memory map as one snapshot file
    ///
    /// No-op in file-mode. Never invoked automatically; unsaved writes are
    /// lost when the process dies.
    pub async fn save(&self) {
        if let Err(err) = self.backend.save().await {
            warn!(namespace = %self.config.namespace, error = %err, "Cannot save cache snapshot");
        }
    }

    /// Stop the expiry watcher and release the manager
    pub async fn stop(mut self) {
        self.watcher.stop().await;
    }
}
