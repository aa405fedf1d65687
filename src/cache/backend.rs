//! Backend Dispatch
//!
//! The storage shape is fixed once at construction; every cache operation
//! funnels through this enum so each variant owns its own invariants
//! instead of the manager branching on mode in every method.

use crate::cache::file::FileBackend;
use crate::cache::memory::MemoryBackend;
use crate::error::CacheError;

pub(crate) enum Backend {
    Memory(MemoryBackend),
    File(FileBackend),
}

impl Backend {
    pub(crate) async fn fetch(&self, key: &str) -> Result<String, CacheError> {
        match self {
            Backend::Memory(backend) => backend.fetch(key).await,
            Backend::File(backend) => backend.fetch(key).await,
        }
    }

    pub(crate) async fn insert(&self, key: &str, content: String) -> Result<(), CacheError> {
        match self {
            Backend::Memory(backend) => {
                backend.insert(key, content).await;
                Ok(())
            }
            Backend::File(backend) => backend.insert(key, content).await,
        }
    }

    pub(crate) async fn contains(&self, key: &str) -> bool {
        match self {
            Backend::Memory(backend) => backend.contains(key).await,
            Backend::File(backend) => backend.contains(key).await,
        }
    }

    pub(crate) async fn remove(&self, key: &str) -> bool {
        match self {
            Backend::Memory(backend) => backend.remove(key).await,
            Backend::File(backend) => backend.remove(key).await,
        }
    }

    pub(crate) async fn sweep(&self) {
        match self {
            Backend::Memory(backend) => backend.sweep().await,
            Backend::File(backend) => backend.sweep().await,
        }
    }

    pub(crate) async fn sync(&self) -> Result<(), CacheError> {
        match self {
            Backend::Memory(backend) => backend.sync().await,
            Backend::File(backend) => backend.sync().await,
        }
    }

    pub(crate) async fn save(&self) -> Result<(), CacheError> {
        match self {
            Backend::Memory(backend) => backend.save().await,
            // per-key files are already durable
            Backend::File(_) => Ok(()),
        }
    }
}
