//! Filesystem Primitives
//!
//! Thin, failure-tolerant wrappers over tokio::fs for cache persistence.
//! Missing paths are a normal outcome here, not an error, and every call
//! carries a timeout so a stalled filesystem cannot hang a cache operation.

use std::fs::Metadata;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

use tokio::fs;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::error::CacheError;

/// Upper bound for a single filesystem call
const OP_TIMEOUT: Duration = Duration::from_secs(30);

/// Failure-tolerant filesystem access for one cache manager
#[derive(Debug, Clone)]
pub struct FileStore {
    verbose: bool,
}

impl FileStore {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// Stat a path
    ///
    /// # Returns
    /// Metadata if the path exists, None if it does not (or cannot be queried)
    pub async fn exists(&self, path: &Path) -> Option<Metadata> {
        match timeout(OP_TIMEOUT, fs::metadata(path)).await {
            Ok(Ok(meta)) => Some(meta),
            Ok(Err(_)) | Err(_) => None,
        }
    }

    /// Read a file to a string
    ///
    /// # Returns
    /// The file content, or NotFound / Io / Timeout on failure
    pub async fn read(&self, path: &Path) -> Result<String, CacheError> {
        match timeout(OP_TIMEOUT, fs::read_to_string(path)).await {
            Ok(Ok(content)) => Ok(content),
            Ok(Err(e)) => Err(CacheError::from_read(path, e)),
            Err(_) => Err(CacheError::Timeout),
        }
    }

    /// Write a file atomically (temp file in the same directory + rename)
    ///
    /// A missing parent directory surfaces as PathMissing so the caller
    /// can resync the namespace.
    pub async fn write(&self, path: &Path, content: &str) -> Result<(), CacheError> {
        let parent = path.parent().unwrap_or_else(|| Path::new("."));

        let mut tmp = tempfile::NamedTempFile::new_in(parent)
            .map_err(|e| CacheError::from_write(path, e))?;
        tmp.write_all(content.as_bytes())
            .map_err(|e| CacheError::from_write(path, e))?;
        tmp.persist(path)
            .map_err(|e| CacheError::from_write(path, e.error))?;

        if self.verbose {
            debug!(path = %path.display(), bytes = content.len(), "Wrote cache file");
        }
        Ok(())
    }

    /// Create a directory and any missing parents; idempotent
    pub async fn mkdir(&self, path: &Path) -> Result<(), CacheError> {
        match timeout(OP_TIMEOUT, fs::create_dir_all(path)).await {
            Ok(Ok(())) => {
                if self.verbose {
                    debug!(path = %path.display(), "Created cache directory");
                }
                Ok(())
            }
            Ok(Err(e)) => Err(CacheError::Io(format!("{}: {}", path.display(), e))),
            Err(_) => Err(CacheError::Timeout),
        }
    }

    /// List entry names in a directory
    ///
    /// # Returns
    /// File names in the directory; empty (logged) on any failure
    pub async fn readdir(&self, path: &Path) -> Vec<String> {
        let mut read_dir = match timeout(OP_TIMEOUT, fs::read_dir(path)).await {
            Ok(Ok(rd)) => rd,
            Ok(Err(e)) => {
                if self.verbose {
                    warn!(path = %path.display(), error = %e, "Cannot read cache directory");
                }
                return Vec::new();
            }
            Err(_) => {
                warn!(path = %path.display(), "Timed out listing cache directory");
                return Vec::new();
            }
        };

        let mut names = Vec::new();
        while let Ok(Some(dirent)) = read_dir.next_entry().await {
            match dirent.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(raw) => {
                    if self.verbose {
                        warn!(path = %path.display(), name = ?raw, "Skipping non-UTF-8 cache file name");
                    }
                }
            }
        }
        names
    }

    /// Remove a file or directory tree
    ///
    /// # Returns
    /// true if something was removed, false otherwise; never errors
    pub async fn remove(&self, path: &Path) -> bool {
        let removed = match timeout(OP_TIMEOUT, fs::remove_file(path)).await {
            Ok(Ok(())) => true,
            Ok(Err(_)) => matches!(
                timeout(OP_TIMEOUT, fs::remove_dir_all(path)).await,
                Ok(Ok(()))
            ),
            Err(_) => false,
        };

        if self.verbose {
            if removed {
                debug!(path = %path.display(), "Removed cache path");
            } else {
                debug!(path = %path.display(), "Nothing to remove");
            }
        }
        removed
    }
}
