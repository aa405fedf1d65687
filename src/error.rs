//! Cache Error Types
//!
//! Structured error handling for cache operations. The kinds drive control
//! flow: a missing key is a normal negative result, a missing parent
//! directory triggers a namespace resync, and corrupt content gets deleted
//! instead of served.

use std::io::ErrorKind;
use std::path::Path;

/// Cache operation error kinds
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("I/O failure: {0}")]
    Io(String),

    #[error("Corrupt cache content: {0}")]
    Parse(String),

    #[error("Cache path missing: {0}")]
    PathMissing(String),

    #[error("Filesystem operation timed out")]
    Timeout,
}

impl CacheError {
    /// Whether this is the benign "key absent" case
    pub fn is_not_found(&self) -> bool {
        matches!(self, CacheError::NotFound(_))
    }

    /// Whether this error means the namespace directory vanished and a
    /// resync should repair it
    pub fn needs_resync(&self) -> bool {
        matches!(self, CacheError::PathMissing(_))
    }

    /// Classify an I/O error from a read-side operation
    pub(crate) fn from_read(path: &Path, err: std::io::Error) -> Self {
        match err.kind() {
            ErrorKind::NotFound => CacheError::NotFound(path.display().to_string()),
            _ => CacheError::Io(format!("{}: {}", path.display(), err)),
        }
    }

    /// Classify an I/O error from a write-side operation
    ///
    /// A NotFound during a write means the target's parent directory is
    /// gone, which callers repair with a resync.
    pub(crate) fn from_write(path: &Path, err: std::io::Error) -> Self {
        match err.kind() {
            ErrorKind::NotFound => CacheError::PathMissing(path.display().to_string()),
            _ => CacheError::Io(format!("{}: {}", path.display(), err)),
        }
    }
}

impl From<serde_json::Error> for CacheError {
    fn from(err: serde_json::Error) -> Self {
        CacheError::Parse(err.to_string())
    }
}
