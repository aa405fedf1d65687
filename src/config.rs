//! Cache Configuration
//!
//! Per-field defaults applied at construction time; immutable afterwards.

use std::path::PathBuf;
use std::time::Duration;

/// Namespace used when none is given
pub const DEFAULT_NAMESPACE: &str = "default";

/// Sweep interval used when none is given, in seconds
pub const DEFAULT_CHECK_PERIOD_SECS: u64 = 600;

/// Configuration for a [`CacheManager`](crate::CacheManager)
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Logical sub-store name; maps to one directory or one snapshot file
    pub namespace: String,
    /// Expiry horizon in seconds; 0 disables expiry
    pub ttl_seconds: u64,
    /// Sweep interval in seconds; 0 falls back to the default
    pub check_period_seconds: u64,
    /// Base directory for persistence
    pub root_path: PathBuf,
    /// true: one file per key on disk; false: in-memory map with optional snapshot
    pub only_file_system: bool,
    /// Enable per-operation diagnostic logging
    pub verbose: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            ttl_seconds: 0,
            check_period_seconds: DEFAULT_CHECK_PERIOD_SECS,
            root_path: default_root(),
            only_file_system: false,
            verbose: false,
        }
    }
}

impl CacheConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the namespace; an empty name keeps the default
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        let namespace = namespace.into();
        if !namespace.is_empty() {
            self.namespace = namespace;
        }
        self
    }

    pub fn with_ttl_seconds(mut self, ttl_seconds: u64) -> Self {
        self.ttl_seconds = ttl_seconds;
        self
    }

    pub fn with_check_period_seconds(mut self, check_period_seconds: u64) -> Self {
        self.check_period_seconds = check_period_seconds;
        self
    }

    pub fn with_root_path(mut self, root_path: impl Into<PathBuf>) -> Self {
        self.root_path = root_path.into();
        self
    }

    pub fn with_only_file_system(mut self, only_file_system: bool) -> Self {
        self.only_file_system = only_file_system;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Path of this configuration's namespace under the root
    pub fn namespace_path(&self) -> PathBuf {
        self.root_path.join(&self.namespace)
    }

    /// Effective sweep interval; a zero period falls back to the default
    pub fn check_period(&self) -> Duration {
        let secs = if self.check_period_seconds == 0 {
            DEFAULT_CHECK_PERIOD_SECS
        } else {
            self.check_period_seconds
        };
        Duration::from_secs(secs)
    }
}

/// Platform cache directory with a /tmp fallback
fn default_root() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join("stash")
}
