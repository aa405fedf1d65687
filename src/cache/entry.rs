//! Stamped Entry Encoding
//!
//! Every cached value is wrapped with the timestamp of its write before
//! serialization. The stamp is set once; an overwrite produces a fresh
//! entry with a fresh stamp.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::CacheError;

/// A value paired with its write timestamp
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct Entry<T> {
    /// The cached data
    pub value: T,
    /// Unix milliseconds at write time
    pub stored_at_ms: u64,
}

/// Timestamp-only view of an entry, for expiry checks
///
/// Ignores the value entirely so the sweep never depends on its shape.
#[derive(Debug, Deserialize)]
struct Stamp {
    stored_at_ms: u64,
}

/// Serialize a value into an entry stamped with the current time
pub(crate) fn encode<T: Serialize>(value: &T) -> Result<String, CacheError> {
    let entry = Entry {
        value,
        stored_at_ms: now_ms(),
    };
    Ok(serde_json::to_string(&entry)?)
}

/// Deserialize an entry, returning its value
pub(crate) fn decode<T: DeserializeOwned>(content: &str) -> Result<T, CacheError> {
    let entry: Entry<T> = serde_json::from_str(content)?;
    Ok(entry.value)
}

/// Extract the write timestamp from a serialized entry
pub(crate) fn stamp(content: &str) -> Result<u64, CacheError> {
    let stamp: Stamp = serde_json::from_str(content)?;
    Ok(stamp.stored_at_ms)
}

/// Current wall clock in unix milliseconds
pub(crate) fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Whether an entry written at `stored_at_ms` has outlived its TTL
///
/// A TTL of zero disables expiry.
pub(crate) fn is_expired(stored_at_ms: u64, ttl_seconds: u64, now: u64) -> bool {
    ttl_seconds > 0 && now >= stored_at_ms.saturating_add(ttl_seconds.saturating_mul(1000))
}
