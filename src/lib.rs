//! stash - Lightweight key/value cache with TTL expiration
//!
//! Caches serializable values either in an in-process map (with an optional
//! single-file snapshot) or as one flat file per key, and sweeps expired
//! entries on a background timer. Built for embedding in application code
//! that wants a drop-in cache without a separate server.
//!
//! # Example
//!
//! ```rust,no_run
//! use stash::{CacheConfig, CacheManager};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = CacheConfig::new()
//!         .with_namespace("weather")
//!         .with_ttl_seconds(300)
//!         .with_check_period_seconds(60);
//!     let cache = CacheManager::new(config).await;
//!
//!     cache.set("forecast:yvr", &"rain".to_string()).await;
//!     if let Some(forecast) = cache.get::<String>("forecast:yvr").await {
//!         println!("cached: {forecast}");
//!     }
//!
//!     cache.stop().await;
//! }
//! ```

mod cache;
mod config;
mod error;
mod store;

pub use cache::CacheManager;
pub use config::{CacheConfig, DEFAULT_CHECK_PERIOD_SECS, DEFAULT_NAMESPACE};
pub use error::CacheError;
pub use store::FileStore;
