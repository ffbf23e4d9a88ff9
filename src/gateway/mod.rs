//! Gateway Module
//!
//! The cache router: classifies intercepted requests into partitions,
//! serves cache-or-network per policy, and runs the install/activate
//! lifecycle at startup.

mod lifecycle;
mod router;

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::cache::{CacheStats, CacheStorage};
use crate::config::Config;
use crate::net::NetworkFetcher;

// == Cache Router ==
/// Routes every intercepted request through the partitioned caches.
///
/// Holds the storage and network capabilities it is written against, so
/// tests can drive it with in-memory fakes.
pub struct CacheRouter {
    storage: Arc<dyn CacheStorage>,
    fetcher: Arc<dyn NetworkFetcher>,
    stats: Arc<RwLock<CacheStats>>,
    config: Arc<Config>,
}

impl CacheRouter {
    /// Creates a router over the given capabilities.
    pub fn new(
        storage: Arc<dyn CacheStorage>,
        fetcher: Arc<dyn NetworkFetcher>,
        stats: Arc<RwLock<CacheStats>>,
        config: Arc<Config>,
    ) -> Self {
        Self {
            storage,
            fetcher,
            stats,
            config,
        }
    }
}
