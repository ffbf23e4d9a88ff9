//! Cache Module
//!
//! Partitioned response caching with insertion-ordered, bounded eviction.

mod evictor;
mod order;
mod partition;
mod snapshot;
mod stats;
mod storage;


// Re-export public types
pub use evictor::limit_partition_size;
pub use order::InsertionOrder;
pub use partition::Partition;
pub use snapshot::ResponseSnapshot;
pub use stats::CacheStats;
pub use storage::{CacheStorage, MemoryStorage};

// == Public Constants ==
/// Partition holding assets pre-cached at install time (unbounded)
pub const STATIC_PARTITION: &str = "static";

/// Partition holding responses cached on the fly (bounded)
pub const DYNAMIC_PARTITION: &str = "dynamic";

/// Partition holding third-party avatar images (bounded)
pub const USER_IMAGE_PARTITION: &str = "user-image";

/// Partition names recognized by the current deployment.
///
/// Any persistent partition outside this list is stale and is destroyed
/// during the activation sweep.
pub const ALLOWED_PARTITIONS: &[&str] =
    &[STATIC_PARTITION, DYNAMIC_PARTITION, USER_IMAGE_PARTITION];
