//! Cache Evictor Module
//!
//! Bounds partition size by removing the oldest entry after a write.

use tracing::debug;

use crate::cache::CacheStorage;
use crate::error::Result;

// == Limit Partition Size ==
/// Enforces an approximate upper bound on a partition's entry count.
///
/// Lists the partition's keys in stored order and, if the count exceeds
/// `max_items`, deletes exactly the oldest entry. At most one entry is
/// removed per invocation; the router runs it once per write against the
/// pre-write count, so a partition under steady write pressure stabilizes
/// at `max_items + 1` entries rather than being hard-capped. Callers
/// relying on a strict ceiling must not assume one.
///
/// # Arguments
/// * `storage` - The cache storage capability
/// * `partition` - Name of the partition to bound
/// * `max_items` - Entry count above which the oldest entry is removed
///
/// # Returns
/// The key of the evicted entry, or None if the partition was within bounds.
pub async fn limit_partition_size(
    storage: &dyn CacheStorage,
    partition: &str,
    max_items: usize,
) -> Result<Option<String>> {
    let keys = storage.keys(partition).await?;
    if keys.len() <= max_items {
        return Ok(None);
    }

    // Oldest-by-storage-order entry goes first
    let oldest = match keys.into_iter().next() {
        Some(key) => key,
        None => return Ok(None),
    };

    storage.delete(partition, &oldest).await?;
    debug!(partition, key = %oldest, "Evicted oldest cache entry");
    Ok(Some(oldest))
}
