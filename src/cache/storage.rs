//! Cache Storage Module
//!
//! The persistent-store capability the router is written against, plus the
//! in-memory implementation shipped with the gateway.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::cache::{Partition, ResponseSnapshot};
use crate::error::Result;

// == Cache Storage Capability ==
/// Partitioned key-value store for response snapshots.
///
/// Every operation is an await point; implementations must be safe for
/// concurrent use from independent request tasks. Partitions are created
/// lazily and survive until explicitly dropped.
#[async_trait]
pub trait CacheStorage: Send + Sync {
    /// Opens a partition, creating it if it does not exist yet.
    async fn open(&self, partition: &str) -> Result<()>;

    /// Looks up a key in one partition.
    async fn match_in(&self, partition: &str, key: &str) -> Result<Option<ResponseSnapshot>>;

    /// Looks up a key across all partitions, in partition-creation order.
    async fn match_any(&self, key: &str) -> Result<Option<ResponseSnapshot>>;

    /// Stores a snapshot, creating the partition if needed.
    ///
    /// Overwrites keep the key's original insertion position.
    async fn put(&self, partition: &str, key: String, snapshot: ResponseSnapshot) -> Result<()>;

    /// Deletes one entry. Returns true if it existed.
    async fn delete(&self, partition: &str, key: &str) -> Result<bool>;

    /// Lists a partition's keys in insertion order, oldest first.
    ///
    /// An unknown partition yields an empty list.
    async fn keys(&self, partition: &str) -> Result<Vec<String>>;

    /// Lists all existing partition names in creation order.
    async fn partition_names(&self) -> Result<Vec<String>>;

    /// Destroys a whole partition. Returns true if it existed.
    async fn drop_partition(&self, partition: &str) -> Result<bool>;
}

// == Memory Storage ==
/// In-memory `CacheStorage` implementation.
///
/// Partitions are kept in creation order so `match_any` has a stable
/// lookup precedence.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    partitions: RwLock<Vec<(String, Partition)>>,
}

impl MemoryStorage {
    /// Creates a new empty storage.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheStorage for MemoryStorage {
    async fn open(&self, partition: &str) -> Result<()> {
        let mut partitions = self.partitions.write().await;
        if !partitions.iter().any(|(name, _)| name == partition) {
            partitions.push((partition.to_string(), Partition::new()));
        }
        Ok(())
    }

    async fn match_in(&self, partition: &str, key: &str) -> Result<Option<ResponseSnapshot>> {
        let partitions = self.partitions.read().await;
        Ok(partitions
            .iter()
            .find(|(name, _)| name == partition)
            .and_then(|(_, p)| p.get(key))
            .cloned())
    }

    async fn match_any(&self, key: &str) -> Result<Option<ResponseSnapshot>> {
        let partitions = self.partitions.read().await;
        Ok(partitions
            .iter()
            .find_map(|(_, p)| p.get(key))
            .cloned())
    }

    async fn put(&self, partition: &str, key: String, snapshot: ResponseSnapshot) -> Result<()> {
        let mut partitions = self.partitions.write().await;
        if let Some((_, p)) = partitions.iter_mut().find(|(name, _)| name == partition) {
            p.insert(key, snapshot);
        } else {
            let mut p = Partition::new();
            p.insert(key, snapshot);
            partitions.push((partition.to_string(), p));
        }
        Ok(())
    }

    async fn delete(&self, partition: &str, key: &str) -> Result<bool> {
        let mut partitions = self.partitions.write().await;
        Ok(partitions
            .iter_mut()
            .find(|(name, _)| name == partition)
            .map(|(_, p)| p.remove(key))
            .unwrap_or(false))
    }

    async fn keys(&self, partition: &str) -> Result<Vec<String>> {
        let partitions = self.partitions.read().await;
        Ok(partitions
            .iter()
            .find(|(name, _)| name == partition)
            .map(|(_, p)| p.keys())
            .unwrap_or_default())
    }

    async fn partition_names(&self) -> Result<Vec<String>> {
        let partitions = self.partitions.read().await;
        Ok(partitions.iter().map(|(name, _)| name.clone()).collect())
    }

    async fn drop_partition(&self, partition: &str) -> Result<bool> {
        let mut partitions = self.partitions.write().await;
        let before = partitions.len();
        partitions.retain(|(name, _)| name != partition);
        Ok(partitions.len() < before)
    }
}
