//! Gateway Lifecycle
//!
//! Startup phases run before the gateway begins intercepting requests:
//! install pre-populates the static partition, activate sweeps partitions
//! left behind by a previous deployment.

use tracing::{info, warn};

use crate::cache::{ALLOWED_PARTITIONS, STATIC_PARTITION};
use crate::error::Result;
use crate::gateway::CacheRouter;
use crate::net::FetchRequest;

impl CacheRouter {
    // == Install ==
    /// Pre-populates the static partition from the bootstrap manifest.
    ///
    /// Each manifest entry is fetched and stored independently: an entry
    /// the upstream does not serve (or does not serve successfully) is
    /// logged and skipped without affecting the others. Install itself
    /// always completes once every attempt has finished.
    pub async fn handle_install(&self) {
        info!(
            assets = self.config.precache_manifest.len(),
            "Pre-caching static assets"
        );

        if let Err(err) = self.storage.open(STATIC_PARTITION).await {
            warn!(error = %err, "Could not open static partition");
        }

        for path in &self.config.precache_manifest {
            let url = match self.config.upstream_origin.join(path) {
                Ok(url) => url,
                Err(err) => {
                    warn!(path = %path, error = %err, "Skipping unresolvable manifest entry");
                    continue;
                }
            };

            let request = FetchRequest::get(url.clone());
            match self.fetcher.fetch(&request).await {
                Ok(snapshot) if snapshot.is_success() => {
                    if let Err(err) = self
                        .storage
                        .put(STATIC_PARTITION, request.key().to_string(), snapshot)
                        .await
                    {
                        warn!(url = %url, error = %err, "Failed to store pre-cached asset");
                    }
                }
                Ok(snapshot) => {
                    warn!(url = %url, status = snapshot.status, "Upstream did not serve manifest asset");
                }
                Err(err) => {
                    warn!(url = %url, error = %err, "Failed to pre-cache asset");
                }
            }
        }

        info!("Install complete");
    }

    // == Activate ==
    /// Destroys every partition whose name the current deployment does not
    /// recognize.
    ///
    /// Runs once at startup, after install and before any request is
    /// intercepted, so stale partitions from a previous version never serve
    /// traffic.
    pub async fn handle_activate(&self) -> Result<()> {
        for name in self.storage.partition_names().await? {
            if !ALLOWED_PARTITIONS.contains(&name.as_str()) {
                info!(partition = %name, "Deleting stale cache partition");
                self.storage.drop_partition(&name).await?;
            }
        }

        info!("Activation sweep complete");
        Ok(())
    }
}
