//! Fetch Routing
//!
//! The read-through / write-through policies applied to every intercepted
//! request.

use tracing::{debug, error};

use crate::cache::{limit_partition_size, ResponseSnapshot, DYNAMIC_PARTITION, USER_IMAGE_PARTITION};
use crate::error::{GatewayError, Result};
use crate::gateway::CacheRouter;
use crate::net::FetchRequest;

impl CacheRouter {
    // == Handle Fetch ==
    /// Routes one intercepted request to a response.
    ///
    /// Requests targeting the third-party avatar endpoint (exact origin and
    /// exact path) take the user-image policy; everything else takes the
    /// generic policy. Either way the caller gets a response snapshot back
    /// unless the avatar network path fails, which propagates as an error
    /// by design.
    pub async fn handle_fetch(&self, request: FetchRequest) -> Result<ResponseSnapshot> {
        if request.matches_endpoint(&self.config.avatar_origin, &self.config.avatar_path) {
            self.user_image_policy(request).await
        } else {
            self.generic_policy(request).await
        }
    }

    // == User-Image Policy ==
    /// Read-through cache scoped to the user-image partition.
    ///
    /// Hit: stored snapshot. Miss: live fetch, one eviction pass against
    /// the pre-write count, stored clone. A network failure propagates to
    /// the caller; there is no fallback image.
    async fn user_image_policy(&self, request: FetchRequest) -> Result<ResponseSnapshot> {
        self.storage.open(USER_IMAGE_PARTITION).await?;

        if request.is_cacheable() {
            if let Some(snapshot) = self
                .storage
                .match_in(USER_IMAGE_PARTITION, request.key())
                .await?
            {
                debug!(key = request.key(), "User-image cache hit");
                self.stats.write().await.record_hit();
                return Ok(snapshot);
            }
            self.stats.write().await.record_miss();
        }

        let snapshot = self.fetcher.fetch(&request).await?;

        if request.is_cacheable() {
            self.run_evictor(USER_IMAGE_PARTITION).await?;
            self.storage
                .put(
                    USER_IMAGE_PARTITION,
                    request.key().to_string(),
                    snapshot.clone(),
                )
                .await?;
        }

        Ok(snapshot)
    }

    // == Generic Policy ==
    /// Read-through cache across all partitions, writing to dynamic.
    ///
    /// Hit (static or dynamic): stored snapshot. Miss: live fetch; success
    /// runs one eviction pass and stores a clone into the dynamic
    /// partition; network failure serves the offline fallback instead of
    /// surfacing the error. The fallback is never used for a bare miss.
    async fn generic_policy(&self, request: FetchRequest) -> Result<ResponseSnapshot> {
        if request.is_cacheable() {
            if let Some(snapshot) = self.storage.match_any(request.key()).await? {
                debug!(key = request.key(), "Cache hit");
                self.stats.write().await.record_hit();
                return Ok(snapshot);
            }
            self.stats.write().await.record_miss();
        }

        match self.fetcher.fetch(&request).await {
            Ok(snapshot) => {
                if request.is_cacheable() {
                    self.run_evictor(DYNAMIC_PARTITION).await?;
                    self.storage
                        .put(DYNAMIC_PARTITION, request.key().to_string(), snapshot.clone())
                        .await?;
                }
                Ok(snapshot)
            }
            Err(err) => {
                error!(url = %request.url, error = %err, "Network fetch failed, serving offline fallback");
                self.offline_fallback().await
            }
        }
    }

    // == Offline Fallback ==
    /// Serves the cached offline document in place of a failed fetch.
    async fn offline_fallback(&self) -> Result<ResponseSnapshot> {
        let fallback_key = self.config.offline_fallback_url();
        match self.storage.match_any(fallback_key.as_str()).await? {
            Some(snapshot) => {
                self.stats.write().await.record_fallback();
                Ok(snapshot)
            }
            None => Err(GatewayError::Offline(
                "offline fallback document is not cached".to_string(),
            )),
        }
    }

    // == Run Evictor ==
    /// One eviction pass per write, recording the outcome.
    ///
    /// Runs against the pre-write count: a write that pushes the partition
    /// to `max_items + 1` triggers no eviction itself, and each subsequent
    /// write removes one oldest entry before storing, so the partition
    /// stabilizes at `max_items + 1` entries.
    async fn run_evictor(&self, partition: &str) -> Result<()> {
        let evicted =
            limit_partition_size(self.storage.as_ref(), partition, self.config.max_partition_items)
                .await?;
        if evicted.is_some() {
            self.stats.write().await.record_eviction();
        }
        Ok(())
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::http::Method;
    use bytes::Bytes;
    use tokio::sync::RwLock;
    use url::Url;

    use crate::cache::{
        CacheStats, CacheStorage, MemoryStorage, ResponseSnapshot, DYNAMIC_PARTITION,
        STATIC_PARTITION, USER_IMAGE_PARTITION,
    };
    use crate::config::Config;
    use crate::error::{GatewayError, Result};
    use crate::gateway::CacheRouter;
    use crate::net::{FetchRequest, NetworkFetcher};

    /// Programmable upstream: URL -> (status, body), or total outage.
    struct FakeNetwork {
        routes: HashMap<String, (u16, &'static str)>,
        offline: bool,
        calls: AtomicUsize,
    }

    impl FakeNetwork {
        fn online(routes: &[(&str, u16, &'static str)]) -> Self {
            Self {
                routes: routes
                    .iter()
                    .map(|(url, status, body)| (url.to_string(), (*status, *body)))
                    .collect(),
                offline: false,
                calls: AtomicUsize::new(0),
            }
        }

        fn offline() -> Self {
            Self {
                routes: HashMap::new(),
                offline: true,
                calls: AtomicUsize::new(0),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl NetworkFetcher for FakeNetwork {
        async fn fetch(&self, request: &FetchRequest) -> Result<ResponseSnapshot> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.offline {
                return Err(GatewayError::Network("network unreachable".to_string()));
            }
            match self.routes.get(request.url.as_str()) {
                Some((status, body)) => Ok(ResponseSnapshot::new(
                    *status,
                    vec![("content-type".to_string(), "text/html".to_string())],
                    Bytes::from_static(body.as_bytes()),
                )),
                None => Err(GatewayError::Network(format!(
                    "no route for {}",
                    request.url
                ))),
            }
        }
    }

    fn build_router(network: Arc<FakeNetwork>) -> (CacheRouter, Arc<MemoryStorage>) {
        let storage = Arc::new(MemoryStorage::new());
        let router = CacheRouter::new(
            storage.clone(),
            network,
            Arc::new(RwLock::new(CacheStats::new())),
            Arc::new(Config::default()),
        );
        (router, storage)
    }

    fn page_request(path: &str) -> FetchRequest {
        FetchRequest::get(
            Url::parse("http://localhost:8080")
                .unwrap()
                .join(path)
                .unwrap(),
        )
    }

    fn avatar_request(seed: &str) -> FetchRequest {
        FetchRequest::get(
            Url::parse(&format!(
                "https://api.dicebear.com/5.x/initials/svg?seed={seed}"
            ))
            .unwrap(),
        )
    }

    #[tokio::test]
    async fn test_generic_miss_fetches_and_caches_in_dynamic() {
        let network = Arc::new(FakeNetwork::online(&[(
            "http://localhost:8080/index.html",
            200,
            "<html>home</html>",
        )]));
        let (router, storage) = build_router(network.clone());

        let response = router.handle_fetch(page_request("/index.html")).await.unwrap();
        assert_eq!(response.body, Bytes::from_static(b"<html>home</html>"));
        assert_eq!(network.call_count(), 1);

        // The response landed in the dynamic partition
        assert!(storage
            .match_in(DYNAMIC_PARTITION, "http://localhost:8080/index.html")
            .await
            .unwrap()
            .is_some());

        // A repeat request is served from cache, no second fetch
        let repeat = router.handle_fetch(page_request("/index.html")).await.unwrap();
        assert_eq!(repeat.body, Bytes::from_static(b"<html>home</html>"));
        assert_eq!(network.call_count(), 1);
    }

    #[tokio::test]
    async fn test_generic_hit_prefers_static_partition() {
        let network = Arc::new(FakeNetwork::online(&[]));
        let (router, storage) = build_router(network.clone());

        storage
            .put(
                STATIC_PARTITION,
                "http://localhost:8080/index.html".to_string(),
                ResponseSnapshot::new(200, vec![], Bytes::from_static(b"precached")),
            )
            .await
            .unwrap();

        let response = router.handle_fetch(page_request("/index.html")).await.unwrap();
        assert_eq!(response.body, Bytes::from_static(b"precached"));
        assert_eq!(network.call_count(), 0);
    }

    #[tokio::test]
    async fn test_network_failure_serves_offline_fallback() {
        let network = Arc::new(FakeNetwork::offline());
        let (router, storage) = build_router(network);

        storage
            .put(
                STATIC_PARTITION,
                "http://localhost:8080/offline.html".to_string(),
                ResponseSnapshot::new(200, vec![], Bytes::from_static(b"<html>offline</html>")),
            )
            .await
            .unwrap();

        let response = router.handle_fetch(page_request("/some/page")).await.unwrap();
        assert_eq!(response.body, Bytes::from_static(b"<html>offline</html>"));
    }

    #[tokio::test]
    async fn test_network_failure_without_fallback_is_offline_error() {
        let network = Arc::new(FakeNetwork::offline());
        let (router, _storage) = build_router(network);

        let result = router.handle_fetch(page_request("/some/page")).await;
        assert!(matches!(result, Err(GatewayError::Offline(_))));
    }

    #[tokio::test]
    async fn test_cache_miss_alone_never_serves_fallback() {
        let network = Arc::new(FakeNetwork::online(&[(
            "http://localhost:8080/fresh",
            200,
            "fresh",
        )]));
        let (router, storage) = build_router(network.clone());

        storage
            .put(
                STATIC_PARTITION,
                "http://localhost:8080/offline.html".to_string(),
                ResponseSnapshot::new(200, vec![], Bytes::from_static(b"offline")),
            )
            .await
            .unwrap();

        // Miss with reachable network: live response, not the fallback
        let response = router.handle_fetch(page_request("/fresh")).await.unwrap();
        assert_eq!(response.body, Bytes::from_static(b"fresh"));
        assert_eq!(network.call_count(), 1);
    }

    #[tokio::test]
    async fn test_avatar_second_request_served_from_cache() {
        let network = Arc::new(FakeNetwork::online(&[(
            "https://api.dicebear.com/5.x/initials/svg?seed=ada",
            200,
            "<svg>ada</svg>",
        )]));
        let (router, storage) = build_router(network.clone());

        let first = router.handle_fetch(avatar_request("ada")).await.unwrap();
        assert_eq!(first.body, Bytes::from_static(b"<svg>ada</svg>"));
        assert_eq!(network.call_count(), 1);

        let second = router.handle_fetch(avatar_request("ada")).await.unwrap();
        assert_eq!(second.body, Bytes::from_static(b"<svg>ada</svg>"));
        assert_eq!(network.call_count(), 1, "cached avatar must not refetch");

        // Stored in the user-image partition, not dynamic
        assert!(storage
            .match_in(
                USER_IMAGE_PARTITION,
                "https://api.dicebear.com/5.x/initials/svg?seed=ada"
            )
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_avatar_different_query_is_a_miss() {
        let network = Arc::new(FakeNetwork::online(&[
            ("https://api.dicebear.com/5.x/initials/svg?seed=ada", 200, "<svg>ada</svg>"),
            ("https://api.dicebear.com/5.x/initials/svg?seed=grace", 200, "<svg>grace</svg>"),
        ]));
        let (router, _storage) = build_router(network.clone());

        router.handle_fetch(avatar_request("ada")).await.unwrap();
        let other = router.handle_fetch(avatar_request("grace")).await.unwrap();

        assert_eq!(other.body, Bytes::from_static(b"<svg>grace</svg>"));
        assert_eq!(network.call_count(), 2);
    }

    #[tokio::test]
    async fn test_avatar_network_failure_propagates() {
        let network = Arc::new(FakeNetwork::offline());
        let (router, storage) = build_router(network);

        // Even with a fallback cached, the image path gets none
        storage
            .put(
                STATIC_PARTITION,
                "http://localhost:8080/offline.html".to_string(),
                ResponseSnapshot::new(200, vec![], Bytes::from_static(b"offline")),
            )
            .await
            .unwrap();

        let result = router.handle_fetch(avatar_request("ada")).await;
        assert!(matches!(result, Err(GatewayError::Network(_))));
    }

    #[tokio::test]
    async fn test_avatar_path_mismatch_routes_generic() {
        let network = Arc::new(FakeNetwork::online(&[(
            "https://api.dicebear.com/6.x/initials/svg?seed=ada",
            200,
            "<svg>v6</svg>",
        )]));
        let (router, storage) = build_router(network);

        let request = FetchRequest::get(
            Url::parse("https://api.dicebear.com/6.x/initials/svg?seed=ada").unwrap(),
        );
        router.handle_fetch(request).await.unwrap();

        // Landed in dynamic, not user-image
        assert!(storage
            .match_in(
                DYNAMIC_PARTITION,
                "https://api.dicebear.com/6.x/initials/svg?seed=ada"
            )
            .await
            .unwrap()
            .is_some());
        assert!(storage
            .match_in(
                USER_IMAGE_PARTITION,
                "https://api.dicebear.com/6.x/initials/svg?seed=ada"
            )
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_dynamic_partition_converges_to_bound_plus_one() {
        let routes: Vec<(String, (u16, &'static str))> = (0..60)
            .map(|i| (format!("http://localhost:8080/page/{i}"), (200u16, "page")))
            .collect();
        let network = Arc::new(FakeNetwork {
            routes: routes.into_iter().collect(),
            offline: false,
            calls: AtomicUsize::new(0),
        });

        let storage = Arc::new(MemoryStorage::new());
        let config = Config {
            max_partition_items: 5,
            ..Config::default()
        };
        let router = CacheRouter::new(
            storage.clone(),
            network,
            Arc::new(RwLock::new(CacheStats::new())),
            Arc::new(config),
        );

        for i in 0..60 {
            router
                .handle_fetch(page_request(&format!("/page/{i}")))
                .await
                .unwrap();
            let len = storage.keys(DYNAMIC_PARTITION).await.unwrap().len();
            assert!(len <= 6, "dynamic partition grew to {len}");
        }

        assert_eq!(storage.keys(DYNAMIC_PARTITION).await.unwrap().len(), 6);
    }

    #[tokio::test]
    async fn test_post_requests_bypass_cache() {
        let network = Arc::new(FakeNetwork::online(&[(
            "http://localhost:8080/api/generate",
            200,
            "{\"generatedText\":\"hi\"}",
        )]));
        let (router, storage) = build_router(network.clone());

        let request = FetchRequest {
            method: Method::POST,
            url: Url::parse("http://localhost:8080/api/generate").unwrap(),
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: Some(Bytes::from_static(b"{\"prompt\":\"hello\"}")),
        };

        router.handle_fetch(request.clone()).await.unwrap();
        router.handle_fetch(request).await.unwrap();

        // Both went to the network; nothing was stored
        assert_eq!(network.call_count(), 2);
        assert!(storage
            .match_any("http://localhost:8080/api/generate")
            .await
            .unwrap()
            .is_none());
    }
}
