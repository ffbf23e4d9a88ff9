//! Configuration Module
//!
//! Handles loading and managing gateway configuration from environment variables.

use std::env;

use url::Url;

/// Static asset paths pre-cached at install time.
///
/// Each entry is attempted independently; one that the upstream does not
/// serve is logged and skipped. The offline fallback document is part of
/// the manifest so it is available before any page has been visited.
pub const DEFAULT_PRECACHE_MANIFEST: &[&str] = &[
    "/",
    "/index.html",
    "/index.css",
    "/static/js/main.js",
    "/static/css/main.css",
    "/static/media/banner.mp4",
    "/offline.html",
];

/// Gateway configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Origin the gateway fronts; relative requests resolve against it
    pub upstream_origin: Url,
    /// HTTP server port
    pub server_port: u16,
    /// Entry-count bound shared by the dynamic and user-image partitions
    pub max_partition_items: usize,
    /// Asset paths fetched into the static partition at install time
    pub precache_manifest: Vec<String>,
    /// Origin of the third-party avatar endpoint
    pub avatar_origin: String,
    /// Path of the third-party avatar endpoint
    pub avatar_path: String,
    /// Path of the document served when a network fetch fails
    pub offline_fallback_path: String,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `UPSTREAM_ORIGIN` - Origin to proxy (default: http://localhost:8080)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `MAX_PARTITION_ITEMS` - Eviction bound per bounded partition (default: 50)
    /// - `PRECACHE_MANIFEST` - Comma-separated asset paths (default: built-in list)
    /// - `AVATAR_ORIGIN` - Avatar endpoint origin (default: https://api.dicebear.com)
    /// - `AVATAR_PATH` - Avatar endpoint path (default: /5.x/initials/svg)
    /// - `OFFLINE_FALLBACK_PATH` - Fallback document path (default: /offline.html)
    pub fn from_env() -> Self {
        let defaults = Config::default();
        Self {
            upstream_origin: env::var("UPSTREAM_ORIGIN")
                .ok()
                .and_then(|v| Url::parse(&v).ok())
                .unwrap_or(defaults.upstream_origin),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.server_port),
            max_partition_items: env::var("MAX_PARTITION_ITEMS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_partition_items),
            precache_manifest: env::var("PRECACHE_MANIFEST")
                .ok()
                .map(|v| {
                    v.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or(defaults.precache_manifest),
            avatar_origin: env::var("AVATAR_ORIGIN").unwrap_or(defaults.avatar_origin),
            avatar_path: env::var("AVATAR_PATH").unwrap_or(defaults.avatar_path),
            offline_fallback_path: env::var("OFFLINE_FALLBACK_PATH")
                .unwrap_or(defaults.offline_fallback_path),
        }
    }

    /// Absolute URL of the offline fallback document on the upstream.
    pub fn offline_fallback_url(&self) -> Url {
        self.upstream_origin
            .join(&self.offline_fallback_path)
            .expect("fallback path joins onto a valid origin")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            upstream_origin: Url::parse("http://localhost:8080")
                .expect("default origin is a valid URL"),
            server_port: 3000,
            max_partition_items: 50,
            precache_manifest: DEFAULT_PRECACHE_MANIFEST
                .iter()
                .map(|s| s.to_string())
                .collect(),
            avatar_origin: "https://api.dicebear.com".to_string(),
            avatar_path: "/5.x/initials/svg".to_string(),
            offline_fallback_path: "/offline.html".to_string(),
        }
    }
}
