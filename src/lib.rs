//! Cachefront - An offline-first caching gateway
//!
//! Intercepts requests bound for an upstream origin, serves them from
//! partitioned response caches or the live network, and substitutes a
//! cached offline document when the network is unreachable.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod gateway;
pub mod models;
pub mod net;

pub use api::AppState;
pub use config::Config;
