//! TTL response cache for first-party proxy endpoints
//!
//! Several adapters read the same proxy path (the tx adapter's current value
//! and history both come from one endpoint), so successful GET bodies are
//! kept for a short TTL and shared. The cache is an explicit object handed
//! to adapters at construction; there is no module-global state. A cache
//! failure surfaces exactly like a raw fetch failure would.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use reqwest::Client;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::constants::{CACHE_TTL_SECS, REQUEST_TIMEOUT_SECS, USER_AGENT};
use crate::error::ProviderError;

/// Recognized cache options
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// How long a cached body stays fresh
    pub ttl: Duration,
    /// Maps a request path to its cache key
    pub key_fn: fn(&str) -> String,
}

fn path_key(path: &str) -> String {
    path.to_string()
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(CACHE_TTL_SECS),
            key_fn: path_key,
        }
    }
}

struct CachedEntry {
    fetched_at: Instant,
    body: Value,
}

/// Caching GET client for proxy endpoints
pub struct ResponseCache {
    base_url: String,
    client: Client,
    config: CacheConfig,
    entries: RwLock<HashMap<String, CachedEntry>>,
}

impl ResponseCache {
    /// Creates a cache rooted at the proxy origin.
    pub fn new(base_url: impl Into<String>, config: CacheConfig) -> Result<Self, ProviderError> {
        let base_url = base_url.into();
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ProviderError::network("proxy", base_url.clone(), e))?;

        Ok(Self {
            base_url,
            client,
            config,
            entries: RwLock::new(HashMap::new()),
        })
    }

    /// Returns the parsed JSON body for a proxy path, serving a fresh cached
    /// copy when one exists.
    ///
    /// Errors carry the calling adapter's provider name so the store can
    /// attribute them to the right metric.
    pub async fn get_data(&self, provider: &'static str, path: &str) -> Result<Value, ProviderError> {
        let key = (self.config.key_fn)(path);
        if let Some(body) = self.fresh(&key).await {
            tracing::debug!(provider, path, "serving cached proxy response");
            return Ok(body);
        }

        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(provider, %url, "fetching proxy endpoint");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ProviderError::network(provider, &url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::status(provider, &url, status.as_u16()));
        }

        let text = response
            .text()
            .await
            .map_err(|e| ProviderError::network(provider, &url, e))?;
        let body: Value = serde_json::from_str(&text)
            .map_err(|e| ProviderError::invalid_response(provider, &url, e.to_string()))?;

        let mut entries = self.entries.write().await;
        entries.insert(
            key,
            CachedEntry {
                fetched_at: Instant::now(),
                body: body.clone(),
            },
        );

        Ok(body)
    }

    async fn fresh(&self, key: &str) -> Option<Value> {
        let entries = self.entries.read().await;
        let entry = entries.get(key)?;
        if entry.fetched_at.elapsed() < self.config.ttl {
            Some(entry.body.clone())
        } else {
            None
        }
    }

    /// Seeds an entry directly, bypassing the network.
    #[cfg(test)]
    pub(crate) async fn seed(&self, path: &str, body: Value) {
        let key = (self.config.key_fn)(path);
        self.entries.write().await.insert(
            key,
            CachedEntry {
                fetched_at: Instant::now(),
                body,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // an origin nothing listens on, so a miss fails fast instead of hitting
    // the network
    const DEAD_ORIGIN: &str = "http://127.0.0.1:9";

    #[tokio::test]
    async fn fresh_entries_are_served_without_a_fetch() {
        let cache = ResponseCache::new(DEAD_ORIGIN, CacheConfig::default()).unwrap();
        cache.seed("/stats", json!({"ok": true})).await;

        let body = cache.get_data("etherscan", "/stats").await.unwrap();
        assert_eq!(body, json!({"ok": true}));
    }

    #[tokio::test]
    async fn expired_entries_fall_through_to_the_fetch_path() {
        let config = CacheConfig {
            ttl: Duration::from_secs(0),
            ..CacheConfig::default()
        };
        let cache = ResponseCache::new(DEAD_ORIGIN, config).unwrap();
        cache.seed("/stats", json!({"ok": true})).await;

        let err = cache.get_data("etherscan", "/stats").await.unwrap_err();
        assert_eq!(err.provider(), "etherscan");
    }

    #[tokio::test]
    async fn key_fn_controls_entry_identity() {
        fn strip_query(path: &str) -> String {
            path.split('?').next().unwrap_or(path).to_string()
        }
        let config = CacheConfig {
            key_fn: strip_query,
            ..CacheConfig::default()
        };
        let cache = ResponseCache::new(DEAD_ORIGIN, config).unwrap();
        cache.seed("/txs?startdate=2020-09-01", json!([1, 2, 3])).await;

        // same key once the query is stripped, so this hits the cache
        let body = cache.get_data("etherscan", "/txs?startdate=2020-10-01").await.unwrap();
        assert_eq!(body, json!([1, 2, 3]));
    }
}
