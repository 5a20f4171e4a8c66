//! Path-keyed cache for rendered playlist documents.
//!
//! Playlist rendering refetches every upstream source, so successful
//! renders are kept for a short TTL keyed by request path. Requests that
//! carry policy overrides or the debug flag bypass the cache entirely;
//! their output never lands here.

use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

use lru::LruCache;
use tokio::sync::RwLock;
use tracing::debug;

use crate::config::CacheConfig;

struct CachedResponse {
    body: String,
    stored_at: Instant,
}

pub struct ResponseCache {
    enabled: bool,
    ttl: Duration,
    entries: RwLock<LruCache<String, CachedResponse>>,
}

impl ResponseCache {
    pub fn new(config: &CacheConfig) -> Self {
        let capacity = NonZeroUsize::new(config.capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            enabled: config.enabled,
            ttl: config.ttl,
            entries: RwLock::new(LruCache::new(capacity)),
        }
    }

    pub async fn get(&self, key: &str) -> Option<String> {
        if !self.enabled {
            return None;
        }
        // LruCache::get updates recency, so reads take the write lock too.
        let mut entries = self.entries.write().await;
        match entries.get(key) {
            Some(cached) if cached.stored_at.elapsed() <= self.ttl => {
                debug!("Cache hit for '{}'", key);
                Some(cached.body.clone())
            }
            Some(_) => {
                debug!("Cache entry for '{}' expired", key);
                entries.pop(key);
                None
            }
            None => {
                debug!("Cache miss for '{}'", key);
                None
            }
        }
    }

    pub async fn put(&self, key: &str, body: String) {
        if !self.enabled {
            return;
        }
        let mut entries = self.entries.write().await;
        entries.put(
            key.to_string(),
            CachedResponse {
                body,
                stored_at: Instant::now(),
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache_config(enabled: bool, capacity: usize, ttl: Duration) -> CacheConfig {
        CacheConfig {
            enabled,
            capacity,
            ttl,
            shared_ttl: Duration::from_secs(3600),
        }
    }

    #[tokio::test]
    async fn stores_and_returns_fresh_entries() {
        let cache = ResponseCache::new(&cache_config(true, 4, Duration::from_secs(60)));
        assert_eq!(cache.get("/merged.m3u").await, None);

        cache.put("/merged.m3u", "#EXTM3U\n".to_string()).await;
        assert_eq!(cache.get("/merged.m3u").await.as_deref(), Some("#EXTM3U\n"));
        assert_eq!(cache.get("/designated.m3u").await, None);
    }

    #[tokio::test]
    async fn expired_entries_are_dropped() {
        let cache = ResponseCache::new(&cache_config(true, 4, Duration::from_millis(10)));
        cache.put("/merged.m3u", "old".to_string()).await;
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(cache.get("/merged.m3u").await, None);
    }

    #[tokio::test]
    async fn disabled_cache_never_stores() {
        let cache = ResponseCache::new(&cache_config(false, 4, Duration::from_secs(60)));
        cache.put("/merged.m3u", "body".to_string()).await;
        assert_eq!(cache.get("/merged.m3u").await, None);
    }

    #[tokio::test]
    async fn capacity_evicts_least_recently_used() {
        let cache = ResponseCache::new(&cache_config(true, 1, Duration::from_secs(60)));
        cache.put("/merged.m3u", "a".to_string()).await;
        cache.put("/designated.m3u", "b".to_string()).await;
        assert_eq!(cache.get("/merged.m3u").await, None);
        assert_eq!(cache.get("/designated.m3u").await.as_deref(), Some("b"));
    }
}
