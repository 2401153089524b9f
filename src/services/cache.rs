use serde::{Deserialize, Serialize};
use std::time::Duration;

/// In-process cache for enrichment reasoning
///
/// Scoring itself is cheap and always recomputed; only the collaborator
/// round trip is worth caching. Entries are keyed per buyer/property pair
/// and the overall score, so a rescored pair never serves stale prose.
pub struct ReasoningCache {
    cache: moka::future::Cache<String, String>,
}

impl ReasoningCache {
    /// Create a new cache with the given capacity and TTL
    pub fn new(capacity: u64, ttl_secs: u64) -> Self {
        let cache = moka::future::CacheBuilder::new(capacity)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Self { cache }
    }

    /// Get cached reasoning for a key
    pub async fn get(&self, key: &str) -> Option<String> {
        let hit = self.cache.get(key).await;
        if hit.is_some() {
            tracing::trace!("Reasoning cache hit: {}", key);
        }
        hit
    }

    /// Store reasoning for a key
    pub async fn insert(&self, key: String, reasoning: String) {
        tracing::trace!("Reasoning cache set: {}", key);
        self.cache.insert(key, reasoning).await;
    }

    /// Drop all cached reasoning
    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.cache.entry_count(),
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStats {
    pub entries: u64,
}

/// Cache key builder
pub struct CacheKey;

impl CacheKey {
    /// Build a cache key for a scored pair's reasoning
    pub fn reasoning(buyer_id: &str, property_id: &str, overall_score: u8) -> String {
        format!("reasoning:{}:{}:{}", buyer_id, property_id, overall_score)
    }
}
