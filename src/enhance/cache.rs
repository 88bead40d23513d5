//! Bounded TTL cache for enhancement responses
//!
//! Explicitly constructed and injected into the queue: bounded capacity,
//! explicit TTL on a host-supplied clock, in-memory map mandatory, with an
//! optional persistent store strategy the host may plug in (browser
//! storage, IndexedDB bridge, a test double). No process-wide state.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::protocol::EnhancementResult;

/// Default TTL: one hour.
pub const DEFAULT_TTL_MS: f64 = 60.0 * 60.0 * 1000.0;
/// Default entry bound.
pub const DEFAULT_CAPACITY: usize = 128;

// =============================================================================
// Persistent store strategy
// =============================================================================

/// Optional second-level store. Values are serialized entries; the cache
/// owns expiry on read, so a store never needs its own TTL logic.
pub trait CacheStore {
    fn load(&self, key: &str) -> Option<String>;
    fn save(&mut self, key: &str, value: &str);
}

/// Trivial in-memory store, mainly for tests and as a reference
/// implementation of the strategy.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl CacheStore for MemoryStore {
    fn load(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn save(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }
}

// =============================================================================
// TtlCache
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Entry {
    inserted_ms: f64,
    results: Vec<EnhancementResult>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

pub struct TtlCache {
    capacity: usize,
    ttl_ms: f64,
    entries: HashMap<String, Entry>,
    /// Insertion order for capacity eviction.
    order: Vec<String>,
    store: Option<Box<dyn CacheStore>>,
    stats: CacheStats,
}

impl Default for TtlCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, DEFAULT_TTL_MS)
    }
}

impl TtlCache {
    pub fn new(capacity: usize, ttl_ms: f64) -> Self {
        Self {
            capacity: capacity.max(1),
            ttl_ms,
            entries: HashMap::new(),
            order: Vec::new(),
            store: None,
            stats: CacheStats::default(),
        }
    }

    /// Attach a persistent backing store.
    pub fn with_store(mut self, store: Box<dyn CacheStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Fetch unexpired results for a key. Falls back to the persistent
    /// store on an in-memory miss.
    pub fn get(&mut self, key: &str, now_ms: f64) -> Option<Vec<EnhancementResult>> {
        if let Some(entry) = self.entries.get(key) {
            if now_ms - entry.inserted_ms <= self.ttl_ms {
                self.stats.hits += 1;
                return Some(entry.results.clone());
            }
            self.entries.remove(key);
            self.order.retain(|k| k != key);
        }

        if let Some(store) = &self.store {
            if let Some(raw) = store.load(key) {
                if let Ok(entry) = serde_json::from_str::<Entry>(&raw) {
                    if now_ms - entry.inserted_ms <= self.ttl_ms {
                        self.stats.hits += 1;
                        let results = entry.results.clone();
                        self.insert_in_memory(key.to_string(), entry);
                        return Some(results);
                    }
                }
            }
        }

        self.stats.misses += 1;
        None
    }

    /// Insert results under a key, evicting expired entries first and the
    /// oldest entries beyond capacity.
    pub fn insert(&mut self, key: &str, results: Vec<EnhancementResult>, now_ms: f64) {
        self.evict_expired(now_ms);
        let entry = Entry {
            inserted_ms: now_ms,
            results,
        };
        if let Some(store) = &mut self.store {
            if let Ok(raw) = serde_json::to_string(&entry) {
                store.save(key, &raw);
            }
        }
        self.insert_in_memory(key.to_string(), entry);
    }

    fn insert_in_memory(&mut self, key: String, entry: Entry) {
        if self.entries.insert(key.clone(), entry).is_none() {
            self.order.push(key);
        }
        while self.entries.len() > self.capacity {
            let oldest = self.order.remove(0);
            self.entries.remove(&oldest);
            self.stats.evictions += 1;
        }
    }

    fn evict_expired(&mut self, now_ms: f64) {
        let ttl = self.ttl_ms;
        let entries = &mut self.entries;
        self.order.retain(|key| {
            let keep = entries
                .get(key)
                .map(|e| now_ms - e.inserted_ms <= ttl)
                .unwrap_or(false);
            if !keep {
                entries.remove(key);
            }
            keep
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }
}

/// Cache key for a batch: the sorted suggestion ids plus the document
/// context hash, so unchanged context under repeated edits reuses the
/// previous response.
pub fn batch_cache_key(suggestion_ids: &[String], context_hash: u64) -> String {
    let mut ids: Vec<&str> = suggestion_ids.iter().map(|s| s.as_str()).collect();
    ids.sort_unstable();
    format!("{}@{:x}", ids.join("|"), context_hash)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn result(id: &str) -> EnhancementResult {
        EnhancementResult {
            id: id.to_string(),
            enhanced_fix: Some("fix".to_string()),
            confidence: 0.8,
            reasoning: String::new(),
            should_replace: true,
            alternative_fixes: vec![],
        }
    }

    #[test]
    fn test_roundtrip_within_ttl() {
        let mut cache = TtlCache::new(8, 1000.0);
        cache.insert("k", vec![result("a")], 0.0);
        let hit = cache.get("k", 500.0).unwrap();
        assert_eq!(hit[0].id, "a");
    }

    #[test]
    fn test_expiry() {
        let mut cache = TtlCache::new(8, 1000.0);
        cache.insert("k", vec![result("a")], 0.0);
        assert!(cache.get("k", 1001.0).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_capacity_eviction_oldest_first() {
        let mut cache = TtlCache::new(2, 10_000.0);
        cache.insert("k1", vec![result("a")], 0.0);
        cache.insert("k2", vec![result("b")], 1.0);
        cache.insert("k3", vec![result("c")], 2.0);
        assert_eq!(cache.len(), 2);
        assert!(cache.get("k1", 3.0).is_none());
        assert!(cache.get("k2", 3.0).is_some());
        assert!(cache.get("k3", 3.0).is_some());
    }

    #[test]
    fn test_reinsert_same_key_does_not_grow() {
        let mut cache = TtlCache::new(4, 10_000.0);
        cache.insert("k", vec![result("a")], 0.0);
        cache.insert("k", vec![result("b")], 1.0);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("k", 2.0).unwrap()[0].id, "b");
    }

    fn seeded_store(inserted_ms: f64) -> MemoryStore {
        let mut store = MemoryStore::default();
        store.save(
            "k",
            &serde_json::to_string(&Entry {
                inserted_ms,
                results: vec![result("a")],
            })
            .unwrap(),
        );
        store
    }

    #[test]
    fn test_persistent_store_fallback() {
        // A fresh cache over a previously written store sees the entry
        let mut cache = TtlCache::new(4, 10_000.0).with_store(Box::new(seeded_store(0.0)));
        assert!(cache.get("k", 100.0).is_some());
    }

    #[test]
    fn test_persistent_store_respects_ttl() {
        let mut cache = TtlCache::new(4, 10_000.0).with_store(Box::new(seeded_store(0.0)));
        assert!(cache.get("k", 20_000.0).is_none());
    }

    #[test]
    fn test_batch_cache_key_order_independent() {
        let a = batch_cache_key(&["x".to_string(), "y".to_string()], 7);
        let b = batch_cache_key(&["y".to_string(), "x".to_string()], 7);
        assert_eq!(a, b);
        let c = batch_cache_key(&["x".to_string(), "y".to_string()], 8);
        assert_ne!(a, c);
    }

    #[test]
    fn test_stats_counted() {
        let mut cache = TtlCache::new(2, 1000.0);
        cache.insert("k", vec![result("a")], 0.0);
        cache.get("k", 1.0);
        cache.get("missing", 1.0);
        assert_eq!(cache.stats().hits, 1);
        assert_eq!(cache.stats().misses, 1);
    }
}
