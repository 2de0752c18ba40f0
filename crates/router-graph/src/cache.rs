//! Bounded LRU+TTL cache over routing decisions.

use parking_lot::RwLock;
use router_core::{RouterResult, RoutingDecision};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// Cache configuration.
#[derive(Debug, Clone)]
pub struct PathCacheConfig {
    /// Maximum number of live entries.
    pub max_size: usize,
    /// Per-entry lifetime.
    pub ttl: Duration,
}

impl Default for PathCacheConfig {
    fn default() -> Self {
        Self {
            max_size: 1000,
            ttl: Duration::from_secs(300),
        }
    }
}

struct CacheEntry {
    decision: RoutingDecision,
    expires_at: Instant,
    // Recency stamp, bumped on every hit without taking the write lock.
    last_access: AtomicU64,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now > self.expires_at
    }
}

/// Snapshot of cache counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Live entries at snapshot time.
    pub size: usize,
    /// Lookups served from the cache.
    pub hits: u64,
    /// Lookups that fell through to the decision function.
    pub misses: u64,
}

impl CacheStats {
    /// Hit rate in `[0, 1]`; zero when nothing was looked up yet.
    #[must_use]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Thread-safe decision cache keyed by payload.
///
/// Lookups take the read lock and bump an atomic recency stamp, so reads
/// never block other reads. Insertion double-checks under the write lock:
/// of two concurrent misses on one key, the first writer's value stays and
/// the loser's computation is discarded. Expired entries are evicted
/// before least-recently-used ones.
pub struct PathCache {
    config: PathCacheConfig,
    entries: RwLock<HashMap<String, CacheEntry>>,
    clock: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl PathCache {
    /// Create a cache.
    #[must_use]
    pub fn new(config: PathCacheConfig) -> Self {
        Self {
            config,
            entries: RwLock::new(HashMap::new()),
            clock: AtomicU64::new(0),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Create a cache with the default bounds (1000 entries, 5 minutes).
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(PathCacheConfig::default())
    }

    /// Look up a live entry without computing on miss.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<RoutingDecision> {
        let now = Instant::now();
        let entries = self.entries.read();
        match entries.get(key) {
            Some(entry) if !entry.is_expired(now) => {
                entry
                    .last_access
                    .store(self.tick(), Ordering::Relaxed);
                self.hits.fetch_add(1, Ordering::Relaxed);
                trace!(key, "cache hit");
                Some(entry.decision.clone())
            }
            _ => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                trace!(key, "cache miss");
                None
            }
        }
    }

    /// Return the cached decision for a key, computing and storing it on
    /// miss. Errors from the decision function are propagated and never
    /// cached.
    pub fn get_or_compute<F>(&self, key: &str, compute: F) -> RouterResult<RoutingDecision>
    where
        F: FnOnce() -> RouterResult<RoutingDecision>,
    {
        if let Some(decision) = self.get(key) {
            return Ok(decision);
        }

        // Compute outside any lock; pathfinding is bounded CPU work but
        // holding the write lock across it would serialize all misses.
        let decision = compute()?;

        let now = Instant::now();
        let mut entries = self.entries.write();
        if let Some(existing) = entries.get(key) {
            if !existing.is_expired(now) {
                // A concurrent miss won the race; keep its value.
                return Ok(existing.decision.clone());
            }
        }
        self.evict_locked(&mut entries, now);
        entries.insert(
            key.to_string(),
            CacheEntry {
                decision: decision.clone(),
                expires_at: now + self.config.ttl,
                last_access: AtomicU64::new(self.tick()),
            },
        );
        Ok(decision)
    }

    /// Drop every entry and reset nothing else; counters survive.
    pub fn clear(&self) {
        self.entries.write().clear();
        debug!("path cache cleared");
    }

    /// Counter snapshot.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            size: self.entries.read().len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    fn tick(&self) -> u64 {
        self.clock.fetch_add(1, Ordering::Relaxed) + 1
    }

    // Caller holds the write lock. Expired entries go first; if the cache
    // is still full, the least-recently-used entries make room for one
    // insertion.
    fn evict_locked(&self, entries: &mut HashMap<String, CacheEntry>, now: Instant) {
        entries.retain(|_, entry| !entry.is_expired(now));
        if entries.len() < self.config.max_size {
            return;
        }
        let overflow = entries.len() + 1 - self.config.max_size;
        let mut by_recency: Vec<(String, u64)> = entries
            .iter()
            .map(|(key, entry)| (key.clone(), entry.last_access.load(Ordering::Relaxed)))
            .collect();
        by_recency.sort_by_key(|(_, stamp)| *stamp);
        for (key, _) in by_recency.into_iter().take(overflow) {
            debug!(key = %key, "evicting least-recently-used entry");
            entries.remove(&key);
        }
    }
}

impl std::fmt::Debug for PathCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let stats = self.stats();
        f.debug_struct("PathCache")
            .field("size", &stats.size)
            .field("max_size", &self.config.max_size)
            .field("hits", &stats.hits)
            .field("misses", &stats.misses)
            .finish()
    }
}
