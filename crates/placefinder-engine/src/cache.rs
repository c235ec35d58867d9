//! TTL cache of ranked results keyed by quantised origin.
//!
//! Backed by a sharded [`DashMap`], so a sweep only ever locks one shard at a
//! time and reads against other shards proceed concurrently.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use placefinder_core::{AppConfig, CategoryTag, Language};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::clock::Clock;
use crate::error::CacheError;
use crate::geo::Coordinate;
use crate::types::{RankedResult, SortMode};

pub const DEFAULT_MAX_ENTRIES: usize = 10_000;
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(300);

/// Cache identity of a search. The origin is quantised to 0.001° (~100 m)
/// so nearby repeat searches share an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    lat_milli: i32,
    lng_milli: i32,
    category: CategoryTag,
    radius_meters: u32,
    sort: SortMode,
    result_limit: usize,
    language: Language,
    /// Local hour for open-now blended searches, whose order depends on it.
    open_hour: Option<u32>,
}

impl CacheKey {
    #[must_use]
    pub fn new(origin: Coordinate, category: CategoryTag, radius_meters: u32, sort: SortMode) -> Self {
        Self {
            lat_milli: to_milli(origin.lat()),
            lng_milli: to_milli(origin.lng()),
            category,
            radius_meters,
            sort,
            result_limit: crate::types::DEFAULT_RESULT_LIMIT,
            language: Language::default(),
            open_hour: None,
        }
    }

    #[must_use]
    pub fn with_result_limit(mut self, result_limit: usize) -> Self {
        self.result_limit = result_limit;
        self
    }

    #[must_use]
    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    #[must_use]
    pub fn with_open_hour(mut self, hour: Option<u32>) -> Self {
        self.open_hour = hour;
        self
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "geo:{:.3},{:.3}:{}:{}:{}",
            f64::from(self.lat_milli) / 1000.0,
            f64::from(self.lng_milli) / 1000.0,
            self.category,
            self.radius_meters,
            self.sort
        )
    }
}

#[allow(clippy::cast_possible_truncation)]
fn to_milli(degrees: f64) -> i32 {
    // Coordinates are bounded to ±180°, well inside i32 after scaling.
    (degrees * 1000.0).round() as i32
}

/// Time-to-live per kind of search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheTtlPolicy {
    pub lodging: Duration,
    pub tourism: Duration,
    /// Upper bound for proximity-mode results, which go stale fastest.
    pub proximity_cap: Duration,
}

impl Default for CacheTtlPolicy {
    fn default() -> Self {
        Self {
            lodging: Duration::from_secs(7 * 24 * 3_600),
            tourism: Duration::from_secs(24 * 3_600),
            proximity_cap: Duration::from_secs(30 * 60),
        }
    }
}

impl CacheTtlPolicy {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            lodging: Duration::from_secs(config.cache_lodging_ttl_secs),
            tourism: Duration::from_secs(config.cache_tourism_ttl_secs),
            proximity_cap: Duration::from_secs(config.cache_proximity_ttl_secs),
        }
    }

    #[must_use]
    pub fn ttl_for(&self, category: CategoryTag, sort: SortMode) -> Duration {
        let base = match category {
            CategoryTag::Lodging => self.lodging,
            _ => self.tourism,
        };
        match sort {
            SortMode::Proximity => base.min(self.proximity_cap),
            SortMode::Rating => base,
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    payload: RankedResult,
    expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub size: usize,
    pub hit_ratio: f64,
}

pub struct GeoCache {
    entries: DashMap<CacheKey, CacheEntry>,
    clock: Arc<dyn Clock>,
    max_entries: usize,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl GeoCache {
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, max_entries: usize) -> Self {
        Self {
            entries: DashMap::new(),
            clock,
            max_entries,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Returns a clone of the live entry. An expired entry is removed and
    /// counts as a miss.
    pub fn get(&self, key: &CacheKey) -> Option<RankedResult> {
        let now = self.clock.now();
        let fresh = self
            .entries
            .get(key)
            .and_then(|entry| (entry.expires_at > now).then(|| entry.payload.clone()));

        if fresh.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.entries.remove_if(key, |_, entry| entry.expires_at <= now);
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
        fresh
    }

    /// Stores `value` for `ttl`, replacing any previous entry for `key`.
    ///
    /// The size bound is soft under concurrent writers.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Full`] when the cache holds `max_entries` live
    /// entries and `key` is not one of them.
    pub fn set(&self, key: CacheKey, value: RankedResult, ttl: Duration) -> Result<(), CacheError> {
        if !self.entries.contains_key(&key) && self.entries.len() >= self.max_entries {
            self.sweep();
            if self.entries.len() >= self.max_entries {
                return Err(CacheError::Full {
                    max_entries: self.max_entries,
                });
            }
        }

        let now = self.clock.now();
        let expires_at = chrono::Duration::from_std(ttl)
            .ok()
            .and_then(|ttl| now.checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        self.entries.insert(
            key,
            CacheEntry {
                payload: value,
                expires_at,
            },
        );
        Ok(())
    }

    pub fn invalidate(&self, key: &CacheKey) -> bool {
        self.entries.remove(key).is_some()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Drops every expired entry, returning how many were removed.
    pub fn sweep(&self) -> usize {
        let now = self.clock.now();
        let mut removed = 0;
        self.entries.retain(|_, entry| {
            let live = entry.expires_at > now;
            if !live {
                removed += 1;
            }
            live
        });
        removed
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn stats(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let lookups = hits + misses;
        CacheStats {
            hits,
            misses,
            size: self.entries.len(),
            hit_ratio: if lookups == 0 {
                0.0
            } else {
                hits as f64 / lookups as f64
            },
        }
    }
}

/// Stops the background sweeper when shut down or dropped.
pub struct SweeperHandle {
    task: JoinHandle<()>,
}

impl SweeperHandle {
    pub fn shutdown(self) {
        self.task.abort();
    }
}

impl Drop for SweeperHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Runs [`GeoCache::sweep`] every `every` on the current tokio runtime.
#[must_use]
pub fn spawn_sweeper(cache: Arc<GeoCache>, every: Duration) -> SweeperHandle {
    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let removed = cache.sweep();
            if removed > 0 {
                tracing::info!(removed, remaining = cache.len(), "cache sweep");
            } else {
                tracing::debug!(remaining = cache.len(), "cache sweep found nothing expired");
            }
        }
    });
    SweeperHandle { task }
}

#[cfg(test)]
#[path = "cache_test.rs"]
mod tests;
