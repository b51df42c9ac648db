//! In-memory result cache with per-site generation counters.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use dashmap::{DashMap, DashSet};
use parking_lot::Mutex;
use tokio::time::Instant;
use uuid::Uuid;

use sitelog_query::PlanFingerprint;

use crate::config::InteractionsConfig;
use crate::domain::cache::{CacheError, CacheStats, CachedPage, SearchCache};

struct Entry {
    page: CachedPage,
    generation: u64,
    /// Insertion sequence number, matched against the order queue so
    /// eviction never removes an entry that was replaced after its slot was
    /// queued.
    seq: u64,
    expires_at: Instant,
}

#[derive(Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    stale: AtomicU64,
    insertions: AtomicU64,
    disabled_drops: AtomicU64,
}

/// Map-backed [`SearchCache`].
///
/// Entries are tagged with the site generation the caller snapshotted
/// before computing the page; a `bump` advances the counter and thereby
/// invalidates every older entry for that site without touching a single
/// key, and a page computed before a bump but stored after it is dropped
/// on arrival. Capacity is bounded with insertion-order eviction; the
/// order queue carries dead slots for replaced and removed keys until
/// compaction, which runs once the queue outgrows twice the capacity.
pub struct InMemorySearchCache {
    entries: DashMap<(Uuid, String), Entry>,
    generations: DashMap<Uuid, AtomicU64>,
    disabled: DashSet<Uuid>,
    order: Mutex<VecDeque<((Uuid, String), u64)>>,
    seq: AtomicU64,
    ttl: Duration,
    max_entries: usize,
    counters: Counters,
}

impl InMemorySearchCache {
    #[must_use]
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            entries: DashMap::new(),
            generations: DashMap::new(),
            disabled: DashSet::new(),
            order: Mutex::new(VecDeque::new()),
            seq: AtomicU64::new(0),
            ttl,
            max_entries,
            counters: Counters::default(),
        }
    }

    #[must_use]
    pub fn from_config(config: &InteractionsConfig) -> Self {
        Self::new(config.cache_ttl(), config.cache_max_entries)
    }

    fn current_generation(&self, site_id: Uuid) -> u64 {
        self.generations
            .get(&site_id)
            .map_or(0, |g| g.load(Ordering::Acquire))
    }

    fn evict_to_capacity(&self) {
        let mut order = self.order.lock();
        while self.entries.len() >= self.max_entries {
            let Some((key, seq)) = order.pop_front() else {
                break;
            };
            let live = self.entries.get(&key).is_some_and(|e| e.seq == seq);
            if live {
                self.entries.remove(&key);
            }
        }
        if order.len() >= self.max_entries.saturating_mul(2) {
            order.retain(|(key, seq)| self.entries.get(key).is_some_and(|e| e.seq == *seq));
        }
    }
}

#[async_trait]
impl SearchCache for InMemorySearchCache {
    async fn get(
        &self,
        site_id: Uuid,
        key: &PlanFingerprint,
    ) -> Result<Option<CachedPage>, CacheError> {
        if self.disabled.contains(&site_id) {
            self.counters.disabled_drops.fetch_add(1, Ordering::Relaxed);
            return Ok(None);
        }

        let map_key = (site_id, key.as_str().to_owned());
        let Some(entry) = self.entries.get(&map_key) else {
            self.counters.misses.fetch_add(1, Ordering::Relaxed);
            return Ok(None);
        };

        if entry.expires_at <= Instant::now() {
            drop(entry);
            self.entries.remove(&map_key);
            self.counters.misses.fetch_add(1, Ordering::Relaxed);
            return Ok(None);
        }
        if entry.generation != self.current_generation(site_id) {
            drop(entry);
            self.entries.remove(&map_key);
            self.counters.stale.fetch_add(1, Ordering::Relaxed);
            return Ok(None);
        }

        self.counters.hits.fetch_add(1, Ordering::Relaxed);
        Ok(Some(entry.page.clone()))
    }

    async fn generation(&self, site_id: Uuid) -> Result<u64, CacheError> {
        Ok(self.current_generation(site_id))
    }

    async fn put(
        &self,
        site_id: Uuid,
        key: &PlanFingerprint,
        generation: u64,
        page: CachedPage,
    ) -> Result<(), CacheError> {
        if self.disabled.contains(&site_id) {
            self.counters.disabled_drops.fetch_add(1, Ordering::Relaxed);
            return Ok(());
        }
        if generation != self.current_generation(site_id) {
            // The site moved on while the page was being computed; storing
            // it would serve a pre-write result as current.
            self.counters.stale.fetch_add(1, Ordering::Relaxed);
            return Ok(());
        }

        self.evict_to_capacity();

        let map_key = (site_id, key.as_str().to_owned());
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        self.order.lock().push_back((map_key.clone(), seq));
        self.entries.insert(
            map_key,
            Entry {
                page,
                generation,
                seq,
                expires_at: Instant::now() + self.ttl,
            },
        );
        self.counters.insertions.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    async fn bump(&self, site_id: Uuid) -> Result<(), CacheError> {
        self.generations
            .entry(site_id)
            .or_insert_with(|| AtomicU64::new(0))
            .fetch_add(1, Ordering::AcqRel);
        Ok(())
    }

    async fn disable(&self, site_id: Uuid) {
        self.disabled.insert(site_id);
    }

    async fn enable(&self, site_id: Uuid) {
        self.disabled.remove(&site_id);
    }

    fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            stale: self.counters.stale.load(Ordering::Relaxed),
            insertions: self.counters.insertions.load(Ordering::Relaxed),
            disabled_drops: self.counters.disabled_drops.load(Ordering::Relaxed),
        }
    }
}
