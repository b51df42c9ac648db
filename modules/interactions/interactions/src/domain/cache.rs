//! Result-cache port.

use async_trait::async_trait;
use uuid::Uuid;

use sitelog_query::PlanFingerprint;

/// Cache-store failure. Never surfaced to callers; the service degrades to
/// a miss.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CacheError {
    #[error("cache store unreachable: {0}")]
    Unavailable(String),
}

/// One memoized result page: record identifiers only (full records would
/// unbound memory), plus the total match count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedPage {
    pub ids: Vec<Uuid>,
    pub total: u64,
}

/// Counter snapshot for observability.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Entries rejected for an outdated site generation, on read or on
    /// arrival.
    pub stale: u64,
    pub insertions: u64,
    /// Operations dropped because the site's cache was disabled.
    pub disabled_drops: u64,
}

/// Memoizes search pages per `(site, plan fingerprint)`.
///
/// Invalidation is generational: `bump(site_id)` advances the site's
/// generation counter, which atomically invalidates every entry recorded
/// under an older generation without enumerating keys. `disable`/`enable`
/// force a site into always-miss while an invalidation is unconfirmed.
#[async_trait]
pub trait SearchCache: Send + Sync {
    /// Cached page for the key, if present, unexpired and current for the
    /// site's generation.
    ///
    /// # Errors
    ///
    /// [`CacheError::Unavailable`] when the store cannot be reached.
    async fn get(
        &self,
        site_id: Uuid,
        key: &PlanFingerprint,
    ) -> Result<Option<CachedPage>, CacheError>;

    /// The site's current generation counter.
    ///
    /// Callers snapshot this *before* executing the query and hand the
    /// value back to [`put`](SearchCache::put): a write landing while the
    /// query runs bumps past the snapshot, so the result is stale on
    /// arrival instead of being recorded as current.
    ///
    /// # Errors
    ///
    /// [`CacheError::Unavailable`] when the store cannot be reached.
    async fn generation(&self, site_id: Uuid) -> Result<u64, CacheError>;

    /// Store a page under `generation`, the site generation snapshotted
    /// before the page was computed. An entry whose generation is already
    /// outdated must never become servable.
    ///
    /// # Errors
    ///
    /// [`CacheError::Unavailable`] when the store cannot be reached.
    async fn put(
        &self,
        site_id: Uuid,
        key: &PlanFingerprint,
        generation: u64,
        page: CachedPage,
    ) -> Result<(), CacheError>;

    /// Advance the site's generation counter. O(1) per site, called on the
    /// commit path of every write.
    ///
    /// # Errors
    ///
    /// [`CacheError::Unavailable`] when the store cannot be reached; the
    /// caller then owes a retry (see [`crate::domain::invalidation`]).
    async fn bump(&self, site_id: Uuid) -> Result<(), CacheError>;

    /// Force the site into always-miss (drops `put`s too).
    async fn disable(&self, site_id: Uuid);

    /// Lift a [`disable`](SearchCache::disable).
    async fn enable(&self, site_id: Uuid);

    /// Counter snapshot.
    fn stats(&self) -> CacheStats;
}
