//! Write-path cache invalidation with bounded-staleness retry.
//!
//! The happy path is synchronous: a write bumps the site generation before
//! returning, which gives read-after-write consistency per site. When the
//! bump fails, a background task retries with exponential backoff; once the
//! confirmation window passes without success the site's cache is disabled
//! (forced miss) so staleness stays bounded, and it is re-enabled only
//! after a retry succeeds.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::config::InteractionsConfig;
use crate::domain::cache::SearchCache;

/// Backoff parameters for unconfirmed invalidations.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub base: Duration,
    pub max_attempts: u32,
    pub confirm_window: Duration,
}

impl RetryPolicy {
    #[must_use]
    pub fn from_config(config: &InteractionsConfig) -> Self {
        Self {
            base: config.invalidation_retry_base(),
            max_attempts: config.invalidation_retry_max_attempts,
            confirm_window: config.invalidation_confirm_window(),
        }
    }
}

/// Owns the invalidation protocol for one cache instance.
#[derive(Clone)]
pub struct Invalidator {
    cache: Arc<dyn SearchCache>,
    policy: RetryPolicy,
    shutdown: CancellationToken,
}

impl Invalidator {
    #[must_use]
    pub fn new(cache: Arc<dyn SearchCache>, policy: RetryPolicy, shutdown: CancellationToken) -> Self {
        Self {
            cache,
            policy,
            shutdown,
        }
    }

    /// Invalidate `site_id` after a successful write.
    ///
    /// Awaits the synchronous bump; on failure schedules the background
    /// retry and returns. The write itself is already committed, so this
    /// never propagates an error to the caller.
    pub async fn invalidate(&self, site_id: Uuid) {
        match self.cache.bump(site_id).await {
            Ok(()) => {}
            Err(e) => {
                tracing::warn!(site = %site_id, error = %e, "cache invalidation failed, scheduling retry");
                let cache = Arc::clone(&self.cache);
                let policy = self.policy;
                let shutdown = self.shutdown.clone();
                tokio::spawn(async move {
                    retry_until_confirmed(cache, policy, shutdown, site_id).await;
                });
            }
        }
    }
}

async fn retry_until_confirmed(
    cache: Arc<dyn SearchCache>,
    policy: RetryPolicy,
    shutdown: CancellationToken,
    site_id: Uuid,
) {
    let started = Instant::now();
    let mut delay = policy.base;
    let mut disabled = false;

    for attempt in 1..=policy.max_attempts {
        tokio::select! {
            () = shutdown.cancelled() => return,
            () = tokio::time::sleep(delay) => {}
        }

        if !disabled && started.elapsed() >= policy.confirm_window {
            // Staleness bound reached: force the site to always-miss until
            // an invalidation goes through.
            cache.disable(site_id).await;
            disabled = true;
            tracing::warn!(site = %site_id, "invalidation unconfirmed past window, site cache disabled");
        }

        match cache.bump(site_id).await {
            Ok(()) => {
                if disabled {
                    cache.enable(site_id).await;
                    if let Err(e) = cache.bump(site_id).await {
                        tracing::warn!(site = %site_id, error = %e, "post-enable bump failed");
                    }
                }
                tracing::info!(site = %site_id, attempt, "cache invalidation confirmed");
                return;
            }
            Err(e) => {
                tracing::warn!(site = %site_id, attempt, error = %e, "cache invalidation retry failed");
            }
        }

        delay = delay.saturating_mul(2);
    }

    if !disabled {
        cache.disable(site_id).await;
    }
    tracing::error!(site = %site_id, "cache invalidation attempts exhausted, site cache stays disabled");
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    #![allow(clippy::unwrap_used)]

    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU64, Ordering};

    use sitelog_query::PlanFingerprint;

    use super::*;
    use crate::domain::cache::{CacheError, CacheStats, CachedPage};

    /// Cache whose `bump` fails a configured number of times.
    struct FlakyCache {
        failures_left: AtomicU64,
        bumps: AtomicU64,
        disables: AtomicU64,
        enables: AtomicU64,
    }

    impl FlakyCache {
        fn failing(n: u64) -> Arc<Self> {
            Arc::new(Self {
                failures_left: AtomicU64::new(n),
                bumps: AtomicU64::new(0),
                disables: AtomicU64::new(0),
                enables: AtomicU64::new(0),
            })
        }
    }

    #[async_trait]
    impl SearchCache for FlakyCache {
        async fn get(
            &self,
            _site_id: Uuid,
            _key: &PlanFingerprint,
        ) -> Result<Option<CachedPage>, CacheError> {
            Ok(None)
        }

        async fn generation(&self, _site_id: Uuid) -> Result<u64, CacheError> {
            Ok(0)
        }

        async fn put(
            &self,
            _site_id: Uuid,
            _key: &PlanFingerprint,
            _generation: u64,
            _page: CachedPage,
        ) -> Result<(), CacheError> {
            Ok(())
        }

        async fn bump(&self, _site_id: Uuid) -> Result<(), CacheError> {
            if self
                .failures_left
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
            {
                return Err(CacheError::Unavailable("injected".to_owned()));
            }
            self.bumps.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn disable(&self, _site_id: Uuid) {
            self.disables.fetch_add(1, Ordering::SeqCst);
        }

        async fn enable(&self, _site_id: Uuid) {
            self.enables.fetch_add(1, Ordering::SeqCst);
        }

        fn stats(&self) -> CacheStats {
            CacheStats::default()
        }
    }

    fn policy() -> RetryPolicy {
        RetryPolicy {
            base: Duration::from_millis(1),
            max_attempts: 5,
            confirm_window: Duration::from_millis(0),
        }
    }

    #[tokio::test]
    async fn retry_confirms_and_reenables() {
        let cache = FlakyCache::failing(2);
        retry_until_confirmed(
            Arc::clone(&cache) as Arc<dyn SearchCache>,
            policy(),
            CancellationToken::new(),
            Uuid::new_v4(),
        )
        .await;

        // Zero confirm window: disabled on the first retry tick, re-enabled
        // once the bump goes through, then bumped again.
        assert_eq!(cache.disables.load(Ordering::SeqCst), 1);
        assert_eq!(cache.enables.load(Ordering::SeqCst), 1);
        assert!(cache.bumps.load(Ordering::SeqCst) >= 2);
    }

    #[tokio::test]
    async fn exhausted_retries_leave_site_disabled() {
        let cache = FlakyCache::failing(100);
        retry_until_confirmed(
            Arc::clone(&cache) as Arc<dyn SearchCache>,
            policy(),
            CancellationToken::new(),
            Uuid::new_v4(),
        )
        .await;

        assert!(cache.disables.load(Ordering::SeqCst) >= 1);
        assert_eq!(cache.enables.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn successful_bump_requires_no_retry() {
        let cache = FlakyCache::failing(0);
        let invalidator = Invalidator::new(
            Arc::clone(&cache) as Arc<dyn SearchCache>,
            policy(),
            CancellationToken::new(),
        );
        invalidator.invalidate(Uuid::new_v4()).await;

        assert_eq!(cache.bumps.load(Ordering::SeqCst), 1);
        assert_eq!(cache.disables.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn shutdown_cancels_pending_retry() {
        let cache = FlakyCache::failing(100);
        let shutdown = CancellationToken::new();
        shutdown.cancel();
        retry_until_confirmed(
            Arc::clone(&cache) as Arc<dyn SearchCache>,
            policy(),
            shutdown,
            Uuid::new_v4(),
        )
        .await;

        assert_eq!(cache.bumps.load(Ordering::SeqCst), 0);
    }
}
