//! Module configuration.
//!
//! All tunables are resolved once at process start and passed into
//! components as explicit values; nothing reads configuration mid-request.

use std::time::Duration;

use serde::Deserialize;

use sitelog_query::QueryLimits;

/// Tunables of the interactions module.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InteractionsConfig {
    /// Page size used when the caller supplies none.
    pub default_page_size: u32,
    /// Hard upper bound on the page size; larger requests are clamped.
    pub max_page_size: u32,
    /// Result-cache entry lifetime. Short by design: interaction data
    /// changes frequently.
    pub cache_ttl_seconds: u64,
    /// Bound on cached entries before insertion-order eviction kicks in.
    pub cache_max_entries: usize,
    /// Upper bound on query execution; an elapsed search surfaces as
    /// `SearchTimeout`.
    pub search_timeout_ms: u64,
    /// First backoff delay for a failed cache invalidation.
    pub invalidation_retry_base_ms: u64,
    /// Retry attempts before giving up with the site cache disabled.
    pub invalidation_retry_max_attempts: u32,
    /// Window after which an unconfirmed invalidation disables the site's
    /// cache, bounding staleness.
    pub invalidation_confirm_window_ms: u64,
    /// Longest accepted interaction subject.
    pub max_subject_length: usize,
}

impl Default for InteractionsConfig {
    fn default() -> Self {
        Self {
            default_page_size: 25,
            max_page_size: 100,
            cache_ttl_seconds: 120,
            cache_max_entries: 10_000,
            search_timeout_ms: 2_000,
            invalidation_retry_base_ms: 50,
            invalidation_retry_max_attempts: 8,
            invalidation_confirm_window_ms: 1_000,
            max_subject_length: 200,
        }
    }
}

impl InteractionsConfig {
    #[must_use]
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_seconds)
    }

    #[must_use]
    pub fn search_timeout(&self) -> Duration {
        Duration::from_millis(self.search_timeout_ms)
    }

    #[must_use]
    pub fn invalidation_retry_base(&self) -> Duration {
        Duration::from_millis(self.invalidation_retry_base_ms)
    }

    #[must_use]
    pub fn invalidation_confirm_window(&self) -> Duration {
        Duration::from_millis(self.invalidation_confirm_window_ms)
    }

    #[must_use]
    pub fn query_limits(&self) -> QueryLimits {
        QueryLimits {
            default_page_size: self.default_page_size,
            max_page_size: self.max_page_size,
        }
    }
}
