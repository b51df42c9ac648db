//! Module wiring.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use interactions_sdk::InteractionsClientV1;

use crate::config::InteractionsConfig;
use crate::domain::cache::{CacheStats, SearchCache};
use crate::domain::invalidation::{Invalidator, RetryPolicy};
use crate::domain::local_client::LocalInteractionsClient;
use crate::domain::ports::{EventPublisher, NoopEventPublisher};
use crate::domain::repos::InteractionsRepository;
use crate::domain::service::InteractionsService;
use crate::infra::memory::{InMemoryInteractionsRepository, InMemorySearchCache};

/// The assembled interactions module.
///
/// Owns the service, the cache and the shutdown token for background
/// invalidation retries. Consumers talk to the module through the SDK
/// client only.
pub struct InteractionsModule {
    client: Arc<dyn InteractionsClientV1>,
    svc: Arc<InteractionsService>,
    shutdown: CancellationToken,
}

impl InteractionsModule {
    #[must_use]
    pub fn builder() -> InteractionsModuleBuilder {
        InteractionsModuleBuilder::default()
    }

    /// The public SDK client.
    #[must_use]
    pub fn client(&self) -> Arc<dyn InteractionsClientV1> {
        Arc::clone(&self.client)
    }

    /// Result-cache counter snapshot.
    #[must_use]
    pub fn cache_stats(&self) -> CacheStats {
        self.svc.cache_stats()
    }

    /// Cancel background work (pending invalidation retries).
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }
}

/// Builder for [`InteractionsModule`]. Adapters default to the in-memory
/// stack, so `InteractionsModule::builder().build()` yields a working
/// module for demos and tests.
#[derive(Default)]
pub struct InteractionsModuleBuilder {
    config: InteractionsConfig,
    repo: Option<Arc<dyn InteractionsRepository>>,
    cache: Option<Arc<dyn SearchCache>>,
    events: Option<Arc<dyn EventPublisher>>,
}

impl InteractionsModuleBuilder {
    #[must_use]
    pub fn config(mut self, config: InteractionsConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn repository(mut self, repo: Arc<dyn InteractionsRepository>) -> Self {
        self.repo = Some(repo);
        self
    }

    #[must_use]
    pub fn cache(mut self, cache: Arc<dyn SearchCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    #[must_use]
    pub fn events(mut self, events: Arc<dyn EventPublisher>) -> Self {
        self.events = Some(events);
        self
    }

    #[must_use]
    pub fn build(self) -> InteractionsModule {
        let repo = self
            .repo
            .unwrap_or_else(|| Arc::new(InMemoryInteractionsRepository::new()));
        let cache = self
            .cache
            .unwrap_or_else(|| Arc::new(InMemorySearchCache::from_config(&self.config)));
        let events = self.events.unwrap_or_else(|| Arc::new(NoopEventPublisher));

        let shutdown = CancellationToken::new();
        let invalidator = Invalidator::new(
            Arc::clone(&cache),
            RetryPolicy::from_config(&self.config),
            shutdown.clone(),
        );
        let svc = Arc::new(InteractionsService::new(
            repo,
            cache,
            events,
            invalidator,
            self.config,
        ));
        let client = Arc::new(LocalInteractionsClient::new(Arc::clone(&svc)));

        InteractionsModule {
            client,
            svc,
            shutdown,
        }
    }
}
