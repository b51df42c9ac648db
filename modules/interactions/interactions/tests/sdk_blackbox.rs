#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Blackbox tests against the SDK client, exercising the full pipeline:
//! claims extraction, site context resolution, guard, query planning,
//! result cache and repository.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use interactions::domain::{
    CacheError, CacheStats, CachedPage, InteractionsRepository, RepoError, SearchCache,
};
use interactions::infra::memory::InMemoryInteractionsRepository;
use interactions::test_support::{ctx, expired_payload, new_interaction, token_payload};
use interactions::{InteractionsConfig, InteractionsModule};
use interactions_sdk::{Interaction, InteractionsClientV1, InteractionsError};
use sitelog_query::{FieldFilter, FilterOp, PlanFingerprint, QueryPlan, SearchRequest, Sort, SortDirection};
use sitelog_security::{Action, Role, SiteSelector};

fn module() -> InteractionsModule {
    InteractionsModule::builder().build()
}

#[tokio::test]
async fn multi_site_principal_without_indicator_needs_context() {
    let client = module().client();
    let payload = token_payload(
        Uuid::new_v4(),
        &[(Uuid::new_v4(), Role::Admin), (Uuid::new_v4(), Role::Viewer)],
    );

    let err = client
        .authorize(&payload, SiteSelector::none(), Action::Read, None)
        .await
        .unwrap_err();
    assert_eq!(err, InteractionsError::SiteContextRequired);
    assert_eq!(err.public_message(), "not authorized");
}

#[tokio::test]
async fn single_site_principal_defaults_to_its_site() {
    let client = module().client();
    let site = Uuid::new_v4();
    let payload = token_payload(Uuid::new_v4(), &[(site, Role::Editor)]);

    let resolved = client
        .authorize(&payload, SiteSelector::none(), Action::Read, None)
        .await
        .unwrap();
    assert_eq!(resolved.site_id, site);
    assert_eq!(resolved.role, Role::Editor);
}

#[tokio::test]
async fn expired_token_is_unauthenticated() {
    let client = module().client();
    let err = client
        .authorize(
            &expired_payload(Uuid::new_v4(), Uuid::new_v4()),
            SiteSelector::none(),
            Action::Read,
            None,
        )
        .await
        .unwrap_err();
    assert_eq!(err, InteractionsError::TokenExpired);
    assert_eq!(err.public_message(), "unauthenticated");
}

#[tokio::test]
async fn cross_site_update_is_indistinguishable_from_missing() {
    let client = module().client();
    let site_a = Uuid::new_v4();
    let site_b = Uuid::new_v4();

    let foreign = client
        .create(ctx(site_b, Role::Admin), new_interaction("their record"))
        .await
        .unwrap();

    let patch = interactions_sdk::InteractionPatch {
        subject: Some("hijack".to_owned()),
        ..interactions_sdk::InteractionPatch::default()
    };
    let cross_site = client
        .update(ctx(site_a, Role::Admin), foreign.id, patch.clone())
        .await
        .unwrap_err();
    let missing = client
        .update(ctx(site_a, Role::Admin), Uuid::new_v4(), patch)
        .await
        .unwrap_err();

    assert!(matches!(cross_site, InteractionsError::NotFound(_)));
    assert!(matches!(missing, InteractionsError::NotFound(_)));
    assert_eq!(cross_site.public_message(), missing.public_message());
}

#[tokio::test]
async fn create_forces_the_context_site() {
    let client = module().client();
    let site = Uuid::new_v4();

    let mut new = new_interaction("kickoff");
    new.site_id = Some(Uuid::new_v4()); // crafted payload claiming another site

    let created = client.create(ctx(site, Role::Editor), new).await.unwrap();
    assert_eq!(created.site_id, site);

    let fetched = client.get(ctx(site, Role::Viewer), created.id).await.unwrap();
    assert_eq!(fetched.site_id, site);
}

#[tokio::test]
async fn viewer_role_cannot_create() {
    let client = module().client();
    let err = client
        .create(ctx(Uuid::new_v4(), Role::Viewer), new_interaction("nope"))
        .await
        .unwrap_err();
    assert_eq!(err, InteractionsError::SiteAccessDenied);
}

#[tokio::test]
async fn search_is_isolated_per_site() {
    let client = module().client();
    let site_with_matches = Uuid::new_v4();
    let scoped_site = Uuid::new_v4();

    for subject in ["Quarterly kickoff", "Kickoff retro"] {
        client
            .create(ctx(site_with_matches, Role::Editor), new_interaction(subject))
            .await
            .unwrap();
    }
    client
        .create(ctx(scoped_site, Role::Editor), new_interaction("Budget review"))
        .await
        .unwrap();

    let payload = token_payload(Uuid::new_v4(), &[(scoped_site, Role::Viewer)]);
    let page = client
        .search(&payload, SiteSelector::none(), SearchRequest::text("kickoff"))
        .await
        .unwrap();

    // Matches exist globally; none leak into this site's scope.
    assert_eq!(page.total, 0);
    assert!(page.items.is_empty());
}

#[tokio::test]
async fn forged_site_filter_cannot_widen_the_scope() {
    let client = module().client();
    let own_site = Uuid::new_v4();
    let other_site = Uuid::new_v4();

    client
        .create(ctx(other_site, Role::Editor), new_interaction("Secret sync"))
        .await
        .unwrap();
    client
        .create(ctx(own_site, Role::Editor), new_interaction("Open sync"))
        .await
        .unwrap();

    let payload = token_payload(Uuid::new_v4(), &[(own_site, Role::Viewer)]);
    let request = SearchRequest {
        filters: vec![FieldFilter {
            field: "site_id".to_owned(),
            op: FilterOp::Eq,
            value: other_site.to_string(),
        }],
        ..SearchRequest::default()
    };
    let page = client
        .search(&payload, SiteSelector::none(), request)
        .await
        .unwrap();

    assert_eq!(page.total, 1);
    assert!(page.items.iter().all(|item| item.site_id == own_site));
}

#[tokio::test]
async fn read_after_write_sees_the_write() {
    let module = module();
    let client = module.client();
    let site = Uuid::new_v4();
    let payload = token_payload(Uuid::new_v4(), &[(site, Role::Editor)]);

    client
        .create(ctx(site, Role::Editor), new_interaction("Kickoff one"))
        .await
        .unwrap();
    let before = client
        .search(&payload, SiteSelector::none(), SearchRequest::text("kickoff"))
        .await
        .unwrap();
    assert_eq!(before.total, 1);

    client
        .create(ctx(site, Role::Editor), new_interaction("Kickoff two"))
        .await
        .unwrap();
    let after = client
        .search(&payload, SiteSelector::none(), SearchRequest::text("kickoff"))
        .await
        .unwrap();

    // The write bumped the site generation, so the cached page from the
    // first search cannot be served stale.
    assert_eq!(after.total, 2);
}

#[tokio::test]
async fn repeated_search_is_idempotent_and_served_from_cache() {
    let module = module();
    let client = module.client();
    let site = Uuid::new_v4();
    let payload = token_payload(Uuid::new_v4(), &[(site, Role::Viewer)]);

    let editor = ctx(site, Role::Editor);
    for subject in ["Kickoff", "Kickoff planning", "Retro"] {
        client.create(editor, new_interaction(subject)).await.unwrap();
    }

    let first = client
        .search(&payload, SiteSelector::none(), SearchRequest::text("kickoff"))
        .await
        .unwrap();
    let second = client
        .search(&payload, SiteSelector::none(), SearchRequest::text("kickoff"))
        .await
        .unwrap();

    assert_eq!(first, second);
    let stats = module.cache_stats();
    assert!(stats.hits >= 1, "second search should hit: {stats:?}");
}

#[tokio::test]
async fn pages_partition_the_result_set() {
    let client = module().client();
    let site = Uuid::new_v4();
    let payload = token_payload(Uuid::new_v4(), &[(site, Role::Viewer)]);
    let editor = ctx(site, Role::Editor);

    for n in 0..7 {
        client
            .create(editor, new_interaction(&format!("Session {n}")))
            .await
            .unwrap();
    }

    let mut seen = HashSet::new();
    for page_no in 1..=3 {
        let request = SearchRequest {
            sort: Some(Sort {
                field: "subject".to_owned(),
                direction: SortDirection::Asc,
            }),
            page: Some(page_no),
            page_size: Some(3),
            ..SearchRequest::default()
        };
        let page = client
            .search(&payload, SiteSelector::none(), request)
            .await
            .unwrap();
        assert_eq!(page.total, 7);
        for item in page.items {
            assert!(seen.insert(item.id), "page overlap at {}", item.subject);
        }
    }
    assert_eq!(seen.len(), 7);
}

#[tokio::test]
async fn oversized_page_size_is_clamped_and_echoed() {
    let client = module().client();
    let site = Uuid::new_v4();
    let payload = token_payload(Uuid::new_v4(), &[(site, Role::Viewer)]);

    let request = SearchRequest {
        page_size: Some(5_000),
        ..SearchRequest::default()
    };
    let page = client
        .search(&payload, SiteSelector::none(), request)
        .await
        .unwrap();

    assert_eq!(page.page_size, 100);
    assert_eq!(page.page, 1);
}

#[tokio::test]
async fn invalid_search_input_is_described_precisely() {
    let client = module().client();
    let payload = token_payload(Uuid::new_v4(), &[(Uuid::new_v4(), Role::Viewer)]);

    let request = SearchRequest {
        filters: vec![FieldFilter {
            field: "notes".to_owned(),
            op: FilterOp::Eq,
            value: "x".to_owned(),
        }],
        ..SearchRequest::default()
    };
    let err = client
        .search(&payload, SiteSelector::none(), request)
        .await
        .unwrap_err();

    assert_eq!(
        err,
        InteractionsError::InvalidSearchInput("unknown filter field `notes`".to_owned())
    );
}

#[tokio::test]
async fn slow_search_times_out_and_is_retryable() {
    let module = InteractionsModule::builder()
        .config(InteractionsConfig {
            search_timeout_ms: 10,
            ..InteractionsConfig::default()
        })
        .repository(Arc::new(InMemoryInteractionsRepository::with_find_delay(
            Duration::from_millis(200),
        )))
        .build();
    let client = module.client();
    let payload = token_payload(Uuid::new_v4(), &[(Uuid::new_v4(), Role::Viewer)]);

    let err = client
        .search(&payload, SiteSelector::none(), SearchRequest::all())
        .await
        .unwrap_err();
    assert_eq!(err, InteractionsError::SearchTimeout);
    assert!(err.is_retryable());
    assert_eq!(err.public_message(), "search unavailable, try again");
}

/// Delegates to the in-memory store but holds `find` results for `delay`
/// before returning, opening the window between query execution and cache
/// population.
struct HeldFindRepository {
    inner: InMemoryInteractionsRepository,
    delay: Duration,
}

#[async_trait]
impl InteractionsRepository for HeldFindRepository {
    async fn find(&self, plan: &QueryPlan) -> Result<(Vec<Uuid>, u64), RepoError> {
        let found = self.inner.find(plan).await;
        tokio::time::sleep(self.delay).await;
        found
    }

    async fn get(&self, site_id: Uuid, id: Uuid) -> Result<Option<Interaction>, RepoError> {
        self.inner.get(site_id, id).await
    }

    async fn get_many(&self, site_id: Uuid, ids: &[Uuid]) -> Result<Vec<Interaction>, RepoError> {
        self.inner.get_many(site_id, ids).await
    }

    async fn insert(&self, record: Interaction) -> Result<Interaction, RepoError> {
        self.inner.insert(record).await
    }

    async fn update(
        &self,
        site_id: Uuid,
        record: Interaction,
    ) -> Result<Option<Interaction>, RepoError> {
        self.inner.update(site_id, record).await
    }

    async fn delete(&self, site_id: Uuid, id: Uuid) -> Result<bool, RepoError> {
        self.inner.delete(site_id, id).await
    }
}

#[tokio::test]
async fn write_racing_a_search_cannot_pin_a_stale_page() {
    let module = InteractionsModule::builder()
        .repository(Arc::new(HeldFindRepository {
            inner: InMemoryInteractionsRepository::new(),
            delay: Duration::from_millis(300),
        }))
        .build();
    let client = module.client();
    let site = Uuid::new_v4();
    let payload = token_payload(Uuid::new_v4(), &[(site, Role::Editor)]);

    client
        .create(ctx(site, Role::Editor), new_interaction("Kickoff one"))
        .await
        .unwrap();

    // This search computes its page before the second write commits but
    // only finishes, and reaches the cache, after it.
    let racing = {
        let client = Arc::clone(&client);
        let payload = payload.clone();
        tokio::spawn(async move {
            client
                .search(&payload, SiteSelector::none(), SearchRequest::text("kickoff"))
                .await
        })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;
    client
        .create(ctx(site, Role::Editor), new_interaction("Kickoff two"))
        .await
        .unwrap();

    let pre_write = racing.await.unwrap().unwrap();
    assert_eq!(pre_write.total, 1);

    // The racing search's page predates the write and must not have been
    // memoized as current.
    let fresh = client
        .search(&payload, SiteSelector::none(), SearchRequest::text("kickoff"))
        .await
        .unwrap();
    assert_eq!(fresh.total, 2, "read after write served a stale cached page");
}

/// Store where every data-path operation fails. The bump path stays up so
/// writes do not spill retry noise into the test.
struct UnreachableCacheStore;

#[async_trait]
impl SearchCache for UnreachableCacheStore {
    async fn get(
        &self,
        _site_id: Uuid,
        _key: &PlanFingerprint,
    ) -> Result<Option<CachedPage>, CacheError> {
        Err(CacheError::Unavailable("injected".to_owned()))
    }

    async fn generation(&self, _site_id: Uuid) -> Result<u64, CacheError> {
        Err(CacheError::Unavailable("injected".to_owned()))
    }

    async fn put(
        &self,
        _site_id: Uuid,
        _key: &PlanFingerprint,
        _generation: u64,
        _page: CachedPage,
    ) -> Result<(), CacheError> {
        Err(CacheError::Unavailable("injected".to_owned()))
    }

    async fn bump(&self, _site_id: Uuid) -> Result<(), CacheError> {
        Ok(())
    }

    async fn disable(&self, _site_id: Uuid) {}

    async fn enable(&self, _site_id: Uuid) {}

    fn stats(&self) -> CacheStats {
        CacheStats::default()
    }
}

#[tokio::test]
async fn unreachable_cache_degrades_to_misses_not_failures() {
    let module = InteractionsModule::builder()
        .cache(Arc::new(UnreachableCacheStore))
        .build();
    let client = module.client();
    let site = Uuid::new_v4();
    let payload = token_payload(Uuid::new_v4(), &[(site, Role::Editor)]);
    let editor = ctx(site, Role::Editor);

    client.create(editor, new_interaction("Kickoff")).await.unwrap();
    let first = client
        .search(&payload, SiteSelector::none(), SearchRequest::text("kickoff"))
        .await
        .unwrap();
    assert_eq!(first.total, 1);

    // Still correct across a write: every search runs uncached.
    client.create(editor, new_interaction("Kickoff two")).await.unwrap();
    let second = client
        .search(&payload, SiteSelector::none(), SearchRequest::text("kickoff"))
        .await
        .unwrap();
    assert_eq!(second.total, 2);
}

#[tokio::test]
async fn update_invariants_hold_after_patch() {
    let client = module().client();
    let site = Uuid::new_v4();
    let editor = ctx(site, Role::Editor);

    let created = client.create(editor, new_interaction("Kickoff")).await.unwrap();

    // ends_at before starts_at must be rejected.
    let bad = interactions_sdk::InteractionPatch {
        ends_at: Some(created.starts_at - time::Duration::hours(1)),
        ..interactions_sdk::InteractionPatch::default()
    };
    let err = client.update(editor, created.id, bad).await.unwrap_err();
    assert!(matches!(err, InteractionsError::Validation { .. }));

    let good = interactions_sdk::InteractionPatch {
        subject: Some("Kickoff (moved)".to_owned()),
        ..interactions_sdk::InteractionPatch::default()
    };
    let updated = client.update(editor, created.id, good).await.unwrap();
    assert_eq!(updated.subject, "Kickoff (moved)");
    assert_eq!(updated.site_id, site);
}

#[tokio::test]
async fn delete_then_search_observes_the_deletion() {
    let client = module().client();
    let site = Uuid::new_v4();
    let payload = token_payload(Uuid::new_v4(), &[(site, Role::Editor)]);
    let editor = ctx(site, Role::Editor);

    let created = client.create(editor, new_interaction("Kickoff")).await.unwrap();
    let before = client
        .search(&payload, SiteSelector::none(), SearchRequest::text("kickoff"))
        .await
        .unwrap();
    assert_eq!(before.total, 1);

    client.delete(editor, created.id).await.unwrap();
    let after = client
        .search(&payload, SiteSelector::none(), SearchRequest::text("kickoff"))
        .await
        .unwrap();
    assert_eq!(after.total, 0);

    let err = client.delete(editor, created.id).await.unwrap_err();
    assert!(matches!(err, InteractionsError::NotFound(_)));
}
