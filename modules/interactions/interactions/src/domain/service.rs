//! The interactions domain service.
//!
//! One instance per process. All request-scoped state ([`SiteContext`],
//! principal) arrives as explicit arguments; the only shared state lives
//! behind the cache port.

use std::sync::Arc;

use serde_json::Value;
use time::OffsetDateTime;
use tracing::instrument;
use uuid::Uuid;

use interactions_sdk::{
    Interaction, InteractionPatch, InteractionSummary, NewInteraction, SearchPage,
};
use sitelog_auth::extract_principal;
use sitelog_query::{QueryLimits, QueryPlan, SearchRequest};
use sitelog_security::{Action, SiteContext, SiteSelector, guard, resolve_site_context};

use crate::config::InteractionsConfig;
use crate::domain::cache::{CachedPage, SearchCache};
use crate::domain::error::DomainError;
use crate::domain::events::InteractionEvent;
use crate::domain::invalidation::Invalidator;
use crate::domain::ports::EventPublisher;
use crate::domain::repos::InteractionsRepository;

/// Site-scoped authorization and search service.
pub struct InteractionsService {
    repo: Arc<dyn InteractionsRepository>,
    cache: Arc<dyn SearchCache>,
    events: Arc<dyn EventPublisher>,
    invalidator: Invalidator,
    config: InteractionsConfig,
    limits: QueryLimits,
}

impl InteractionsService {
    #[must_use]
    pub fn new(
        repo: Arc<dyn InteractionsRepository>,
        cache: Arc<dyn SearchCache>,
        events: Arc<dyn EventPublisher>,
        invalidator: Invalidator,
        config: InteractionsConfig,
    ) -> Self {
        let limits = config.query_limits();
        Self {
            repo,
            cache,
            events,
            invalidator,
            config,
            limits,
        }
    }

    /// Run the full authorization pipeline: claims extraction, site context
    /// resolution, guard.
    ///
    /// # Errors
    ///
    /// Claims failures, resolution failures and guard denials, in that
    /// order.
    #[instrument(skip(self, payload, selector), fields(action = %action))]
    pub fn authorize(
        &self,
        payload: &Value,
        selector: &SiteSelector,
        action: Action,
        resource_site_id: Option<Uuid>,
    ) -> Result<SiteContext, DomainError> {
        let principal = extract_principal(payload, OffsetDateTime::now_utc())?;
        let ctx = resolve_site_context(&principal, selector)?;
        guard::check(&ctx, action, resource_site_id)?;
        Ok(ctx)
    }

    /// Authorize and execute a search over the caller's site.
    ///
    /// # Errors
    ///
    /// Everything [`authorize`](Self::authorize) returns, plus invalid
    /// search input and `SearchTimeout`.
    #[instrument(skip(self, payload, selector, request))]
    pub async fn search(
        &self,
        payload: &Value,
        selector: &SiteSelector,
        request: &SearchRequest,
    ) -> Result<SearchPage, DomainError> {
        let ctx = self.authorize(payload, selector, Action::Read, None)?;
        let plan = QueryPlan::build(request, ctx.site_id, self.limits)?;

        let page = match self.cached_page(&plan).await {
            Some(page) => page,
            None => self.execute_and_memoize(&plan).await?,
        };

        let records = self.repo.get_many(plan.site_id(), &page.ids).await?;
        Ok(SearchPage {
            items: records.iter().map(InteractionSummary::from).collect(),
            total: page.total,
            page: plan.page(),
            page_size: plan.page_size(),
        })
    }

    /// Cache lookup. Fail-open: store trouble is logged and treated as a
    /// miss, never propagated — slow search beats wrong search.
    async fn cached_page(&self, plan: &QueryPlan) -> Option<CachedPage> {
        let key = plan.fingerprint();
        match self.cache.get(plan.site_id(), &key).await {
            Ok(hit) => hit,
            Err(e) => {
                tracing::warn!(site = %plan.site_id(), error = %e, "cache unreachable, degrading to miss");
                None
            }
        }
    }

    async fn execute_and_memoize(&self, plan: &QueryPlan) -> Result<CachedPage, DomainError> {
        // Snapshot the site generation before the query runs. A write
        // landing mid-query bumps past the snapshot, so the page is stale
        // on arrival at the cache instead of masking the write until TTL.
        let generation = match self.cache.generation(plan.site_id()).await {
            Ok(g) => Some(g),
            Err(e) => {
                tracing::warn!(site = %plan.site_id(), error = %e, "cache unreachable, skipping memoization");
                None
            }
        };

        let found = tokio::time::timeout(self.config.search_timeout(), self.repo.find(plan))
            .await
            .map_err(|_| {
                tracing::warn!(site = %plan.site_id(), "search exceeded its execution bound");
                DomainError::SearchTimeout
            })?;
        let (ids, total) = found?;

        let page = CachedPage { ids, total };
        if let Some(generation) = generation {
            let key = plan.fingerprint();
            if let Err(e) = self.cache.put(plan.site_id(), &key, generation, page.clone()).await {
                tracing::warn!(site = %plan.site_id(), error = %e, "cache populate failed, continuing");
            }
        }
        Ok(page)
    }

    /// Fetch one record within the context site.
    ///
    /// # Errors
    ///
    /// `NotFound` when absent or foreign; guard denial for the read.
    #[instrument(skip(self, ctx), fields(interaction_id = %id))]
    pub async fn get(&self, ctx: &SiteContext, id: Uuid) -> Result<Interaction, DomainError> {
        guard::check(ctx, Action::Read, None)?;
        let found = self.repo.get(ctx.site_id, id).await?;
        found.ok_or(DomainError::NotFound(id))
    }

    /// Create a record owned by the context site.
    ///
    /// The persisted `site_id` is forced to `ctx.site_id`; a differing value
    /// in the payload is discarded, not honored.
    ///
    /// # Errors
    ///
    /// Guard denial for viewer roles; `Validation` for invariant
    /// violations.
    #[instrument(skip(self, ctx, new), fields(subject = %new.subject))]
    pub async fn create(
        &self,
        ctx: &SiteContext,
        new: NewInteraction,
    ) -> Result<Interaction, DomainError> {
        guard::check(ctx, Action::Create, None)?;
        if let Some(claimed) = new.site_id
            && claimed != ctx.site_id
        {
            tracing::debug!(claimed = %claimed, "ignoring payload site_id, forcing context site");
        }
        self.validate_new(&new)?;

        let now = OffsetDateTime::now_utc();
        let record = Interaction {
            id: Uuid::now_v7(),
            site_id: ctx.site_id,
            subject: new.subject,
            kind: new.kind,
            lead: new.lead,
            starts_at: new.starts_at,
            ends_at: new.ends_at,
            timezone: new.timezone,
            location: new.location,
            description: new.description,
            notes: new.notes,
            created_by: ctx.user_id,
            created_at: now,
            updated_at: now,
        };

        let created = self.repo.insert(record).await?;
        self.invalidator.invalidate(ctx.site_id).await;
        self.events.publish(&InteractionEvent::Created {
            id: created.id,
            site_id: created.site_id,
            at: created.created_at,
        });

        tracing::info!(interaction_id = %created.id, "interaction created");
        Ok(created)
    }

    /// Patch a record within the context site.
    ///
    /// The owning site is immutable; the lookup is site-scoped, so a record
    /// on another site resolves to `NotFound` exactly like a missing one.
    ///
    /// # Errors
    ///
    /// Guard denial, `NotFound`, or `Validation`.
    #[instrument(skip(self, ctx, patch), fields(interaction_id = %id))]
    pub async fn update(
        &self,
        ctx: &SiteContext,
        id: Uuid,
        patch: InteractionPatch,
    ) -> Result<Interaction, DomainError> {
        guard::check(ctx, Action::Update, None)?;

        let found = self.repo.get(ctx.site_id, id).await?;
        let mut record = found.ok_or(DomainError::NotFound(id))?;
        apply_patch(&mut record, patch);
        self.validate_record(&record)?;
        record.updated_at = OffsetDateTime::now_utc();

        let updated = self.repo.update(ctx.site_id, record).await?;
        let updated = updated.ok_or(DomainError::NotFound(id))?;
        self.invalidator.invalidate(ctx.site_id).await;
        self.events.publish(&InteractionEvent::Updated {
            id: updated.id,
            site_id: updated.site_id,
            at: updated.updated_at,
        });

        tracing::info!("interaction updated");
        Ok(updated)
    }

    /// Delete a record within the context site.
    ///
    /// # Errors
    ///
    /// Guard denial, or `NotFound` when absent or foreign.
    #[instrument(skip(self, ctx), fields(interaction_id = %id))]
    pub async fn delete(&self, ctx: &SiteContext, id: Uuid) -> Result<(), DomainError> {
        guard::check(ctx, Action::Delete, None)?;

        let deleted = self.repo.delete(ctx.site_id, id).await?;
        if !deleted {
            return Err(DomainError::NotFound(id));
        }
        self.invalidator.invalidate(ctx.site_id).await;
        self.events.publish(&InteractionEvent::Deleted {
            id,
            site_id: ctx.site_id,
            at: OffsetDateTime::now_utc(),
        });

        tracing::info!("interaction deleted");
        Ok(())
    }

    /// Counter snapshot of the underlying result cache.
    #[must_use]
    pub fn cache_stats(&self) -> crate::domain::cache::CacheStats {
        self.cache.stats()
    }

    fn validate_new(&self, new: &NewInteraction) -> Result<(), DomainError> {
        self.validate_subject(&new.subject)?;
        validate_window(new.starts_at, new.ends_at)?;
        validate_timezone(&new.timezone)
    }

    fn validate_record(&self, record: &Interaction) -> Result<(), DomainError> {
        self.validate_subject(&record.subject)?;
        validate_window(record.starts_at, record.ends_at)?;
        validate_timezone(&record.timezone)
    }

    fn validate_subject(&self, subject: &str) -> Result<(), DomainError> {
        if subject.trim().is_empty() {
            return Err(DomainError::validation("subject", "must not be empty"));
        }
        if subject.len() > self.config.max_subject_length {
            return Err(DomainError::validation(
                "subject",
                format!("longer than {} characters", self.config.max_subject_length),
            ));
        }
        Ok(())
    }
}

fn validate_window(starts_at: OffsetDateTime, ends_at: OffsetDateTime) -> Result<(), DomainError> {
    if ends_at < starts_at {
        return Err(DomainError::validation("ends_at", "must not precede starts_at"));
    }
    Ok(())
}

fn validate_timezone(timezone: &str) -> Result<(), DomainError> {
    timezone
        .parse::<chrono_tz::Tz>()
        .map_err(|_| DomainError::validation("timezone", format!("unknown IANA zone `{timezone}`")))?;
    Ok(())
}

fn apply_patch(record: &mut Interaction, patch: InteractionPatch) {
    let InteractionPatch {
        subject,
        kind,
        lead,
        starts_at,
        ends_at,
        timezone,
        location,
        description,
        notes,
    } = patch;

    if let Some(subject) = subject {
        record.subject = subject;
    }
    if let Some(kind) = kind {
        record.kind = kind;
    }
    if let Some(lead) = lead {
        record.lead = lead;
    }
    if let Some(starts_at) = starts_at {
        record.starts_at = starts_at;
    }
    if let Some(ends_at) = ends_at {
        record.ends_at = ends_at;
    }
    if let Some(timezone) = timezone {
        record.timezone = timezone;
    }
    if let Some(location) = location {
        record.location = location;
    }
    if let Some(description) = description {
        record.description = description;
    }
    if let Some(notes) = notes {
        record.notes = notes;
    }
}
