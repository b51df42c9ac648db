//! Versioned public API trait of the interactions module.

use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use sitelog_query::SearchRequest;
use sitelog_security::{Action, SiteContext, SiteSelector};

use crate::error::InteractionsError;
use crate::models::{Interaction, InteractionPatch, NewInteraction, SearchPage};

/// Public client contract, v1.
///
/// `authorize` and `search` take the verified token payload directly and
/// run the full pipeline (claims extraction, site context resolution,
/// guard). The CRUD methods take the already-resolved [`SiteContext`], so a
/// controller authorizes once and then threads the context explicitly.
#[async_trait]
pub trait InteractionsClientV1: Send + Sync {
    /// Resolve and authorize a request. Consumed by every CRUD endpoint
    /// before touching data.
    ///
    /// # Errors
    ///
    /// Authentication failures (`TokenMalformed`, `TokenExpired`) and
    /// authorization failures (`AmbiguousSiteContext`,
    /// `SiteContextRequired`, `SiteAccessDenied`).
    async fn authorize(
        &self,
        payload: &Value,
        selector: SiteSelector,
        action: Action,
        resource_site_id: Option<Uuid>,
    ) -> Result<SiteContext, InteractionsError>;

    /// Free-text and structured search over the caller's site.
    ///
    /// # Errors
    ///
    /// Everything `authorize` can return, plus `InvalidSearchInput` and
    /// `SearchTimeout`.
    async fn search(
        &self,
        payload: &Value,
        selector: SiteSelector,
        request: SearchRequest,
    ) -> Result<SearchPage, InteractionsError>;

    /// Fetch one record within the context site.
    ///
    /// # Errors
    ///
    /// `NotFound` when the record is absent or belongs to another site.
    async fn get(&self, ctx: SiteContext, id: Uuid) -> Result<Interaction, InteractionsError>;

    /// Create a record. The persisted `site_id` is always `ctx.site_id`;
    /// any value in the payload is ignored.
    ///
    /// # Errors
    ///
    /// `SiteAccessDenied` for viewer roles and `Validation` for payloads
    /// violating the record invariants.
    async fn create(
        &self,
        ctx: SiteContext,
        new: NewInteraction,
    ) -> Result<Interaction, InteractionsError>;

    /// Patch a record within the context site.
    ///
    /// # Errors
    ///
    /// `NotFound` when absent or foreign, `SiteAccessDenied` for viewer
    /// roles, `Validation` for invariant violations.
    async fn update(
        &self,
        ctx: SiteContext,
        id: Uuid,
        patch: InteractionPatch,
    ) -> Result<Interaction, InteractionsError>;

    /// Delete a record within the context site.
    ///
    /// # Errors
    ///
    /// `NotFound` when absent or foreign, `SiteAccessDenied` for viewer
    /// roles.
    async fn delete(&self, ctx: SiteContext, id: Uuid) -> Result<(), InteractionsError>;
}
