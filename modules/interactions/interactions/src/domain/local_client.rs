//! Local (in-process) client for the interactions module.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use interactions_sdk::{
    Interaction, InteractionPatch, InteractionsClientV1, InteractionsError, NewInteraction,
    SearchPage,
};
use sitelog_query::SearchRequest;
use sitelog_security::{Action, SiteContext, SiteSelector};

use crate::domain::error::DomainError;
use crate::domain::service::InteractionsService;

/// Local client wrapping the domain service.
///
/// Handed to consumers by [`crate::module::InteractionsModule`].
pub struct LocalInteractionsClient {
    svc: Arc<InteractionsService>,
}

impl LocalInteractionsClient {
    #[must_use]
    pub fn new(svc: Arc<InteractionsService>) -> Self {
        Self { svc }
    }
}

fn log_and_convert(op: &str, e: DomainError) -> InteractionsError {
    tracing::debug!(operation = op, error = %e, "interactions call failed");
    e.into()
}

#[async_trait]
impl InteractionsClientV1 for LocalInteractionsClient {
    async fn authorize(
        &self,
        payload: &Value,
        selector: SiteSelector,
        action: Action,
        resource_site_id: Option<Uuid>,
    ) -> Result<SiteContext, InteractionsError> {
        self.svc
            .authorize(payload, &selector, action, resource_site_id)
            .map_err(|e| log_and_convert("authorize", e))
    }

    async fn search(
        &self,
        payload: &Value,
        selector: SiteSelector,
        request: SearchRequest,
    ) -> Result<SearchPage, InteractionsError> {
        self.svc
            .search(payload, &selector, &request)
            .await
            .map_err(|e| log_and_convert("search", e))
    }

    async fn get(&self, ctx: SiteContext, id: Uuid) -> Result<Interaction, InteractionsError> {
        self.svc
            .get(&ctx, id)
            .await
            .map_err(|e| log_and_convert("get", e))
    }

    async fn create(
        &self,
        ctx: SiteContext,
        new: NewInteraction,
    ) -> Result<Interaction, InteractionsError> {
        self.svc
            .create(&ctx, new)
            .await
            .map_err(|e| log_and_convert("create", e))
    }

    async fn update(
        &self,
        ctx: SiteContext,
        id: Uuid,
        patch: InteractionPatch,
    ) -> Result<Interaction, InteractionsError> {
        self.svc
            .update(&ctx, id, patch)
            .await
            .map_err(|e| log_and_convert("update", e))
    }

    async fn delete(&self, ctx: SiteContext, id: Uuid) -> Result<(), InteractionsError> {
        self.svc
            .delete(&ctx, id)
            .await
            .map_err(|e| log_and_convert("delete", e))
    }
}
