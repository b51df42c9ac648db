//! Repository port.

use async_trait::async_trait;
use uuid::Uuid;

use interactions_sdk::Interaction;
use sitelog_query::QueryPlan;

/// Storage-layer failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepoError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Persistent storage for interactions.
///
/// Every method takes the site scope as an explicit required argument; no
/// call can forget it. `find` re-asserts `site_id == plan.site_id()` as a
/// mandatory predicate of its own instead of trusting that the query
/// builder filtered correctly — the redundancy is the second layer of the
/// tenant-isolation defense.
#[async_trait]
pub trait InteractionsRepository: Send + Sync {
    /// Execute a plan; returns matching ids in rank/sort order for the
    /// planned page, plus the total match count.
    ///
    /// # Errors
    ///
    /// [`RepoError::Unavailable`] when storage cannot be reached.
    async fn find(&self, plan: &QueryPlan) -> Result<(Vec<Uuid>, u64), RepoError>;

    /// Fetch one record; `None` when absent or outside `site_id`.
    ///
    /// # Errors
    ///
    /// [`RepoError::Unavailable`] when storage cannot be reached.
    async fn get(&self, site_id: Uuid, id: Uuid) -> Result<Option<Interaction>, RepoError>;

    /// Fetch records by id, preserving input order and skipping ids that
    /// are absent or outside `site_id`.
    ///
    /// # Errors
    ///
    /// [`RepoError::Unavailable`] when storage cannot be reached.
    async fn get_many(&self, site_id: Uuid, ids: &[Uuid]) -> Result<Vec<Interaction>, RepoError>;

    /// Persist a new record as-is.
    ///
    /// # Errors
    ///
    /// [`RepoError::Unavailable`] when storage cannot be reached.
    async fn insert(&self, record: Interaction) -> Result<Interaction, RepoError>;

    /// Replace a record within `site_id`; `None` when absent or foreign.
    ///
    /// # Errors
    ///
    /// [`RepoError::Unavailable`] when storage cannot be reached.
    async fn update(
        &self,
        site_id: Uuid,
        record: Interaction,
    ) -> Result<Option<Interaction>, RepoError>;

    /// Delete a record within `site_id`; `false` when absent or foreign.
    ///
    /// # Errors
    ///
    /// [`RepoError::Unavailable`] when storage cannot be reached.
    async fn delete(&self, site_id: Uuid, id: Uuid) -> Result<bool, RepoError>;
}
