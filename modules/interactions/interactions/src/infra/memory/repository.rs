//! In-memory repository: the reference query-plan executor.

use std::cmp::Ordering;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

use interactions_sdk::Interaction;
use sitelog_query::{
    BoundFilter, FilterField, FilterOp, FilterValue, MatchRank, QueryPlan, SortDirection,
    SortField, SortSpec, text,
};

use crate::domain::repos::{InteractionsRepository, RepoError};

/// Map-backed repository.
///
/// `find` evaluates the plan exactly as a SQL adapter would: site predicate
/// first, then field filters (AND), then text match with phrase-over-
/// scattered ranking, then sort and pagination.
#[derive(Default)]
pub struct InMemoryInteractionsRepository {
    records: DashMap<Uuid, Interaction>,
    find_delay: Option<Duration>,
}

impl InMemoryInteractionsRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Artificial `find` latency, for exercising the search timeout.
    #[must_use]
    pub fn with_find_delay(delay: Duration) -> Self {
        Self {
            records: DashMap::new(),
            find_delay: Some(delay),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn to_usize(n: u64) -> usize {
    usize::try_from(n).unwrap_or(usize::MAX)
}

fn projection(record: &Interaction) -> String {
    text::project([
        record.subject.as_str(),
        record.lead.as_str(),
        record.location.as_str(),
        record.description.as_str(),
        record.notes.as_str(),
    ])
}

fn text_matches(raw: &str, op: FilterOp, value: &str) -> bool {
    let normalized = text::normalize(raw);
    match op {
        FilterOp::Eq => normalized == value,
        FilterOp::Prefix => normalized.starts_with(value),
        FilterOp::Gte | FilterOp::Lte => false,
    }
}

fn time_matches(actual: time::OffsetDateTime, op: FilterOp, bound: time::OffsetDateTime) -> bool {
    match op {
        FilterOp::Gte => actual >= bound,
        FilterOp::Lte => actual <= bound,
        FilterOp::Eq | FilterOp::Prefix => false,
    }
}

fn filter_matches(record: &Interaction, filter: &BoundFilter) -> bool {
    match (filter.field, &filter.value) {
        (FilterField::Kind, FilterValue::Text(v)) => record.kind.as_str() == v,
        (FilterField::Lead, FilterValue::Text(v)) => text_matches(&record.lead, filter.op, v),
        (FilterField::Location, FilterValue::Text(v)) => {
            text_matches(&record.location, filter.op, v)
        }
        (FilterField::Subject, FilterValue::Text(v)) => {
            text_matches(&record.subject, filter.op, v)
        }
        (FilterField::StartsAt, FilterValue::Time(t)) => {
            time_matches(record.starts_at, filter.op, *t)
        }
        (FilterField::CreatedAt, FilterValue::Time(t)) => {
            time_matches(record.created_at, filter.op, *t)
        }
        // The planner cannot build these shapes.
        _ => false,
    }
}

fn sort_cmp(a: &Interaction, b: &Interaction, sort: SortSpec) -> Ordering {
    let ord = match sort.field {
        SortField::StartsAt => a.starts_at.cmp(&b.starts_at),
        SortField::CreatedAt => a.created_at.cmp(&b.created_at),
        SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        SortField::Subject => text::normalize(&a.subject).cmp(&text::normalize(&b.subject)),
        SortField::Lead => text::normalize(&a.lead).cmp(&text::normalize(&b.lead)),
    };
    let ord = match sort.direction {
        SortDirection::Asc => ord,
        SortDirection::Desc => ord.reverse(),
    };
    // Deterministic pagination needs a total order.
    ord.then_with(|| a.id.cmp(&b.id))
}

#[async_trait]
impl InteractionsRepository for InMemoryInteractionsRepository {
    async fn find(&self, plan: &QueryPlan) -> Result<(Vec<Uuid>, u64), RepoError> {
        if let Some(delay) = self.find_delay {
            tokio::time::sleep(delay).await;
        }

        let mut matched: Vec<(Option<MatchRank>, Interaction)> = Vec::new();
        for entry in &self.records {
            let record = entry.value();
            // Re-asserted here regardless of what the planner injected.
            if record.site_id != plan.site_id() {
                continue;
            }
            if !plan.filters().iter().all(|f| filter_matches(record, f)) {
                continue;
            }
            let rank = match plan.text() {
                None => None,
                Some(free_text) => match free_text.match_rank(&projection(record)) {
                    None => continue,
                    rank => rank,
                },
            };
            matched.push((rank, record.clone()));
        }

        matched.sort_by(|(rank_a, a), (rank_b, b)| {
            rank_b
                .cmp(rank_a)
                .then_with(|| sort_cmp(a, b, plan.sort()))
        });

        let total = u64::try_from(matched.len()).unwrap_or(u64::MAX);
        let ids = matched
            .into_iter()
            .skip(to_usize(plan.offset()))
            .take(to_usize(u64::from(plan.page_size())))
            .map(|(_, record)| record.id)
            .collect();
        Ok((ids, total))
    }

    async fn get(&self, site_id: Uuid, id: Uuid) -> Result<Option<Interaction>, RepoError> {
        Ok(self
            .records
            .get(&id)
            .filter(|r| r.site_id == site_id)
            .map(|r| r.value().clone()))
    }

    async fn get_many(&self, site_id: Uuid, ids: &[Uuid]) -> Result<Vec<Interaction>, RepoError> {
        Ok(ids
            .iter()
            .filter_map(|id| {
                self.records
                    .get(id)
                    .filter(|r| r.site_id == site_id)
                    .map(|r| r.value().clone())
            })
            .collect())
    }

    async fn insert(&self, record: Interaction) -> Result<Interaction, RepoError> {
        self.records.insert(record.id, record.clone());
        Ok(record)
    }

    async fn update(
        &self,
        site_id: Uuid,
        record: Interaction,
    ) -> Result<Option<Interaction>, RepoError> {
        let Some(existing) = self.records.get(&record.id) else {
            return Ok(None);
        };
        if existing.site_id != site_id {
            return Ok(None);
        }
        drop(existing);
        self.records.insert(record.id, record.clone());
        Ok(Some(record))
    }

    async fn delete(&self, site_id: Uuid, id: Uuid) -> Result<bool, RepoError> {
        Ok(self
            .records
            .remove_if(&id, |_, r| r.site_id == site_id)
            .is_some())
    }
}
