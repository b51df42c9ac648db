//! The normalized, site-bound query plan.

use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use uuid::Uuid;

use crate::error::QueryError;
use crate::fingerprint::PlanFingerprint;
use crate::request::{FilterOp, SearchRequest, SortDirection};
use crate::schema::{FilterField, SortField};
use crate::text::{self, MatchRank};

/// Tunables for plan building, resolved once at process start.
#[derive(Debug, Clone, Copy)]
pub struct QueryLimits {
    pub default_page_size: u32,
    pub max_page_size: u32,
}

impl Default for QueryLimits {
    fn default() -> Self {
        Self {
            default_page_size: 25,
            max_page_size: 100,
        }
    }
}

/// A typed, validated filter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    /// Normalized (lower-cased, whitespace-collapsed) text.
    Text(String),
    Time(OffsetDateTime),
}

impl FilterValue {
    /// Canonical encoding used for filter ordering and fingerprinting.
    #[must_use]
    pub fn canonical(&self) -> String {
        match self {
            FilterValue::Text(s) => s.clone(),
            FilterValue::Time(t) => t.unix_timestamp_nanos().to_string(),
        }
    }
}

/// A filter bound to an allow-listed field with a parsed value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundFilter {
    pub field: FilterField,
    pub op: FilterOp,
    pub value: FilterValue,
}

/// Normalized free text: the whole phrase plus its individual terms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FreeText {
    phrase: String,
    terms: Vec<String>,
}

impl FreeText {
    /// Normalize raw text; `None` when nothing searchable remains.
    #[must_use]
    pub fn new(raw: &str) -> Option<Self> {
        let phrase = text::normalize(raw);
        if phrase.is_empty() {
            return None;
        }
        let terms = phrase.split(' ').map(str::to_owned).collect();
        Some(Self { phrase, terms })
    }

    #[must_use]
    pub fn phrase(&self) -> &str {
        &self.phrase
    }

    /// Rank a record's searchable projection against this text.
    #[must_use]
    pub fn match_rank(&self, projection: &str) -> Option<MatchRank> {
        text::match_rank(projection, &self.phrase, &self.terms)
    }
}

/// Resolved sort key and direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub field: SortField,
    pub direction: SortDirection,
}

impl Default for SortSpec {
    /// Most recent first.
    fn default() -> Self {
        Self {
            field: SortField::StartsAt,
            direction: SortDirection::Desc,
        }
    }
}

/// The normalized representation of a search: mandatory site scope, free
/// text, field filters (AND), sort and pagination.
///
/// Two semantically equal requests build the same plan, so the plan's
/// [`fingerprint`](QueryPlan::fingerprint) is a stable cache key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryPlan {
    site_id: Uuid,
    text: Option<FreeText>,
    filters: Vec<BoundFilter>,
    sort: SortSpec,
    page: u32,
    page_size: u32,
}

impl QueryPlan {
    /// Validate and normalize `request` under the site scope `site_id`.
    ///
    /// The site filter is injected unconditionally from the resolved site
    /// context; a caller-supplied `site_id` filter is discarded rather than
    /// honored, since the context is the only legitimate source of scoping.
    /// A page size above the maximum is clamped, not rejected; the clamped
    /// value is visible on the plan and echoed in responses.
    ///
    /// # Errors
    ///
    /// [`QueryError`] when the page or page size is zero, a filter names an
    /// unknown field or unsupported operator, a value does not parse, or
    /// the sort field is not allow-listed.
    pub fn build(
        request: &SearchRequest,
        site_id: Uuid,
        limits: QueryLimits,
    ) -> Result<Self, QueryError> {
        let page = request.page.unwrap_or(1);
        if page == 0 {
            return Err(QueryError::ZeroPage);
        }
        let page_size = request.page_size.unwrap_or(limits.default_page_size);
        if page_size == 0 {
            return Err(QueryError::ZeroPageSize);
        }
        let page_size = page_size.min(limits.max_page_size);

        let mut filters = Vec::with_capacity(request.filters.len());
        for filter in &request.filters {
            if filter.field == "site_id" {
                tracing::debug!("discarding caller-supplied site_id filter");
                continue;
            }
            let field = FilterField::parse(&filter.field)
                .ok_or_else(|| QueryError::UnknownFilterField(filter.field.clone()))?;
            if !field.supports(filter.op) {
                return Err(QueryError::UnsupportedOperator {
                    field: field.as_str().to_owned(),
                    op: filter.op.as_str().to_owned(),
                });
            }
            filters.push(BoundFilter {
                field,
                op: filter.op,
                value: parse_value(field, &filter.value)?,
            });
        }
        filters.sort_by(|a, b| {
            (a.field, a.op, a.value.canonical()).cmp(&(b.field, b.op, b.value.canonical()))
        });

        let sort = match &request.sort {
            None => SortSpec::default(),
            Some(sort) => SortSpec {
                field: SortField::parse(&sort.field)
                    .ok_or_else(|| QueryError::UnknownSortField(sort.field.clone()))?,
                direction: sort.direction,
            },
        };

        Ok(Self {
            site_id,
            text: request.text.as_deref().and_then(FreeText::new),
            filters,
            sort,
            page,
            page_size,
        })
    }

    #[must_use]
    pub fn site_id(&self) -> Uuid {
        self.site_id
    }

    #[must_use]
    pub fn text(&self) -> Option<&FreeText> {
        self.text.as_ref()
    }

    #[must_use]
    pub fn filters(&self) -> &[BoundFilter] {
        &self.filters
    }

    #[must_use]
    pub fn sort(&self) -> SortSpec {
        self.sort
    }

    /// 1-based page actually planned.
    #[must_use]
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Page size after clamping.
    #[must_use]
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Zero-based record offset of the planned page.
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.page_size)
    }

    /// Stable hash of the normalized plan, the cache key basis.
    #[must_use]
    pub fn fingerprint(&self) -> PlanFingerprint {
        PlanFingerprint::of(self)
    }
}

fn parse_value(field: FilterField, raw: &str) -> Result<FilterValue, QueryError> {
    if field.is_temporal() {
        let parsed = OffsetDateTime::parse(raw, &Rfc3339).map_err(|e| QueryError::InvalidValue {
            field: field.as_str().to_owned(),
            reason: format!("expected an RFC 3339 timestamp: {e}"),
        })?;
        return Ok(FilterValue::Time(parsed));
    }

    let normalized = text::normalize(raw);
    if normalized.is_empty() {
        return Err(QueryError::InvalidValue {
            field: field.as_str().to_owned(),
            reason: "empty value".to_owned(),
        });
    }
    Ok(FilterValue::Text(normalized))
}
