//! The raw, caller-facing search request shape.

use serde::{Deserialize, Serialize};

/// One `field <op> value` filter as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldFilter {
    pub field: String,
    pub op: FilterOp,
    pub value: String,
}

/// Filter operator. Which operators apply to which field is decided by the
/// allow-listed schema, not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOp {
    /// Exact equality.
    Eq,
    /// Case-insensitive prefix match (text fields).
    Prefix,
    /// Greater-or-equal (date fields).
    Gte,
    /// Less-or-equal (date fields).
    Lte,
}

impl FilterOp {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOp::Eq => "eq",
            FilterOp::Prefix => "prefix",
            FilterOp::Gte => "gte",
            FilterOp::Lte => "lte",
        }
    }
}

/// Requested sort, by allow-listed field name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sort {
    pub field: String,
    pub direction: SortDirection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

/// A search request as accepted from the caller, before validation and
/// normalization. `page` is 1-based.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchRequest {
    pub text: Option<String>,
    pub filters: Vec<FieldFilter>,
    pub sort: Option<Sort>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl SearchRequest {
    /// Request matching everything on the first page, default sort.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Free-text search with all other knobs at their defaults.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }
}
