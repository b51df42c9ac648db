//! The allow-listed field schema.
//!
//! Filterable and sortable fields are closed sets. Anything outside them is
//! rejected while building the plan, so a typo can never degrade into an
//! unscoped scan and a crafted field name can never reach storage.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::request::FilterOp;

/// Fields a caller may filter on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterField {
    Kind,
    Lead,
    Location,
    Subject,
    StartsAt,
    CreatedAt,
}

impl FilterField {
    /// Parse an allow-listed filter field name.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "kind" => Some(FilterField::Kind),
            "lead" => Some(FilterField::Lead),
            "location" => Some(FilterField::Location),
            "subject" => Some(FilterField::Subject),
            "starts_at" => Some(FilterField::StartsAt),
            "created_at" => Some(FilterField::CreatedAt),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterField::Kind => "kind",
            FilterField::Lead => "lead",
            FilterField::Location => "location",
            FilterField::Subject => "subject",
            FilterField::StartsAt => "starts_at",
            FilterField::CreatedAt => "created_at",
        }
    }

    /// Whether `op` is supported on this field.
    #[must_use]
    pub fn supports(&self, op: FilterOp) -> bool {
        match self {
            FilterField::Kind => matches!(op, FilterOp::Eq),
            FilterField::Lead | FilterField::Location => {
                matches!(op, FilterOp::Eq | FilterOp::Prefix)
            }
            FilterField::Subject => matches!(op, FilterOp::Prefix),
            FilterField::StartsAt | FilterField::CreatedAt => {
                matches!(op, FilterOp::Gte | FilterOp::Lte)
            }
        }
    }

    /// Whether values for this field are timestamps.
    #[must_use]
    pub fn is_temporal(&self) -> bool {
        matches!(self, FilterField::StartsAt | FilterField::CreatedAt)
    }
}

impl fmt::Display for FilterField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields a caller may sort by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    StartsAt,
    CreatedAt,
    UpdatedAt,
    Subject,
    Lead,
}

impl SortField {
    /// Parse an allow-listed sort field name.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "starts_at" => Some(SortField::StartsAt),
            "created_at" => Some(SortField::CreatedAt),
            "updated_at" => Some(SortField::UpdatedAt),
            "subject" => Some(SortField::Subject),
            "lead" => Some(SortField::Lead),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::StartsAt => "starts_at",
            SortField::CreatedAt => "created_at",
            SortField::UpdatedAt => "updated_at",
            SortField::Subject => "subject",
            SortField::Lead => "lead",
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn field_names_round_trip() {
        for name in ["kind", "lead", "location", "subject", "starts_at", "created_at"] {
            let field = FilterField::parse(name);
            assert_eq!(field.map(|f| f.as_str()), Some(name));
        }
        assert_eq!(FilterField::parse("site_id"), None);
        assert_eq!(FilterField::parse("notes"), None);
    }

    #[test]
    fn date_fields_take_ranges_only() {
        assert!(FilterField::StartsAt.supports(FilterOp::Gte));
        assert!(FilterField::StartsAt.supports(FilterOp::Lte));
        assert!(!FilterField::StartsAt.supports(FilterOp::Eq));
        assert!(!FilterField::StartsAt.supports(FilterOp::Prefix));
    }

    #[test]
    fn kind_is_equality_only() {
        assert!(FilterField::Kind.supports(FilterOp::Eq));
        assert!(!FilterField::Kind.supports(FilterOp::Prefix));
    }

    #[test]
    fn sort_allow_list_excludes_free_text_fields() {
        assert!(SortField::parse("starts_at").is_some());
        assert!(SortField::parse("description").is_none());
        assert!(SortField::parse("notes").is_none());
    }
}
