#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Query building for the sitelog core.
//!
//! - [`SearchRequest`] - the raw caller-facing search shape
//! - [`QueryPlan`] - the normalized, site-bound execution plan
//! - [`PlanFingerprint`] - stable hash of a plan, the cache key basis
//! - [`text`] - searchable projection and free-text matching
//! - [`QueryError`] - invalid-input taxonomy
//!
//! The plan is both the execution plan and the cache key: normalization
//! guarantees that two semantically equal requests produce byte-identical
//! fingerprints.

pub mod error;
pub mod fingerprint;
pub mod plan;
pub mod request;
pub mod schema;
pub mod text;

pub use error::QueryError;
pub use fingerprint::PlanFingerprint;
pub use plan::{BoundFilter, FilterValue, FreeText, QueryLimits, QueryPlan, SortSpec};
pub use request::{FieldFilter, FilterOp, SearchRequest, Sort, SortDirection};
pub use schema::{FilterField, SortField};
pub use text::MatchRank;
