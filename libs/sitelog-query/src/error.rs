//! Invalid search input taxonomy.
//!
//! These errors describe caller mistakes against the allow-listed field
//! schema. They carry precise reasons: unlike authorization failures they
//! reveal nothing about tenant data and are safe to surface verbatim.

/// A search request that cannot be turned into a query plan.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("unknown filter field `{0}`")]
    UnknownFilterField(String),

    #[error("unknown sort field `{0}`")]
    UnknownSortField(String),

    #[error("operator `{op}` is not supported for field `{field}`")]
    UnsupportedOperator { field: String, op: String },

    #[error("invalid value for field `{field}`: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("page is 1-based, got 0")]
    ZeroPage,

    #[error("page size must be at least 1")]
    ZeroPageSize,
}
