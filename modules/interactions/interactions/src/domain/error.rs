//! Domain error type and its mapping to the public taxonomy.

use uuid::Uuid;

use interactions_sdk::InteractionsError;
use sitelog_auth::ClaimsError;
use sitelog_query::QueryError;
use sitelog_security::AccessError;

use crate::domain::repos::RepoError;

/// Internal error type of the domain layer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    #[error(transparent)]
    Claims(#[from] ClaimsError),

    #[error(transparent)]
    Access(#[from] AccessError),

    #[error(transparent)]
    Query(#[from] QueryError),

    /// Absent within the caller's site. A record that exists on another
    /// site produces exactly this variant, never an access error.
    #[error("interaction {0} not found")]
    NotFound(Uuid),

    #[error("validation failed for `{field}`: {message}")]
    Validation { field: String, message: String },

    #[error("search timed out")]
    SearchTimeout,

    #[error(transparent)]
    Repo(#[from] RepoError),
}

impl DomainError {
    pub(crate) fn validation(field: &str, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.to_owned(),
            message: message.into(),
        }
    }
}

impl From<DomainError> for InteractionsError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Claims(ClaimsError::Malformed { reason }) => {
                InteractionsError::TokenMalformed(reason)
            }
            DomainError::Claims(ClaimsError::Expired) => InteractionsError::TokenExpired,
            DomainError::Access(AccessError::AmbiguousSiteContext) => {
                InteractionsError::AmbiguousSiteContext
            }
            DomainError::Access(AccessError::SiteContextRequired) => {
                InteractionsError::SiteContextRequired
            }
            DomainError::Access(AccessError::SiteAccessDenied) => {
                InteractionsError::SiteAccessDenied
            }
            DomainError::Query(e) => InteractionsError::InvalidSearchInput(e.to_string()),
            DomainError::NotFound(id) => InteractionsError::NotFound(id),
            DomainError::Validation { field, message } => {
                InteractionsError::Validation { field, message }
            }
            DomainError::SearchTimeout => InteractionsError::SearchTimeout,
            DomainError::Repo(e) => InteractionsError::Internal(e.to_string()),
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn query_errors_become_invalid_search_input() {
        let err: InteractionsError =
            DomainError::Query(QueryError::UnknownSortField("notes".to_owned())).into();
        assert_eq!(
            err,
            InteractionsError::InvalidSearchInput("unknown sort field `notes`".to_owned())
        );
    }

    #[test]
    fn access_errors_map_one_to_one() {
        let err: InteractionsError = DomainError::Access(AccessError::SiteAccessDenied).into();
        assert_eq!(err, InteractionsError::SiteAccessDenied);
    }
}
