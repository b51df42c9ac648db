//! Public error taxonomy of the interactions module.

use uuid::Uuid;

/// Everything a consumer of [`crate::InteractionsClientV1`] can observe.
///
/// The structured variants exist for logging and tests. What an end user may
/// see comes from [`public_message`](InteractionsError::public_message),
/// which deliberately collapses all authorization-path failures into one
/// string so error differences cannot be used to enumerate sites or
/// records.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InteractionsError {
    /// Required claims absent or of the wrong shape.
    #[error("malformed token: {0}")]
    TokenMalformed(String),

    #[error("token expired")]
    TokenExpired,

    /// Conflicting site indicators in one request.
    #[error("ambiguous site context")]
    AmbiguousSiteContext,

    /// Multi-site principal supplied no site indicator.
    #[error("site context required")]
    SiteContextRequired,

    /// No grant on the requested site, or the role does not permit the
    /// action.
    #[error("site access denied")]
    SiteAccessDenied,

    /// Record absent — or outside the caller's site, which must look
    /// identical.
    #[error("interaction {0} not found")]
    NotFound(Uuid),

    /// Caller error in the search request; safe to describe precisely.
    #[error("invalid search input: {0}")]
    InvalidSearchInput(String),

    /// Payload failed domain validation.
    #[error("validation failed for `{field}`: {message}")]
    Validation { field: String, message: String },

    /// The query exceeded its execution bound. Retryable by the caller;
    /// never retried internally.
    #[error("search timed out")]
    SearchTimeout,

    #[error("internal error: {0}")]
    Internal(String),
}

impl InteractionsError {
    /// The uniform user-visible message for this error.
    #[must_use]
    pub fn public_message(&self) -> &str {
        match self {
            InteractionsError::TokenMalformed(_) | InteractionsError::TokenExpired => {
                "unauthenticated"
            }
            InteractionsError::AmbiguousSiteContext
            | InteractionsError::SiteContextRequired
            | InteractionsError::SiteAccessDenied => "not authorized",
            InteractionsError::NotFound(_) => "not found",
            InteractionsError::InvalidSearchInput(reason) => reason,
            InteractionsError::Validation { message, .. } => message,
            InteractionsError::SearchTimeout => "search unavailable, try again",
            InteractionsError::Internal(_) => "internal error",
        }
    }

    /// Whether the caller may usefully retry the same request.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, InteractionsError::SearchTimeout)
    }
}
