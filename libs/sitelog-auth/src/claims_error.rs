//! Authentication-layer failure taxonomy.

/// Failures while turning a token payload into a principal.
///
/// Both variants surface to callers as a generic "unauthenticated"; the
/// structured reason exists for logs only.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClaimsError {
    /// A required claim is absent or of the wrong shape.
    #[error("malformed token payload: {reason}")]
    Malformed { reason: String },

    /// The `exp` claim has passed.
    #[error("token expired")]
    Expired,
}

impl ClaimsError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::Malformed {
            reason: reason.into(),
        }
    }
}
