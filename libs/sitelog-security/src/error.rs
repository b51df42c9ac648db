//! Authorization failure taxonomy.

/// Authorization-layer failures.
///
/// All three variants are surfaced to callers through one uniform public
/// shape ("not authorized") so that error differences cannot be used to
/// enumerate which sites exist. The precise cause is preserved here for
/// logging on the security target.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccessError {
    /// More than one site indicator was supplied and they disagree.
    #[error("conflicting site indicators supplied")]
    AmbiguousSiteContext,

    /// The principal holds grants on several sites and supplied no indicator.
    #[error("a site indicator is required")]
    SiteContextRequired,

    /// The principal has no grant on the requested site, or the role is
    /// insufficient for the attempted action.
    #[error("access to the requested site denied")]
    SiteAccessDenied,
}
