//! Site context resolution.
//!
//! Collapses the per-request site indicators into the single [`SiteContext`]
//! all subsequent calls are scoped to. Resolution happens exactly once per
//! request; the result is passed by value, never stashed in a global or a
//! thread-local.

use uuid::Uuid;

use crate::SECURITY_TARGET;
use crate::error::AccessError;
use crate::principal::{Principal, Role};

/// The single active site (and resolved role) a request operates under.
///
/// Derived, never persisted; lives for the duration of request handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SiteContext {
    pub user_id: Uuid,
    pub site_id: Uuid,
    pub role: Role,
}

/// The site indicator as supplied by the transport layer.
///
/// A request may carry the indicator in a header, a path segment or the
/// body. Any combination may be present; all present sources must agree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SiteSelector {
    pub header: Option<Uuid>,
    pub path: Option<Uuid>,
    pub body: Option<Uuid>,
}

impl SiteSelector {
    /// Selector with no site indicator present.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Selector carrying a single indicator (source does not matter for
    /// resolution, only agreement does).
    #[must_use]
    pub fn site(site_id: Uuid) -> Self {
        Self {
            header: Some(site_id),
            path: None,
            body: None,
        }
    }

    /// Collapse the present sources into at most one site id.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError::AmbiguousSiteContext`] if two or more sources
    /// are present and disagree.
    pub fn resolve(&self) -> Result<Option<Uuid>, AccessError> {
        let mut resolved: Option<Uuid> = None;
        for candidate in [self.header, self.path, self.body].into_iter().flatten() {
            match resolved {
                None => resolved = Some(candidate),
                Some(prior) if prior == candidate => {}
                Some(_) => return Err(AccessError::AmbiguousSiteContext),
            }
        }
        Ok(resolved)
    }
}

/// Resolve the active site context for a request.
///
/// Rules:
/// - no indicator, exactly one grant: that site is the context (the sole
///   default behavior);
/// - no indicator, several grants: [`AccessError::SiteContextRequired`];
/// - indicator outside the principal's grant set:
///   [`AccessError::SiteAccessDenied`], logged as a security event;
/// - otherwise the supplied site with the principal's role for it.
///
/// # Errors
///
/// Returns an [`AccessError`] per the rules above, including
/// [`AccessError::AmbiguousSiteContext`] for disagreeing indicators.
pub fn resolve_site_context(
    principal: &Principal,
    selector: &SiteSelector,
) -> Result<SiteContext, AccessError> {
    let requested = selector.resolve().inspect_err(|_| {
        tracing::warn!(
            target: SECURITY_TARGET,
            principal = %principal.user_id(),
            "conflicting site indicators in one request"
        );
    })?;

    let site_id = match requested {
        Some(site_id) => site_id,
        None => match principal.grants() {
            [only] => only.site_id,
            _ => return Err(AccessError::SiteContextRequired),
        },
    };

    let Some(role) = principal.role_for(site_id) else {
        tracing::warn!(
            target: SECURITY_TARGET,
            principal = %principal.user_id(),
            site = %site_id,
            "site indicator outside the principal's grant set"
        );
        return Err(AccessError::SiteAccessDenied);
    };

    Ok(SiteContext {
        user_id: principal.user_id(),
        site_id,
        role,
    })
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    #![allow(clippy::unwrap_used)]

    use time::OffsetDateTime;
    use tracing_test::traced_test;

    use super::*;
    use crate::principal::SiteGrant;

    fn principal_with(grants: &[(Uuid, Role)]) -> Principal {
        Principal::new(
            Uuid::new_v4(),
            grants
                .iter()
                .map(|&(site_id, role)| SiteGrant { site_id, role })
                .collect(),
            OffsetDateTime::now_utc(),
        )
    }

    #[test]
    fn single_site_defaults_without_indicator() {
        let site = Uuid::new_v4();
        let principal = principal_with(&[(site, Role::Viewer)]);

        let ctx = resolve_site_context(&principal, &SiteSelector::none()).unwrap();
        assert_eq!(ctx.site_id, site);
        assert_eq!(ctx.role, Role::Viewer);
        assert_eq!(ctx.user_id, principal.user_id());
    }

    #[test]
    fn multi_site_without_indicator_requires_context() {
        let principal = principal_with(&[(Uuid::new_v4(), Role::Admin), (Uuid::new_v4(), Role::Viewer)]);

        let err = resolve_site_context(&principal, &SiteSelector::none()).unwrap_err();
        assert_eq!(err, AccessError::SiteContextRequired);
    }

    #[test]
    fn explicit_indicator_picks_site_and_role() {
        let site_a = Uuid::new_v4();
        let site_b = Uuid::new_v4();
        let principal = principal_with(&[(site_a, Role::Admin), (site_b, Role::Editor)]);

        let ctx = resolve_site_context(&principal, &SiteSelector::site(site_b)).unwrap();
        assert_eq!(ctx.site_id, site_b);
        assert_eq!(ctx.role, Role::Editor);
    }

    #[traced_test]
    #[test]
    fn foreign_indicator_is_denied_and_logged() {
        let principal = principal_with(&[(Uuid::new_v4(), Role::Admin)]);

        let err =
            resolve_site_context(&principal, &SiteSelector::site(Uuid::new_v4())).unwrap_err();
        assert_eq!(err, AccessError::SiteAccessDenied);
        assert!(logs_contain("site indicator outside the principal's grant set"));
    }

    #[test]
    fn agreeing_sources_resolve() {
        let site = Uuid::new_v4();
        let selector = SiteSelector {
            header: Some(site),
            path: Some(site),
            body: None,
        };
        assert_eq!(selector.resolve().unwrap(), Some(site));
    }

    #[test]
    fn disagreeing_sources_are_ambiguous() {
        let principal = principal_with(&[(Uuid::new_v4(), Role::Admin)]);
        let selector = SiteSelector {
            header: Some(Uuid::new_v4()),
            path: Some(Uuid::new_v4()),
            body: None,
        };

        let err = resolve_site_context(&principal, &selector).unwrap_err();
        assert_eq!(err, AccessError::AmbiguousSiteContext);
    }
}
