//! The authorization guard.
//!
//! Every allow/deny decision in the system goes through [`check`]. There is
//! deliberately exactly one decision table so policy can be audited in a
//! single place, and no override flag exists in the public contract.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::SECURITY_TARGET;
use crate::context::SiteContext;
use crate::error::AccessError;

/// The action a request is attempting against the context site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Read,
    Create,
    Update,
    Delete,
}

impl Action {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Read => "read",
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Capability check for `action` under `ctx`.
///
/// Decision table:
/// - `read`: any role;
/// - `create`: `admin` or `editor` (the created record's `site_id` is forced
///   to `ctx.site_id` by the service, whatever the payload claimed);
/// - `update`/`delete`: `admin` or `editor`, and when the caller supplies
///   the resource's own `site_id` it must equal the context site.
///
/// A site mismatch is reported identically to an insufficient role so the
/// caller cannot learn whether a record exists outside their scope.
///
/// # Errors
///
/// Returns [`AccessError::SiteAccessDenied`] on any denial; the precise
/// cause is logged on the security target, never surfaced.
pub fn check(
    ctx: &SiteContext,
    action: Action,
    resource_site_id: Option<Uuid>,
) -> Result<(), AccessError> {
    let allowed = match action {
        Action::Read => true,
        Action::Create => ctx.role.can_write(),
        Action::Update | Action::Delete => {
            ctx.role.can_write() && resource_site_id.is_none_or(|site| site == ctx.site_id)
        }
    };

    if allowed {
        return Ok(());
    }

    tracing::warn!(
        target: SECURITY_TARGET,
        principal = %ctx.user_id,
        site = %ctx.site_id,
        role = %ctx.role,
        action = %action,
        resource_site = ?resource_site_id,
        "action denied"
    );
    Err(AccessError::SiteAccessDenied)
}
