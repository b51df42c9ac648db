//! The authenticated principal and its per-site role grants.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Role a principal holds on a single site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Editor,
    Viewer,
}

impl Role {
    /// Canonical lowercase name, matching the serde representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Editor => "editor",
            Role::Viewer => "viewer",
        }
    }

    /// Whether this role may mutate records (create/update/delete).
    #[must_use]
    pub fn can_write(&self) -> bool {
        matches!(self, Role::Admin | Role::Editor)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown role name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "editor" => Ok(Role::Editor),
            "viewer" => Ok(Role::Viewer),
            other => Err(UnknownRole(other.to_owned())),
        }
    }
}

/// A single `(site, role)` authorization grant carried by a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteGrant {
    pub site_id: Uuid,
    pub role: Role,
}

/// The authenticated identity for the current request.
///
/// Reconstructed from the verified token payload on every request and
/// immutable afterwards. Never stored as shared mutable state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    user_id: Uuid,
    grants: Vec<SiteGrant>,
    expires_at: OffsetDateTime,
}

impl Principal {
    /// Build a principal from its token-derived parts.
    #[must_use]
    pub fn new(user_id: Uuid, grants: Vec<SiteGrant>, expires_at: OffsetDateTime) -> Self {
        Self {
            user_id,
            grants,
            expires_at,
        }
    }

    #[must_use]
    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    /// The site/role grants in token order.
    #[must_use]
    pub fn grants(&self) -> &[SiteGrant] {
        &self.grants
    }

    #[must_use]
    pub fn expires_at(&self) -> OffsetDateTime {
        self.expires_at
    }

    /// The role this principal holds on `site_id`, if any.
    #[must_use]
    pub fn role_for(&self, site_id: Uuid) -> Option<Role> {
        self.grants
            .iter()
            .find(|g| g.site_id == site_id)
            .map(|g| g.role)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn role_round_trips_through_str() {
        for role in [Role::Admin, Role::Editor, Role::Viewer] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
    }

    #[test]
    fn unknown_role_is_rejected() {
        let err = "owner".parse::<Role>().unwrap_err();
        assert_eq!(err, UnknownRole("owner".to_owned()));
    }

    #[test]
    fn viewer_cannot_write() {
        assert!(Role::Admin.can_write());
        assert!(Role::Editor.can_write());
        assert!(!Role::Viewer.can_write());
    }

    #[test]
    fn role_for_finds_matching_grant() {
        let site_a = Uuid::new_v4();
        let site_b = Uuid::new_v4();
        let principal = Principal::new(
            Uuid::new_v4(),
            vec![
                SiteGrant {
                    site_id: site_a,
                    role: Role::Admin,
                },
                SiteGrant {
                    site_id: site_b,
                    role: Role::Viewer,
                },
            ],
            OffsetDateTime::now_utc(),
        );

        assert_eq!(principal.role_for(site_a), Some(Role::Admin));
        assert_eq!(principal.role_for(site_b), Some(Role::Viewer));
        assert_eq!(principal.role_for(Uuid::new_v4()), None);
    }
}
