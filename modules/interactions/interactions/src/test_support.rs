#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Shared fixtures for the module's tests and the demo.

use serde_json::{Value, json};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use interactions_sdk::{InteractionKind, NewInteraction};
use sitelog_security::{Role, SiteContext};

/// A verified-token payload granting `user_id` the given roles, expiring an
/// hour from now.
#[must_use]
pub fn token_payload(user_id: Uuid, grants: &[(Uuid, Role)]) -> Value {
    let sites: Vec<Value> = grants
        .iter()
        .map(|(site_id, role)| {
            json!({ "site_id": site_id.to_string(), "role": role.as_str() })
        })
        .collect();
    json!({
        "sub": user_id.to_string(),
        "sites": sites,
        "exp": (OffsetDateTime::now_utc() + Duration::hours(1)).unix_timestamp(),
    })
}

/// Payload whose `exp` already passed.
#[must_use]
pub fn expired_payload(user_id: Uuid, site_id: Uuid) -> Value {
    json!({
        "sub": user_id.to_string(),
        "sites": [{ "site_id": site_id.to_string(), "role": "admin" }],
        "exp": (OffsetDateTime::now_utc() - Duration::minutes(5)).unix_timestamp(),
    })
}

/// A resolved context, bypassing the token pipeline.
#[must_use]
pub fn ctx(site_id: Uuid, role: Role) -> SiteContext {
    SiteContext {
        user_id: Uuid::new_v4(),
        site_id,
        role,
    }
}

/// A valid create payload with the given subject and defaults everywhere
/// else.
#[must_use]
pub fn new_interaction(subject: &str) -> NewInteraction {
    let starts_at = OffsetDateTime::now_utc();
    NewInteraction {
        site_id: None,
        subject: subject.to_owned(),
        kind: InteractionKind::Meeting,
        lead: "Dana Feld".to_owned(),
        starts_at,
        ends_at: starts_at + Duration::hours(1),
        timezone: "Europe/Berlin".to_owned(),
        location: "Berlin office".to_owned(),
        description: "Planning session".to_owned(),
        notes: String::new(),
    }
}
