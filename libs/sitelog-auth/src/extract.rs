//! Token payload to [`Principal`] extraction.

use serde_json::Value;
use time::OffsetDateTime;
use uuid::Uuid;

use sitelog_security::{Principal, Role, SiteGrant};

use crate::claims_error::ClaimsError;

/// Extract a [`Principal`] from a verified token payload.
///
/// Required claims:
/// - `sub` - the user id as a UUID string;
/// - `sites` - a non-empty array of `{ "site_id": <uuid>, "role": <role> }`
///   objects with at most one entry per site;
/// - `exp` - expiry as unix seconds.
///
/// The payload is trusted apart from expiry: `exp` is always re-checked
/// against `now`.
///
/// # Errors
///
/// [`ClaimsError::Malformed`] when a required claim is absent or of the
/// wrong shape; [`ClaimsError::Expired`] when `exp <= now`.
pub fn extract_principal(payload: &Value, now: OffsetDateTime) -> Result<Principal, ClaimsError> {
    let user_id = required_uuid(payload, "sub")?;
    let expires_at = expiry(payload)?;
    if expires_at <= now {
        return Err(ClaimsError::Expired);
    }

    let grants = site_grants(payload)?;
    Ok(Principal::new(user_id, grants, expires_at))
}

fn required_uuid(payload: &Value, claim: &str) -> Result<Uuid, ClaimsError> {
    let raw = payload
        .get(claim)
        .and_then(Value::as_str)
        .ok_or_else(|| ClaimsError::malformed(format!("missing `{claim}` claim")))?;
    Uuid::parse_str(raw)
        .map_err(|_| ClaimsError::malformed(format!("`{claim}` is not a UUID: {raw}")))
}

fn expiry(payload: &Value) -> Result<OffsetDateTime, ClaimsError> {
    let exp = payload
        .get("exp")
        .and_then(Value::as_i64)
        .ok_or_else(|| ClaimsError::malformed("missing `exp` claim"))?;
    OffsetDateTime::from_unix_timestamp(exp)
        .map_err(|_| ClaimsError::malformed(format!("`exp` out of range: {exp}")))
}

fn site_grants(payload: &Value) -> Result<Vec<SiteGrant>, ClaimsError> {
    let sites = payload
        .get("sites")
        .and_then(Value::as_array)
        .ok_or_else(|| ClaimsError::malformed("missing `sites` claim"))?;
    if sites.is_empty() {
        return Err(ClaimsError::malformed("`sites` claim is empty"));
    }

    let mut grants = Vec::with_capacity(sites.len());
    for entry in sites {
        let site_id = required_uuid(entry, "site_id")?;
        let role = entry
            .get("role")
            .and_then(Value::as_str)
            .ok_or_else(|| ClaimsError::malformed("site entry without `role`"))?;
        let role: Role = role
            .parse()
            .map_err(|_| ClaimsError::malformed(format!("unknown role `{role}`")))?;

        // A token must not carry two roles for one site.
        if grants.iter().any(|g: &SiteGrant| g.site_id == site_id) {
            return Err(ClaimsError::malformed(format!(
                "duplicate site entry {site_id}"
            )));
        }
        grants.push(SiteGrant { site_id, role });
    }
    Ok(grants)
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    #![allow(clippy::unwrap_used)]

    use serde_json::json;
    use time::Duration;

    use super::*;

    fn now() -> OffsetDateTime {
        OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap()
    }

    fn payload(sites: Value, exp_offset: Duration) -> Value {
        json!({
            "sub": "5f0c1f9e-8f4c-4a87-9b2e-111111111111",
            "sites": sites,
            "exp": (now() + exp_offset).unix_timestamp(),
        })
    }

    #[test]
    fn extracts_principal_with_grants() {
        let site = Uuid::new_v4();
        let payload = payload(
            json!([{ "site_id": site.to_string(), "role": "editor" }]),
            Duration::hours(1),
        );

        let principal = extract_principal(&payload, now()).unwrap();
        assert_eq!(principal.grants().len(), 1);
        assert_eq!(principal.role_for(site), Some(Role::Editor));
        assert_eq!(principal.expires_at(), now() + Duration::hours(1));
    }

    #[test]
    fn expired_token_is_rejected() {
        let payload = payload(
            json!([{ "site_id": Uuid::new_v4().to_string(), "role": "admin" }]),
            Duration::seconds(-1),
        );
        assert_eq!(
            extract_principal(&payload, now()).unwrap_err(),
            ClaimsError::Expired
        );
    }

    #[test]
    fn exp_equal_to_now_is_expired() {
        let payload = payload(
            json!([{ "site_id": Uuid::new_v4().to_string(), "role": "admin" }]),
            Duration::ZERO,
        );
        assert_eq!(
            extract_principal(&payload, now()).unwrap_err(),
            ClaimsError::Expired
        );
    }

    #[test]
    fn missing_subject_is_malformed() {
        let payload = json!({
            "sites": [{ "site_id": Uuid::new_v4().to_string(), "role": "admin" }],
            "exp": (now() + Duration::hours(1)).unix_timestamp(),
        });
        assert!(matches!(
            extract_principal(&payload, now()).unwrap_err(),
            ClaimsError::Malformed { .. }
        ));
    }

    #[test]
    fn non_uuid_subject_is_malformed() {
        let mut payload = payload(
            json!([{ "site_id": Uuid::new_v4().to_string(), "role": "admin" }]),
            Duration::hours(1),
        );
        payload["sub"] = json!("alice");
        assert!(matches!(
            extract_principal(&payload, now()).unwrap_err(),
            ClaimsError::Malformed { .. }
        ));
    }

    #[test]
    fn empty_site_list_is_malformed() {
        let payload = payload(json!([]), Duration::hours(1));
        assert!(matches!(
            extract_principal(&payload, now()).unwrap_err(),
            ClaimsError::Malformed { .. }
        ));
    }

    #[test]
    fn unknown_role_is_malformed() {
        let payload = payload(
            json!([{ "site_id": Uuid::new_v4().to_string(), "role": "superuser" }]),
            Duration::hours(1),
        );
        assert!(matches!(
            extract_principal(&payload, now()).unwrap_err(),
            ClaimsError::Malformed { .. }
        ));
    }

    #[test]
    fn duplicate_site_entries_are_malformed() {
        let site = Uuid::new_v4().to_string();
        let payload = payload(
            json!([
                { "site_id": site, "role": "admin" },
                { "site_id": site, "role": "viewer" },
            ]),
            Duration::hours(1),
        );
        assert!(matches!(
            extract_principal(&payload, now()).unwrap_err(),
            ClaimsError::Malformed { .. }
        ));
    }
}
