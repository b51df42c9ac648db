//! Stable plan fingerprints.

use std::fmt;

use sha2::{Digest, Sha256};

use crate::plan::QueryPlan;

/// SHA-256 over the canonical plan encoding, hex-encoded.
///
/// Together with the site id this is the result-cache key. Stability rests
/// on plan normalization: filters are pre-sorted, text is normalized and
/// the page size is clamped before the plan ever reaches this hash.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlanFingerprint(String);

impl PlanFingerprint {
    #[must_use]
    pub(crate) fn of(plan: &QueryPlan) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(b"site=");
        hasher.update(plan.site_id().as_bytes());
        hasher.update(b"\ntext=");
        if let Some(text) = plan.text() {
            hasher.update(text.phrase().as_bytes());
        }
        for filter in plan.filters() {
            hasher.update(b"\nfilter=");
            hasher.update(filter.field.as_str().as_bytes());
            hasher.update(b" ");
            hasher.update(filter.op.as_str().as_bytes());
            hasher.update(b" ");
            hasher.update(filter.value.canonical().as_bytes());
        }
        let sort = plan.sort();
        hasher.update(b"\nsort=");
        hasher.update(sort.field.as_str().as_bytes());
        hasher.update(b" ");
        hasher.update(sort.direction.as_str().as_bytes());
        hasher.update(format!("\npage={}", plan.page()).as_bytes());
        hasher.update(format!("\npage_size={}", plan.page_size()).as_bytes());

        Self(hex::encode(hasher.finalize()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlanFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
