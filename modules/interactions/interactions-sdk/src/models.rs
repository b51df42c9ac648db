//! Public models of the interactions module.

use std::fmt;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// A tenant boundary. Reference data owned by the directory collaborator;
/// records point at it by id only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Site {
    pub id: Uuid,
    pub name: String,
}

/// The kind of a tracked interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionKind {
    Meeting,
    Call,
    Email,
    Visit,
    Other,
}

impl InteractionKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            InteractionKind::Meeting => "meeting",
            InteractionKind::Call => "call",
            InteractionKind::Email => "email",
            InteractionKind::Visit => "visit",
            InteractionKind::Other => "other",
        }
    }
}

impl fmt::Display for InteractionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A tracked interaction record.
///
/// `site_id` is set exactly once at creation and is never mutated; the
/// patch type deliberately has no site field. Invariant: `ends_at >=
/// starts_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interaction {
    pub id: Uuid,
    pub site_id: Uuid,
    pub subject: String,
    pub kind: InteractionKind,
    pub lead: String,
    #[serde(with = "time::serde::rfc3339")]
    pub starts_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub ends_at: OffsetDateTime,
    /// IANA zone name the interaction is scheduled in.
    pub timezone: String,
    pub location: String,
    pub description: String,
    pub notes: String,
    pub created_by: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Payload for creating an interaction.
///
/// Any `site_id` present in the payload is ignored: the persisted record's
/// site is always the resolved context's site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewInteraction {
    #[serde(default)]
    pub site_id: Option<Uuid>,
    pub subject: String,
    pub kind: InteractionKind,
    pub lead: String,
    #[serde(with = "time::serde::rfc3339")]
    pub starts_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub ends_at: OffsetDateTime,
    pub timezone: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub notes: String,
}

/// Partial update of an interaction. There is no site field: the owning
/// site is immutable after creation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionPatch {
    pub subject: Option<String>,
    pub kind: Option<InteractionKind>,
    pub lead: Option<String>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub starts_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub ends_at: Option<OffsetDateTime>,
    pub timezone: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub notes: Option<String>,
}

/// The page-item shape returned by search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionSummary {
    pub id: Uuid,
    pub site_id: Uuid,
    pub subject: String,
    pub kind: InteractionKind,
    pub lead: String,
    #[serde(with = "time::serde::rfc3339")]
    pub starts_at: OffsetDateTime,
    pub location: String,
}

impl From<&Interaction> for InteractionSummary {
    fn from(record: &Interaction) -> Self {
        Self {
            id: record.id,
            site_id: record.site_id,
            subject: record.subject.clone(),
            kind: record.kind,
            lead: record.lead.clone(),
            starts_at: record.starts_at,
            location: record.location.clone(),
        }
    }
}

/// One served page of search results.
///
/// `page` and `page_size` echo the values actually used, so a caller whose
/// request was clamped can see the adjustment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchPage {
    pub items: Vec<InteractionSummary>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
}
