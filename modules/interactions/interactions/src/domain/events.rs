//! Domain events emitted after successful writes.

use time::OffsetDateTime;
use uuid::Uuid;

/// Write notification for collaborator modules (audit, e-mail, ...).
///
/// Published after the write and its cache invalidation; consumers must
/// treat delivery as best-effort.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InteractionEvent {
    Created {
        id: Uuid,
        site_id: Uuid,
        at: OffsetDateTime,
    },
    Updated {
        id: Uuid,
        site_id: Uuid,
        at: OffsetDateTime,
    },
    Deleted {
        id: Uuid,
        site_id: Uuid,
        at: OffsetDateTime,
    },
}
