//! Outbound ports of the domain layer.

use crate::domain::events::InteractionEvent;

/// Event publication seam. Synchronous and infallible from the service's
/// point of view; implementations buffer or drop as they see fit.
pub trait EventPublisher: Send + Sync {
    fn publish(&self, event: &InteractionEvent);
}

/// Publisher that drops every event. Used by the demo and in tests.
pub struct NoopEventPublisher;

impl EventPublisher for NoopEventPublisher {
    fn publish(&self, _event: &InteractionEvent) {}
}
