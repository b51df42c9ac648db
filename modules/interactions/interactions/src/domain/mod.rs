//! Domain layer: service, ports and the local SDK client.

pub mod cache;
pub mod error;
pub mod events;
pub mod invalidation;
pub mod local_client;
pub mod ports;
pub mod repos;
pub mod service;

pub use cache::{CacheError, CacheStats, CachedPage, SearchCache};
pub use error::DomainError;
pub use events::InteractionEvent;
pub use invalidation::{Invalidator, RetryPolicy};
pub use local_client::LocalInteractionsClient;
pub use ports::{EventPublisher, NoopEventPublisher};
pub use repos::{InteractionsRepository, RepoError};
pub use service::InteractionsService;
