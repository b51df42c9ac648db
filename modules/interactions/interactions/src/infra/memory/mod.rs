//! In-memory adapters.
//!
//! Reference implementations of the repository and cache ports. SQL or
//! external-store adapters are collaborators implementing the same traits.

pub mod cache;
pub mod repository;

pub use cache::InMemorySearchCache;
pub use repository::InMemoryInteractionsRepository;
