#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Interactions SDK
//!
//! This crate provides the public API for the `interactions` module:
//!
//! - [`InteractionsClientV1`] - public API trait for consumers
//! - [`Interaction`], [`InteractionSummary`], [`SearchPage`] - models
//! - [`InteractionsError`] - the public error taxonomy
//!
//! ## Usage
//!
//! Consumers obtain the client from the module wiring and call the two
//! logical entry points before touching data:
//!
//! ```ignore
//! let ctx = client
//!     .authorize(&payload, SiteSelector::none(), Action::Read, None)
//!     .await?;
//! let page = client
//!     .search(&payload, SiteSelector::none(), SearchRequest::text("kickoff"))
//!     .await?;
//! ```

pub mod api;
pub mod error;
pub mod models;

pub use api::InteractionsClientV1;
pub use error::InteractionsError;
pub use models::{
    Interaction, InteractionKind, InteractionPatch, InteractionSummary, NewInteraction,
    SearchPage, Site,
};
