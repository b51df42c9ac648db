#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Interactions module.
//!
//! Implements the site-scoped authorization and search core behind the
//! [`interactions_sdk::InteractionsClientV1`] trait:
//!
//! - every data path is filtered to the caller's resolved site, with the
//!   repository re-asserting the site predicate independently of the query
//!   builder;
//! - search results are memoized per `(site, plan fingerprint)` and
//!   invalidated in O(1) by a per-site generation counter bumped on every
//!   write;
//! - cache trouble never fails a request (fail-open to a miss), and failed
//!   invalidations are retried in the background with the site's cache
//!   disabled once the confirmation window passes, bounding staleness.

pub mod config;
pub mod domain;
pub mod infra;
pub mod module;

pub mod test_support;

pub use config::InteractionsConfig;
pub use module::InteractionsModule;
