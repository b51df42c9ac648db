#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Security primitives for the sitelog core.
//!
//! This crate provides the request-scoped authorization building blocks:
//!
//! - [`Principal`] - authenticated identity with per-site role grants
//! - [`SiteContext`] - the single active site a request operates under
//! - [`resolve_site_context`] - site indicator resolution rules
//! - [`guard`] - the allow/deny decision table
//! - [`AccessError`] - authorization failure taxonomy
//!
//! All functions here are pure and non-blocking. The resolved `SiteContext`
//! is passed explicitly through every downstream call; it is never read from
//! ambient or global state, which rules out cross-request leakage under
//! concurrent handling.

pub mod context;
pub mod error;
pub mod guard;
pub mod principal;

pub use context::{SiteContext, SiteSelector, resolve_site_context};
pub use error::AccessError;
pub use guard::Action;
pub use principal::{Principal, Role, SiteGrant};

/// Dedicated tracing target for security events (resolver and guard denials).
pub const SECURITY_TARGET: &str = "sitelog::security";
