#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Claims extraction for the sitelog core.
//!
//! This crate owns the boundary between the external identity provider and
//! the authorization core:
//!
//! - [`extract_principal`] - parse a verified token payload into a
//!   [`sitelog_security::Principal`]
//! - [`ClaimsError`] - the authentication-layer failure taxonomy
//!
//! The payload handed to [`extract_principal`] must already have its
//! signature and audience verified by the identity collaborator. Expiry is
//! re-checked here regardless, against a caller-supplied clock so the check
//! is deterministic in tests.

pub mod claims_error;
pub mod extract;

pub use claims_error::ClaimsError;
pub use extract::extract_principal;
