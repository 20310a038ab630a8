#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! IAP `AuthN` SDK
//!
//! This crate provides the public API for the `iap_authn` module:
//!
//! - [`AssertionVerifier`] - Verifies a signed IAP assertion
//! - [`RuntimeEnvironment`] - Deployment identifiers and the static principal override
//! - [`AuditLog`] - Sink for audit entries
//! - [`VerifiedAssertion`], [`AssertionClaims`] - Verification result models
//! - [`AuthenticationFailure`], [`VerificationError`] - Error types
//!
//! ## Usage
//!
//! ```ignore
//! use iap_authn_sdk::AssertionVerifier;
//!
//! let verified = verifier
//!     .verify(assertion, "/projects/123/apps/myapp", IAP_ISSUER_URL)
//!     .await?;
//! let subject = verified.claims().sub.as_deref();
//! ```

pub mod api;
pub mod error;
pub mod models;

// Re-export main types at crate root
pub use api::{AssertionVerifier, AuditLog, RuntimeEnvironment};
pub use error::{AuthenticationFailure, VerificationError};
pub use models::{AssertionClaims, AuditEntry, DeviceClaims, VerifiedAssertion};

/// Issuer of every IAP assertion.
pub const IAP_ISSUER_URL: &str = "https://cloud.google.com/iap";

/// Request header carrying the IAP assertion.
pub const IAP_ASSERTION_HEADER: &str = "x-goog-iap-jwt-assertion";

/// Audit event written for each authenticated request.
pub const EVENT_AUTHENTICATE: &str = "iap.authenticate";

/// Audience IAP puts into assertions for an App Engine application.
#[must_use]
pub fn app_engine_audience(project_number: &str, project_id: &str) -> String {
    format!("/projects/{project_number}/apps/{project_id}")
}
