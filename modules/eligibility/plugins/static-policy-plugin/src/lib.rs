#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Static Policy Plugin
//!
//! This plugin provides a [`PolicyBackend`](eligibility_sdk::PolicyBackend)
//! whose role bindings are listed in configuration, for development and testing.
//!
//! ## Mode: `configured` (default)
//!
//! Each binding applies to the principals named in `members`:
//!
//! - `user:<email>` - a single user
//! - `domain:<domain>` - every user with an e-mail in that domain
//!
//! A binding with `required_access_level` only applies when the caller's
//! device satisfies that access level.
//!
//! ## Mode: `unavailable`
//!
//! Every query fails as if the backend were unreachable.
//!
//! ## Configuration
//!
//! ```yaml
//! policy:
//!   mode: configured
//!   bindings:
//!     - id: "viewer-p1"
//!       role: "roles/viewer"
//!       resource: "//cloudresourcemanager.googleapis.com/projects/p1"
//!       members: ["domain:example.com"]
//!     - id: "admin-p1"
//!       role: "roles/owner"
//!       resource: "//cloudresourcemanager.googleapis.com/projects/p1"
//!       condition: "request.time < timestamp('2030-01-01T00:00:00Z')"
//!       members: ["user:alice@example.com"]
//!       required_access_level: "accessPolicies/1/accessLevels/corp"
//! ```

pub mod config;
pub mod domain;

pub use config::{PolicyMode, StaticBindingConfig, StaticPolicyPluginConfig};
pub use domain::Service;
