#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Eligibility SDK
//!
//! This crate provides the public API for the `eligibility` module:
//!
//! - [`EligibilityClient`] - Public API trait for consumers
//! - [`PolicyBackend`] - Backend trait for policy sources
//! - [`BindingQuery`], [`CandidateBinding`] - Backend query models
//! - [`RoleBinding`], [`EligibleRoleBindings`] - Evaluation result models
//! - [`EligibilityError`], [`PolicyBackendError`] - Error types
//!
//! ## Usage
//!
//! ```ignore
//! use eligibility_sdk::EligibilityClient;
//!
//! let result = eligibility.eligible_role_bindings(&principal).await?;
//! if !result.is_complete() {
//!     // Some bindings could not be evaluated; show result.warnings().
//! }
//! ```

pub mod api;
pub mod error;
pub mod models;

// Re-export main types at crate root
pub use api::{EligibilityClient, PolicyBackend};
pub use error::{EligibilityError, PolicyBackendError};
pub use models::{BindingQuery, CandidateBinding, EligibleRoleBindings, RoleBinding};
