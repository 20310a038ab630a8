#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Eligibility Module
//!
//! Computes the role bindings a trusted principal may activate. Candidates
//! come from a [`PolicyBackend`](eligibility_sdk::PolicyBackend); each one is
//! validated locally and either kept or reported as a warning.

pub mod config;
pub mod domain;

pub use config::EligibilityConfig;
pub use domain::{EligibilityEvaluator, EligibilityLocalClient};
