//! Domain layer for eligibility evaluation.

pub mod client;
pub mod condition;
pub mod service;
pub mod validation;

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod service_test;

pub use client::EligibilityLocalClient;
pub use condition::{ConditionError, check_condition};
pub use service::EligibilityEvaluator;
pub use validation::{BindingRejection, validate_candidate};
