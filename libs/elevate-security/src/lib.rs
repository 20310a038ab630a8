#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Trusted principal types.
//!
//! A [`TrustedPrincipal`] is only ever constructed from a verified IAP assertion
//! or from an explicitly configured development override. Downstream code
//! (eligibility evaluation, handlers) reads it through the fixed capability set
//! `id()`, `device()` and `name()`.
pub mod device;
pub mod principal;
pub mod serde_duration;
pub mod user;

pub use device::DeviceInfo;
pub use principal::TrustedPrincipal;
pub use user::{UserId, UserIdError};
