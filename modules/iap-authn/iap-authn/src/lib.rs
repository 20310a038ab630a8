//! IAP `AuthN` Module
//!
//! Authenticates requests that reached the application through an
//! Identity-Aware Proxy:
//!
//! - [`infra`] keeps the proxy's signing keys fresh in a lock-free cache
//! - [`domain::JwtAssertionVerifier`] verifies the assertion header
//! - [`domain::PrincipalFactory`] turns verified claims into a [`TrustedPrincipal`]
//! - [`domain::RequestAuthenticator`] is the per-request gate
//! - [`middleware`] wires the gate into an axum router
//!
//! [`TrustedPrincipal`]: elevate_security::TrustedPrincipal
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod audit;
pub mod config;
pub mod domain;
pub mod environment;
pub mod infra;
pub mod middleware;

pub use audit::TracingAuditLog;
pub use config::{ExecutionMode, IapAuthnConfig, RuntimeConfig};
pub use domain::{JwtAssertionVerifier, PrincipalFactory, RequestAuthenticator};
pub use environment::{ConfiguredEnvironment, EnvironmentError};
pub use middleware::{Principal, iap_authn_middleware};
