//! Public API and backend traits for eligibility.

use async_trait::async_trait;
use elevate_security::TrustedPrincipal;

use crate::error::{EligibilityError, PolicyBackendError};
use crate::models::{BindingQuery, CandidateBinding, EligibleRoleBindings};

/// Public API trait for eligibility evaluation.
///
/// ```ignore
/// let result = eligibility.eligible_role_bindings(&principal).await?;
/// for binding in result.role_bindings() { /* ... */ }
/// ```
#[async_trait]
pub trait EligibilityClient: Send + Sync {
    /// Compute the role bindings `principal` is currently eligible to activate.
    ///
    /// Bindings that fail local validation are left out and reported in
    /// [`EligibleRoleBindings::warnings`].
    ///
    /// # Errors
    ///
    /// - `BackendFailure` if the policy backend fails or times out
    /// - `Cancelled` if the evaluation was cancelled
    async fn eligible_role_bindings(
        &self,
        principal: &TrustedPrincipal,
    ) -> Result<EligibleRoleBindings, EligibilityError>;
}

/// Source of candidate role bindings.
#[async_trait]
pub trait PolicyBackend: Send + Sync {
    /// Return every binding that applies to the queried identity, in a
    /// stable order.
    ///
    /// # Errors
    ///
    /// - `Unavailable` if the backend cannot be reached
    /// - `Internal` for unexpected errors
    async fn find_candidate_bindings(
        &self,
        query: &BindingQuery,
    ) -> Result<Vec<CandidateBinding>, PolicyBackendError>;
}
