//! Error types for the eligibility module.

use thiserror::Error;

/// Failures reported by a [`PolicyBackend`](crate::PolicyBackend).
#[derive(Debug, Error)]
pub enum PolicyBackendError {
    /// The backend could not be reached.
    #[error("policy backend unavailable: {0}")]
    Unavailable(String),

    /// An internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Errors returned by eligibility evaluation.
///
/// A binding that fails validation is not an error; it shows up as a
/// warning on an otherwise successful result.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EligibilityError {
    /// The policy backend failed or did not answer in time. No bindings can
    /// be asserted.
    #[error("policy backend failure: {0}")]
    BackendFailure(String),

    /// The evaluation was cancelled before it completed.
    #[error("eligibility evaluation cancelled")]
    Cancelled,
}

impl EligibilityError {
    /// Whether the caller may retry the same evaluation.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::BackendFailure(_))
    }
}

impl From<PolicyBackendError> for EligibilityError {
    fn from(e: PolicyBackendError) -> Self {
        Self::BackendFailure(e.to_string())
    }
}
