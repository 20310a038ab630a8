//! Error types for the IAP `AuthN` module.

use thiserror::Error;

/// Reasons an assertion failed verification.
///
/// Kept for diagnostics only; callers outside the authenticator see an
/// [`AuthenticationFailure`] that does not distinguish between them.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VerificationError {
    /// The assertion is not a well-formed signed token.
    #[error("malformed assertion: {0}")]
    Malformed(String),

    /// No signing key set has been fetched yet.
    #[error("issuer signing keys are not available")]
    KeysUnavailable,

    /// The assertion references a key the issuer does not (or no longer) publish.
    #[error("assertion signed with an unknown key")]
    UnknownKey,

    /// The token header names a different algorithm than the signing key.
    #[error("assertion algorithm does not match the signing key")]
    AlgorithmMismatch,

    #[error("invalid assertion signature")]
    InvalidSignature,

    #[error("assertion expired")]
    Expired,

    #[error("assertion not yet valid")]
    NotYetValid,

    #[error("assertion issuer mismatch")]
    IssuerMismatch,

    #[error("assertion audience mismatch")]
    AudienceMismatch,

    #[error("assertion lacks required claim '{0}'")]
    MissingClaim(String),
}

/// Authentication failure surfaced to the caller as access denied.
///
/// Client-caused and not retryable. `Display` never reveals why verification
/// failed; the cause is available through `source()` for internal logging.
#[derive(Debug, Error)]
pub enum AuthenticationFailure {
    /// The request did not carry an assertion.
    #[error("IAP assertion missing, application must be accessed via IAP")]
    AssertionMissing,

    /// The assertion failed verification.
    #[error("invalid IAP assertion")]
    InvalidAssertion(#[source] VerificationError),
}

impl AuthenticationFailure {
    /// Verification cause, if any.
    #[must_use]
    pub fn cause(&self) -> Option<&VerificationError> {
        match self {
            Self::AssertionMissing => None,
            Self::InvalidAssertion(cause) => Some(cause),
        }
    }
}
