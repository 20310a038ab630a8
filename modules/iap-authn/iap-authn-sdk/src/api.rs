//! Collaborator traits consumed by the request authenticator.

use async_trait::async_trait;
use elevate_security::TrustedPrincipal;

use crate::error::VerificationError;
use crate::models::{AuditEntry, VerifiedAssertion};

/// Verifies a signed identity assertion and extracts its claims.
///
/// Implementations check, in order: structural well-formedness, the signature
/// against the issuer's current signing keys, the issuer, and the audience.
#[async_trait]
pub trait AssertionVerifier: Send + Sync {
    /// Verify `assertion` for the given audience and issuer.
    ///
    /// # Errors
    ///
    /// Returns [`VerificationError`] if any check fails. The error never
    /// contains the assertion itself.
    async fn verify(
        &self,
        assertion: &str,
        expected_audience: &str,
        expected_issuer: &str,
    ) -> Result<VerifiedAssertion, VerificationError>;
}

/// Deployment identifiers of the running application.
pub trait RuntimeEnvironment: Send + Sync {
    /// Numeric project number, used to derive the expected audience.
    fn project_number(&self) -> &str;

    /// Project (application) id, used to derive the expected audience.
    fn project_id(&self) -> &str;

    /// Principal that replaces assertion verification altogether.
    ///
    /// Only ever `Some` outside of production.
    fn static_principal(&self) -> Option<&TrustedPrincipal>;
}

/// Sink for audit entries.
pub trait AuditLog: Send + Sync {
    fn write(&self, entry: &AuditEntry<'_>);
}
