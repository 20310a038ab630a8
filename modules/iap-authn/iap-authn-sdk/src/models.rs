//! Domain models for the IAP `AuthN` module.

use elevate_security::TrustedPrincipal;
use serde::{Deserialize, Serialize};

/// Claims of an IAP assertion that the application consumes.
///
/// Registered claims checked during verification (`iss`, `aud`, `exp`) are
/// not repeated here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssertionClaims {
    /// Subject, the stable user id (e.g. `accounts.google.com:1234`).
    #[serde(default)]
    pub sub: Option<String>,
    /// Primary e-mail address of the user.
    #[serde(default)]
    pub email: Option<String>,
    /// Hosted domain of the user's account, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hd: Option<String>,
    /// Device posture, present when device policies are enabled on the proxy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google: Option<DeviceClaims>,
}

/// Device claims nested under the `google` claim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceClaims {
    #[serde(default)]
    pub device_id: Option<String>,
    #[serde(default)]
    pub access_levels: Vec<String>,
}

/// Claims of an assertion whose signature, issuer and audience were verified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedAssertion {
    claims: AssertionClaims,
}

impl VerifiedAssertion {
    /// Wrap claims that passed verification.
    #[must_use]
    pub fn new(claims: AssertionClaims) -> Self {
        Self { claims }
    }

    #[must_use]
    pub fn claims(&self) -> &AssertionClaims {
        &self.claims
    }

    #[must_use]
    pub fn into_claims(self) -> AssertionClaims {
        self.claims
    }
}

/// A single audit record.
#[derive(Debug, Clone, Copy)]
pub struct AuditEntry<'a> {
    /// Event name, e.g. `iap.authenticate`.
    pub event: &'a str,
    pub message: &'a str,
    /// Principal the event is attributed to.
    pub principal: &'a TrustedPrincipal,
}
