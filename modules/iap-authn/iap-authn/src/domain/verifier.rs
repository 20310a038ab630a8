use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use iap_authn_sdk::{AssertionClaims, AssertionVerifier, VerificationError, VerifiedAssertion};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Validation, decode, decode_header};

use crate::infra::SigningKeyCache;

/// Claims every assertion must carry.
const REQUIRED_CLAIMS: &[&str] = &["exp", "iss", "aud", "sub"];

/// Verifies IAP assertions (JWS compact tokens) against the cached signing keys.
pub struct JwtAssertionVerifier {
    keys: Arc<SigningKeyCache>,
    leeway: Duration,
}

impl JwtAssertionVerifier {
    #[must_use]
    pub fn new(keys: Arc<SigningKeyCache>, leeway: Duration) -> Self {
        Self { keys, leeway }
    }
}

#[async_trait]
impl AssertionVerifier for JwtAssertionVerifier {
    async fn verify(
        &self,
        assertion: &str,
        expected_audience: &str,
        expected_issuer: &str,
    ) -> Result<VerifiedAssertion, VerificationError> {
        let header = decode_header(assertion).map_err(|e| map_jwt_error(e.kind()))?;
        let kid = header
            .kid
            .ok_or_else(|| VerificationError::Malformed("header has no key id".to_owned()))?;

        let key_set = self.keys.current().ok_or(VerificationError::KeysUnavailable)?;
        let Some(key) = key_set.get(&kid) else {
            tracing::debug!(%kid, "Assertion signed with unknown key; requesting key refresh");
            self.keys.request_refresh();
            return Err(VerificationError::UnknownKey);
        };

        // The header must name the key's own algorithm.
        if header.alg != key.algorithm() {
            return Err(VerificationError::AlgorithmMismatch);
        }

        let mut validation = Validation::new(key.algorithm());
        validation.set_issuer(&[expected_issuer]);
        validation.set_audience(&[expected_audience]);
        validation.set_required_spec_claims(REQUIRED_CLAIMS);
        validation.leeway = self.leeway.as_secs();

        let data = decode::<AssertionClaims>(assertion, key.decoding_key(), &validation)
            .map_err(|e| map_jwt_error(e.kind()))?;

        // Present is not enough; the principal is keyed on the subject.
        if data.claims.sub.as_deref().is_none_or(|sub| sub.trim().is_empty()) {
            return Err(VerificationError::MissingClaim("sub".to_owned()));
        }

        Ok(VerifiedAssertion::new(data.claims))
    }
}

/// Map a `jsonwebtoken` failure to a cause that never echoes token contents.
fn map_jwt_error(kind: &ErrorKind) -> VerificationError {
    match kind {
        ErrorKind::InvalidToken => {
            VerificationError::Malformed("not a compact serialized JWS".to_owned())
        }
        ErrorKind::Base64(_) => VerificationError::Malformed("invalid base64url segment".to_owned()),
        ErrorKind::Json(_) | ErrorKind::Utf8(_) => {
            VerificationError::Malformed("segment is not valid JSON".to_owned())
        }
        ErrorKind::MissingRequiredClaim(claim) => VerificationError::MissingClaim(claim.clone()),
        ErrorKind::ExpiredSignature => VerificationError::Expired,
        ErrorKind::ImmatureSignature => VerificationError::NotYetValid,
        ErrorKind::InvalidIssuer => VerificationError::IssuerMismatch,
        ErrorKind::InvalidAudience => VerificationError::AudienceMismatch,
        ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
            VerificationError::AlgorithmMismatch
        }
        _ => VerificationError::InvalidSignature,
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn jwt_errors_map_to_causes() {
        assert_eq!(
            map_jwt_error(&ErrorKind::ExpiredSignature),
            VerificationError::Expired
        );
        assert_eq!(
            map_jwt_error(&ErrorKind::InvalidAudience),
            VerificationError::AudienceMismatch
        );
        assert_eq!(
            map_jwt_error(&ErrorKind::MissingRequiredClaim("sub".to_owned())),
            VerificationError::MissingClaim("sub".to_owned())
        );
        assert_eq!(
            map_jwt_error(&ErrorKind::InvalidSignature),
            VerificationError::InvalidSignature
        );
    }

    #[tokio::test]
    async fn empty_cache_reports_keys_unavailable() {
        let verifier = JwtAssertionVerifier::new(Arc::new(SigningKeyCache::new()), Duration::ZERO);
        // {"alg":"ES256","kid":"k1"}.{}.sig
        let token = "eyJhbGciOiJFUzI1NiIsImtpZCI6ImsxIn0.e30.c2ln";

        let err = verifier
            .verify(token, "/projects/1/apps/a", iap_authn_sdk::IAP_ISSUER_URL)
            .await
            .unwrap_err();

        assert_eq!(err, VerificationError::KeysUnavailable);
    }

    #[tokio::test]
    async fn garbage_is_malformed() {
        let verifier = JwtAssertionVerifier::new(Arc::new(SigningKeyCache::new()), Duration::ZERO);

        let err = verifier
            .verify("not-a-token", "/projects/1/apps/a", iap_authn_sdk::IAP_ISSUER_URL)
            .await
            .unwrap_err();

        assert!(matches!(err, VerificationError::Malformed(_)));
    }
}
