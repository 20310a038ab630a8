use std::sync::Arc;

use elevate_security::TrustedPrincipal;
use iap_authn_sdk::{
    AssertionVerifier, AuditEntry, AuditLog, AuthenticationFailure, EVENT_AUTHENTICATE,
    IAP_ASSERTION_HEADER, IAP_ISSUER_URL, RuntimeEnvironment, VerificationError,
    app_engine_audience,
};

use super::principal::PrincipalFactory;

/// Audit message written for each authenticated request.
pub const AUTHENTICATED_MESSAGE: &str = "Authenticated IAP principal";

/// Per-request authentication gate.
///
/// On success the [`TrustedPrincipal`] is stored in the request extensions,
/// where handlers and later middleware pick it up.
pub struct RequestAuthenticator {
    verifier: Arc<dyn AssertionVerifier>,
    environment: Arc<dyn RuntimeEnvironment>,
    audit: Arc<dyn AuditLog>,
    expected_audience: String,
}

impl RequestAuthenticator {
    #[must_use]
    pub fn new(
        verifier: Arc<dyn AssertionVerifier>,
        environment: Arc<dyn RuntimeEnvironment>,
        audit: Arc<dyn AuditLog>,
    ) -> Self {
        let expected_audience =
            app_engine_audience(environment.project_number(), environment.project_id());
        Self {
            verifier,
            environment,
            audit,
            expected_audience,
        }
    }

    /// Audience every assertion must be issued for.
    #[must_use]
    pub fn expected_audience(&self) -> &str {
        &self.expected_audience
    }

    /// Authenticate `req` and attach the principal to it.
    ///
    /// A request that already carries a principal is returned as is, without
    /// another audit entry.
    ///
    /// # Errors
    ///
    /// Returns [`AuthenticationFailure`] if the assertion header is missing or
    /// the assertion does not verify.
    pub async fn authenticate<B>(
        &self,
        req: &mut http::Request<B>,
    ) -> Result<TrustedPrincipal, AuthenticationFailure> {
        if let Some(principal) = req.extensions().get::<TrustedPrincipal>() {
            return Ok(principal.clone());
        }

        let principal = match self.environment.static_principal() {
            Some(principal) => principal.clone(),
            None => self.authenticate_assertion(req.headers()).await?,
        };

        req.extensions_mut().insert(principal.clone());
        self.audit.write(&AuditEntry {
            event: EVENT_AUTHENTICATE,
            message: AUTHENTICATED_MESSAGE,
            principal: &principal,
        });

        Ok(principal)
    }

    async fn authenticate_assertion(
        &self,
        headers: &http::HeaderMap,
    ) -> Result<TrustedPrincipal, AuthenticationFailure> {
        let Some(value) = headers.get(IAP_ASSERTION_HEADER) else {
            return Err(AuthenticationFailure::AssertionMissing);
        };
        let assertion = value
            .to_str()
            .map_err(|_| {
                AuthenticationFailure::InvalidAssertion(VerificationError::Malformed(
                    "header is not visible ASCII".to_owned(),
                ))
            })?
            .trim();
        if assertion.is_empty() {
            return Err(AuthenticationFailure::AssertionMissing);
        }

        let verified = self
            .verifier
            .verify(assertion, &self.expected_audience, IAP_ISSUER_URL)
            .await
            .map_err(AuthenticationFailure::InvalidAssertion)?;

        Ok(PrincipalFactory::from_verified_assertion(verified))
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use elevate_security::{DeviceInfo, UserId};
    use iap_authn_sdk::{AssertionClaims, VerifiedAssertion};
    use parking_lot::Mutex;

    use super::*;

    /// Accepts the assertion "good" for the configured audience only.
    #[derive(Default)]
    struct FakeVerifier {
        calls: AtomicUsize,
        seen_audience: Mutex<Option<String>>,
    }

    #[async_trait]
    impl AssertionVerifier for FakeVerifier {
        async fn verify(
            &self,
            assertion: &str,
            expected_audience: &str,
            expected_issuer: &str,
        ) -> Result<VerifiedAssertion, VerificationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.seen_audience.lock() = Some(expected_audience.to_owned());
            assert_eq!(expected_issuer, IAP_ISSUER_URL);

            if assertion == "good" {
                Ok(VerifiedAssertion::new(AssertionClaims {
                    sub: Some("user:alice@example.com".to_owned()),
                    ..AssertionClaims::default()
                }))
            } else {
                Err(VerificationError::InvalidSignature)
            }
        }
    }

    struct FakeEnvironment {
        static_principal: Option<TrustedPrincipal>,
    }

    impl RuntimeEnvironment for FakeEnvironment {
        fn project_number(&self) -> &str {
            "123"
        }

        fn project_id(&self) -> &str {
            "myapp"
        }

        fn static_principal(&self) -> Option<&TrustedPrincipal> {
            self.static_principal.as_ref()
        }
    }

    #[derive(Default)]
    struct RecordingAudit {
        entries: Mutex<Vec<(String, String, String)>>,
    }

    impl AuditLog for RecordingAudit {
        fn write(&self, entry: &AuditEntry<'_>) {
            self.entries.lock().push((
                entry.event.to_owned(),
                entry.message.to_owned(),
                entry.principal.name().to_owned(),
            ));
        }
    }

    struct Harness {
        verifier: Arc<FakeVerifier>,
        audit: Arc<RecordingAudit>,
        authenticator: RequestAuthenticator,
    }

    fn harness(static_principal: Option<TrustedPrincipal>) -> Harness {
        let verifier = Arc::new(FakeVerifier::default());
        let audit = Arc::new(RecordingAudit::default());
        let authenticator = RequestAuthenticator::new(
            verifier.clone(),
            Arc::new(FakeEnvironment { static_principal }),
            audit.clone(),
        );
        Harness {
            verifier,
            audit,
            authenticator,
        }
    }

    fn request(assertion: Option<&str>) -> http::Request<()> {
        let mut builder = http::Request::builder().uri("/api/principal");
        if let Some(assertion) = assertion {
            builder = builder.header(IAP_ASSERTION_HEADER, assertion);
        }
        builder.body(()).unwrap()
    }

    #[tokio::test]
    async fn valid_assertion_yields_principal_in_extensions() {
        let h = harness(None);
        let mut req = request(Some("good"));

        let principal = h.authenticator.authenticate(&mut req).await.unwrap();

        assert_eq!(principal.name(), "alice@example.com");
        assert_eq!(req.extensions().get::<TrustedPrincipal>(), Some(&principal));
        assert_eq!(
            h.verifier.seen_audience.lock().as_deref(),
            Some("/projects/123/apps/myapp")
        );
        assert_eq!(
            *h.audit.entries.lock(),
            vec![(
                "iap.authenticate".to_owned(),
                "Authenticated IAP principal".to_owned(),
                "alice@example.com".to_owned()
            )]
        );
    }

    #[tokio::test]
    async fn missing_header_is_rejected_without_audit() {
        let h = harness(None);
        let mut req = request(None);

        let err = h.authenticator.authenticate(&mut req).await.unwrap_err();

        assert!(matches!(err, AuthenticationFailure::AssertionMissing));
        assert_eq!(
            err.to_string(),
            "IAP assertion missing, application must be accessed via IAP"
        );
        assert!(req.extensions().get::<TrustedPrincipal>().is_none());
        assert!(h.audit.entries.lock().is_empty());
        assert_eq!(h.verifier.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn non_ascii_header_is_malformed_not_missing() {
        let h = harness(None);
        let mut req = request(None);
        req.headers_mut().insert(
            IAP_ASSERTION_HEADER,
            http::HeaderValue::from_bytes(b"eyJ\xffabc").unwrap(),
        );

        let err = h.authenticator.authenticate(&mut req).await.unwrap_err();

        assert!(matches!(
            err.cause(),
            Some(VerificationError::Malformed(_))
        ));
        assert_eq!(err.to_string(), "invalid IAP assertion");
        assert!(h.audit.entries.lock().is_empty());
        assert_eq!(h.verifier.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn invalid_assertion_is_rejected_with_generic_message() {
        let h = harness(None);
        let mut req = request(Some("forged"));

        let err = h.authenticator.authenticate(&mut req).await.unwrap_err();

        assert_eq!(err.to_string(), "invalid IAP assertion");
        assert_eq!(err.cause(), Some(&VerificationError::InvalidSignature));
        assert!(req.extensions().get::<TrustedPrincipal>().is_none());
        assert!(h.audit.entries.lock().is_empty());
    }

    #[tokio::test]
    async fn second_call_reuses_principal_without_audit() {
        let h = harness(None);
        let mut req = request(Some("good"));

        let first = h.authenticator.authenticate(&mut req).await.unwrap();
        let second = h.authenticator.authenticate(&mut req).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(h.verifier.calls.load(Ordering::SeqCst), 1);
        assert_eq!(h.audit.entries.lock().len(), 1);
    }

    #[tokio::test]
    async fn static_principal_bypasses_header() {
        let developer = TrustedPrincipal::new(
            UserId::from_email("dev@example.com").unwrap(),
            DeviceInfo::default(),
        );
        let h = harness(Some(developer.clone()));
        let mut req = request(None);

        let principal = h.authenticator.authenticate(&mut req).await.unwrap();

        assert_eq!(principal, developer);
        assert_eq!(h.verifier.calls.load(Ordering::SeqCst), 0);
        assert_eq!(h.audit.entries.lock().len(), 1);
    }

    #[tokio::test]
    async fn blank_header_counts_as_missing() {
        let h = harness(None);
        let mut req = request(Some("   "));

        let err = h.authenticator.authenticate(&mut req).await.unwrap_err();
        assert!(matches!(err, AuthenticationFailure::AssertionMissing));
    }
}
