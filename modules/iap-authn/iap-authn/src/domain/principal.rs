use elevate_security::{DeviceInfo, TrustedPrincipal, UserId};
use iap_authn_sdk::{DeviceClaims, VerifiedAssertion};

/// Builds trusted principals from verified assertions.
#[derive(Debug, Default, Clone, Copy)]
pub struct PrincipalFactory;

impl PrincipalFactory {
    /// Turn verified claims into a [`TrustedPrincipal`].
    ///
    /// The e-mail is taken from the `email` claim, falling back to the
    /// subject with its account prefix removed. Without device claims the
    /// principal gets [`DeviceInfo::default`].
    ///
    /// # Panics
    ///
    /// Panics if the assertion has no subject. Verification requires `sub`,
    /// so reaching this is a bug in the verifier.
    #[must_use]
    pub fn from_verified_assertion(assertion: VerifiedAssertion) -> TrustedPrincipal {
        let claims = assertion.into_claims();

        let Some(subject) = claims.sub.filter(|s| !s.trim().is_empty()) else {
            panic!("verified assertion has no subject");
        };

        let id = match claims.email.as_deref().filter(|e| !e.trim().is_empty()) {
            Some(email) => UserId::new(subject, email),
            None => {
                let email = subject.clone();
                UserId::new(subject, &email)
            }
        };

        let device = claims.google.map_or_else(DeviceInfo::default, device_info);

        TrustedPrincipal::new(id, device)
    }
}

fn device_info(claims: DeviceClaims) -> DeviceInfo {
    match claims.device_id {
        Some(device_id) if !device_id.is_empty() => DeviceInfo::new(device_id, claims.access_levels),
        _ => DeviceInfo::default(),
    }
}
