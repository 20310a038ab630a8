use serde::Serialize;

use crate::{DeviceInfo, UserId};

/// `TrustedPrincipal` is the verified caller of a request.
///
/// Built by the request authenticator once per request and attached to the
/// request's extensions. It never changes after construction, so it can be
/// cloned freely into handlers and eligibility evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrustedPrincipal {
    id: UserId,
    device: DeviceInfo,
}

impl TrustedPrincipal {
    #[must_use]
    pub fn new(id: UserId, device: DeviceInfo) -> Self {
        Self { id, device }
    }

    /// Identity of the caller.
    #[must_use]
    pub fn id(&self) -> &UserId {
        &self.id
    }

    /// Device posture attested for this request.
    #[must_use]
    pub fn device(&self) -> &DeviceInfo {
        &self.device
    }

    /// Display name, the caller's e-mail address.
    #[must_use]
    pub fn name(&self) -> &str {
        self.id.email()
    }
}
