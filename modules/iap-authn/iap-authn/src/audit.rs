//! Audit log writing through `tracing`.

use iap_authn_sdk::{AuditEntry, AuditLog};

/// Tracing target that audit entries are emitted on.
pub const AUDIT_TARGET: &str = "audit";

/// [`AuditLog`] that emits each entry as an `info` event on the `audit` target.
///
/// Route the target to a dedicated sink with the subscriber's filter, e.g.
/// `RUST_LOG=info,audit=info`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAuditLog;

impl AuditLog for TracingAuditLog {
    fn write(&self, entry: &AuditEntry<'_>) {
        tracing::info!(
            target: AUDIT_TARGET,
            event = entry.event,
            principal = %entry.principal.id(),
            subject_id = entry.principal.id().id(),
            device_id = entry.principal.device().device_id(),
            "{}",
            entry.message
        );
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use elevate_security::{DeviceInfo, TrustedPrincipal, UserId};
    use tracing_test::traced_test;

    use super::*;

    #[traced_test]
    #[test]
    fn writes_event_name_and_principal() {
        let principal = TrustedPrincipal::new(
            UserId::new("accounts.google.com:1", "alice@example.com"),
            DeviceInfo::default(),
        );

        TracingAuditLog.write(&AuditEntry {
            event: "iap.authenticate",
            message: "Authenticated IAP principal",
            principal: &principal,
        });

        assert!(logs_contain("iap.authenticate"));
        assert!(logs_contain("alice@example.com"));
        assert!(logs_contain("Authenticated IAP principal"));
    }
}
