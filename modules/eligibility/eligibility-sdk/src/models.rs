//! Domain models for the eligibility module.

use elevate_security::{DeviceInfo, TrustedPrincipal, UserId};
use serde::{Deserialize, Serialize};

/// Identity the policy backend is queried for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingQuery {
    pub user: UserId,
    /// Device posture, for backends that condition bindings on it.
    pub device: DeviceInfo,
}

impl BindingQuery {
    #[must_use]
    pub fn for_principal(principal: &TrustedPrincipal) -> Self {
        Self {
            user: principal.id().clone(),
            device: principal.device().clone(),
        }
    }
}

/// A binding record as returned by the policy backend, not yet validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CandidateBinding {
    /// Backend identifier of the binding, used in warnings.
    pub id: String,
    /// Role, e.g. `roles/viewer`.
    pub role: String,
    /// Full resource name of the scope the role is granted on.
    pub resource: String,
    /// Condition expression that must hold for the binding to apply.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

/// A binding that passed local validation.
///
/// The role and resource are passed through as received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleBinding {
    pub id: String,
    pub role: String,
    pub resource: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

impl From<CandidateBinding> for RoleBinding {
    fn from(c: CandidateBinding) -> Self {
        Self {
            id: c.id,
            role: c.role,
            resource: c.resource,
            condition: c.condition,
        }
    }
}

/// Result of an eligibility evaluation.
///
/// Bindings keep the backend's order; warnings follow the order in which
/// failing candidates were encountered. When `warnings` is non-empty the
/// binding list may be incomplete.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EligibleRoleBindings {
    role_bindings: Vec<RoleBinding>,
    warnings: Vec<String>,
}

impl EligibleRoleBindings {
    #[must_use]
    pub fn new(role_bindings: Vec<RoleBinding>, warnings: Vec<String>) -> Self {
        Self {
            role_bindings,
            warnings,
        }
    }

    #[must_use]
    pub fn role_bindings(&self) -> &[RoleBinding] {
        &self.role_bindings
    }

    #[must_use]
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Whether every candidate binding could be evaluated.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.warnings.is_empty()
    }

    #[must_use]
    pub fn into_parts(self) -> (Vec<RoleBinding>, Vec<String>) {
        (self.role_bindings, self.warnings)
    }
}
