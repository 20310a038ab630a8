//! Local validation of candidate bindings.

use eligibility_sdk::{CandidateBinding, RoleBinding};
use thiserror::Error;

use super::condition::{ConditionError, check_condition};

/// Why a candidate binding was left out of the result.
///
/// `Display` is the reason part of the warning shown to users.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindingRejection {
    #[error("missing binding id")]
    MissingId,

    #[error("missing resource")]
    MissingResource,

    #[error("invalid role")]
    InvalidRole,

    #[error("invalid condition expression")]
    InvalidCondition(#[source] ConditionError),
}

/// Validate a candidate and turn it into a usable binding.
///
/// # Errors
///
/// Returns the first [`BindingRejection`] that applies.
pub fn validate_candidate(candidate: CandidateBinding) -> Result<RoleBinding, BindingRejection> {
    if candidate.id.trim().is_empty() {
        return Err(BindingRejection::MissingId);
    }
    if candidate.resource.trim().is_empty() {
        return Err(BindingRejection::MissingResource);
    }
    if !is_valid_role(&candidate.role) {
        return Err(BindingRejection::InvalidRole);
    }
    if let Some(condition) = &candidate.condition {
        check_condition(condition).map_err(BindingRejection::InvalidCondition)?;
    }
    Ok(RoleBinding::from(candidate))
}

/// `roles/<name>`, `projects/<id>/roles/<name>` or `organizations/<id>/roles/<name>`.
fn is_valid_role(role: &str) -> bool {
    let segments: Vec<&str> = role.split('/').collect();
    let name = match segments.as_slice() {
        ["roles", name] => name,
        ["projects" | "organizations", parent, "roles", name] if !parent.is_empty() => name,
        _ => return false,
    };
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn candidate(role: &str, condition: Option<&str>) -> CandidateBinding {
        CandidateBinding {
            id: "b1".to_owned(),
            role: role.to_owned(),
            resource: "//cloudresourcemanager.googleapis.com/projects/p1".to_owned(),
            condition: condition.map(str::to_owned),
        }
    }

    #[test]
    fn valid_candidate_passes_through_unchanged() {
        let c = candidate("roles/compute.viewer", Some("request.time < timestamp('2030-01-01T00:00:00Z')"));

        let binding = validate_candidate(c.clone()).unwrap();

        assert_eq!(binding.id, c.id);
        assert_eq!(binding.role, c.role);
        assert_eq!(binding.resource, c.resource);
        assert_eq!(binding.condition, c.condition);
    }

    #[test]
    fn role_forms() {
        for role in [
            "roles/viewer",
            "projects/p1/roles/customRole",
            "organizations/123/roles/custom_role.v2",
        ] {
            assert!(is_valid_role(role), "{role}");
        }
        for role in [
            "",
            "viewer",
            "roles/",
            "roles/a/b",
            "projects//roles/x",
            "folders/1/roles/x",
            "roles/bad-name",
        ] {
            assert!(!is_valid_role(role), "{role}");
        }
    }

    #[test]
    fn malformed_condition_is_rejected() {
        let err = validate_candidate(candidate("roles/viewer", Some("request.time <"))).unwrap_err();

        assert!(matches!(err, BindingRejection::InvalidCondition(_)));
        assert_eq!(err.to_string(), "invalid condition expression");
    }

    #[test]
    fn blank_fields_are_rejected() {
        let mut c = candidate("roles/viewer", None);
        c.id = " ".to_owned();
        assert_eq!(validate_candidate(c).unwrap_err(), BindingRejection::MissingId);

        let mut c = candidate("roles/viewer", None);
        c.resource = String::new();
        assert_eq!(validate_candidate(c).unwrap_err(), BindingRejection::MissingResource);
    }
}
