//! Local (in-process) client for eligibility evaluation.

use std::sync::Arc;

use async_trait::async_trait;
use eligibility_sdk::{EligibilityClient, EligibilityError, EligibleRoleBindings};
use elevate_security::TrustedPrincipal;

use super::EligibilityEvaluator;

/// Local client wrapping the evaluator.
pub struct EligibilityLocalClient {
    svc: Arc<EligibilityEvaluator>,
}

impl EligibilityLocalClient {
    #[must_use]
    pub fn new(svc: Arc<EligibilityEvaluator>) -> Self {
        Self { svc }
    }
}

fn log_failure(op: &str, e: EligibilityError) -> EligibilityError {
    match &e {
        EligibilityError::Cancelled => tracing::debug!(operation = op, "eligibility call cancelled"),
        EligibilityError::BackendFailure(_) => {
            tracing::error!(operation = op, error = ?e, "eligibility call failed");
        }
    }
    e
}

#[async_trait]
impl EligibilityClient for EligibilityLocalClient {
    async fn eligible_role_bindings(
        &self,
        principal: &TrustedPrincipal,
    ) -> Result<EligibleRoleBindings, EligibilityError> {
        self.svc
            .evaluate(principal)
            .await
            .map_err(|e| log_failure("eligible_role_bindings", e))
    }
}
