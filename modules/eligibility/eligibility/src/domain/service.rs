//! Eligibility evaluation service.

use std::sync::Arc;
use std::time::Duration;

use eligibility_sdk::{
    BindingQuery, CandidateBinding, EligibilityError, EligibleRoleBindings, PolicyBackend,
};
use elevate_security::TrustedPrincipal;
use tokio_util::sync::CancellationToken;

use super::validation::validate_candidate;
use crate::config::EligibilityConfig;

/// Evaluates which role bindings a principal may activate.
///
/// Holds no per-evaluation state; concurrent evaluations share nothing but
/// the backend handle.
pub struct EligibilityEvaluator {
    backend: Arc<dyn PolicyBackend>,
    backend_timeout: Duration,
}

impl EligibilityEvaluator {
    #[must_use]
    pub fn new(backend: Arc<dyn PolicyBackend>, cfg: &EligibilityConfig) -> Self {
        Self {
            backend,
            backend_timeout: cfg.backend_timeout,
        }
    }

    /// Evaluate eligibility for `principal`.
    ///
    /// # Errors
    ///
    /// - `BackendFailure` if the backend fails or exceeds the configured timeout
    pub async fn evaluate(
        &self,
        principal: &TrustedPrincipal,
    ) -> Result<EligibleRoleBindings, EligibilityError> {
        self.evaluate_with_cancel(principal, &CancellationToken::new())
            .await
    }

    /// Evaluate eligibility for `principal`, giving up when `cancel` fires.
    ///
    /// A cancelled evaluation abandons the in-flight backend query and
    /// returns no result.
    ///
    /// # Errors
    ///
    /// - `BackendFailure` if the backend fails or exceeds the configured timeout
    /// - `Cancelled` if `cancel` fires first
    #[tracing::instrument(skip_all, fields(principal = %principal.id()))]
    pub async fn evaluate_with_cancel(
        &self,
        principal: &TrustedPrincipal,
        cancel: &CancellationToken,
    ) -> Result<EligibleRoleBindings, EligibilityError> {
        let query = BindingQuery::for_principal(principal);

        let lookup = tokio::time::timeout(
            self.backend_timeout,
            self.backend.find_candidate_bindings(&query),
        );

        let candidates = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                tracing::debug!("Eligibility evaluation cancelled");
                return Err(EligibilityError::Cancelled);
            }
            result = lookup => match result {
                Ok(Ok(candidates)) => candidates,
                Ok(Err(e)) => {
                    tracing::warn!(error = %e, "Policy backend query failed");
                    return Err(e.into());
                }
                Err(_) => {
                    tracing::warn!(
                        timeout = %humantime::format_duration(self.backend_timeout),
                        "Policy backend query timed out"
                    );
                    return Err(EligibilityError::BackendFailure(format!(
                        "policy backend did not respond within {}",
                        humantime::format_duration(self.backend_timeout)
                    )));
                }
            }
        };

        let result = partition(candidates);
        tracing::debug!(
            bindings = result.role_bindings().len(),
            warnings = result.warnings().len(),
            "Eligibility evaluated"
        );
        Ok(result)
    }
}

/// Split candidates into valid bindings and warnings, keeping order.
fn partition(candidates: Vec<CandidateBinding>) -> EligibleRoleBindings {
    let mut bindings = Vec::with_capacity(candidates.len());
    let mut warnings = Vec::new();

    for (index, candidate) in candidates.into_iter().enumerate() {
        let label = binding_label(&candidate.id, index);
        match validate_candidate(candidate) {
            Ok(binding) => bindings.push(binding),
            Err(rejection) => {
                tracing::debug!(binding = %label, error = ?rejection, "Skipping invalid binding");
                warnings.push(format!("binding {label}: {rejection}"));
            }
        }
    }

    EligibleRoleBindings::new(bindings, warnings)
}

/// The binding id, or its position when the backend sent none.
fn binding_label(id: &str, index: usize) -> String {
    let id = id.trim();
    if id.is_empty() {
        format!("#{index}")
    } else {
        id.to_owned()
    }
}
