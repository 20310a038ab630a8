//! HTTP routes served behind the IAP gate.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router, middleware};
use eligibility_sdk::{EligibilityClient, EligibilityError, EligibleRoleBindings};
use elevate_security::TrustedPrincipal;
use iap_authn::RequestAuthenticator;
use iap_authn::middleware::{Principal, Problem, iap_authn_middleware};

#[derive(Clone)]
pub struct AppState {
    pub eligibility: Arc<dyn EligibilityClient>,
}

/// Build the router. Everything under `/api` requires an authenticated caller;
/// `/health` does not.
pub fn router(state: AppState, authenticator: Arc<RequestAuthenticator>) -> Router {
    let api = Router::new()
        .route("/api/principal", get(principal))
        .route("/api/eligible-role-bindings", get(eligible_role_bindings))
        .with_state(state)
        .layer(middleware::from_fn_with_state(
            authenticator,
            iap_authn_middleware,
        ));

    Router::new().route("/health", get(health)).merge(api)
}

async fn health() -> &'static str {
    "ok"
}

async fn principal(Principal(principal): Principal) -> Json<TrustedPrincipal> {
    Json(principal)
}

async fn eligible_role_bindings(
    State(state): State<AppState>,
    Principal(principal): Principal,
) -> Result<Json<EligibleRoleBindings>, Problem> {
    let result = state
        .eligibility
        .eligible_role_bindings(&principal)
        .await
        .map_err(|e| eligibility_error_to_problem(&e))?;

    if !result.is_complete() {
        tracing::warn!(
            principal = %principal.id(),
            warnings = result.warnings().len(),
            "Eligibility result is incomplete"
        );
    }
    Ok(Json(result))
}

fn eligibility_error_to_problem(err: &EligibilityError) -> Problem {
    match err {
        EligibilityError::BackendFailure(_) => Problem::new(
            StatusCode::SERVICE_UNAVAILABLE,
            "Service Unavailable",
            "policy backend unavailable, try again later",
        ),
        EligibilityError::Cancelled => Problem::new(
            StatusCode::SERVICE_UNAVAILABLE,
            "Service Unavailable",
            "request cancelled",
        ),
    }
}
