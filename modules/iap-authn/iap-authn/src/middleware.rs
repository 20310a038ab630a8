//! Axum wiring for the authentication gate.

use std::sync::Arc;

use axum::extract::{FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::http::{StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use elevate_security::TrustedPrincipal;
use iap_authn_sdk::AuthenticationFailure;
use serde::Serialize;

use crate::domain::RequestAuthenticator;

/// RFC 9457 problem details body.
#[derive(Debug, Serialize)]
pub struct Problem {
    #[serde(rename = "type")]
    pub type_url: &'static str,
    pub title: &'static str,
    pub status: u16,
    pub detail: String,
}

impl Problem {
    #[must_use]
    pub fn new(status: StatusCode, title: &'static str, detail: impl Into<String>) -> Self {
        Self {
            type_url: "about:blank",
            title,
            status: status.as_u16(),
            detail: detail.into(),
        }
    }
}

impl IntoResponse for Problem {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = serde_json::to_vec(&self).unwrap_or_default();
        (
            status,
            [(header::CONTENT_TYPE, "application/problem+json")],
            body,
        )
            .into_response()
    }
}

/// Authenticate every request before it reaches a handler.
///
/// Requests that fail authentication are answered with `403 Forbidden`; the
/// response never says why verification failed.
pub async fn iap_authn_middleware(
    State(authenticator): State<Arc<RequestAuthenticator>>,
    mut req: Request,
    next: Next,
) -> Response {
    match authenticator.authenticate(&mut req).await {
        Ok(_) => next.run(req).await,
        Err(err) => authn_failure_to_response(&err),
    }
}

fn authn_failure_to_response(err: &AuthenticationFailure) -> Response {
    log_authn_failure(err);
    Problem::new(StatusCode::FORBIDDEN, "Forbidden", err.to_string()).into_response()
}

fn log_authn_failure(err: &AuthenticationFailure) {
    match err.cause() {
        None => tracing::debug!("IAP authentication rejected: {err}"),
        Some(cause) => tracing::debug!(%cause, "IAP authentication rejected: {err}"),
    }
}

/// Extractor for the authenticated caller.
///
/// Fails with `500` if [`iap_authn_middleware`] is not installed on the route.
#[derive(Debug, Clone)]
pub struct Principal(pub TrustedPrincipal);

impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = Problem;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<TrustedPrincipal>()
            .cloned()
            .map(Principal)
            .ok_or_else(|| {
                tracing::error!("TrustedPrincipal not found - IAP middleware not configured");
                Problem::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error",
                    "Internal authentication error",
                )
            })
    }
}
