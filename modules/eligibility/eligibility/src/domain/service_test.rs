//! Tests for the eligibility evaluator against scripted policy backends.
#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use eligibility_sdk::{
    BindingQuery, CandidateBinding, EligibilityClient, EligibilityError, PolicyBackend,
    PolicyBackendError,
};
use elevate_security::{DeviceInfo, TrustedPrincipal, UserId};
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use crate::config::EligibilityConfig;
use crate::domain::{EligibilityEvaluator, EligibilityLocalClient};

enum Behavior {
    Return(Vec<CandidateBinding>),
    Fail,
    Hang,
}

struct ScriptedBackend {
    behavior: Behavior,
    queries: Mutex<Vec<BindingQuery>>,
}

impl ScriptedBackend {
    fn new(behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            queries: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl PolicyBackend for ScriptedBackend {
    async fn find_candidate_bindings(
        &self,
        query: &BindingQuery,
    ) -> Result<Vec<CandidateBinding>, PolicyBackendError> {
        self.queries.lock().push(query.clone());
        match &self.behavior {
            Behavior::Return(candidates) => Ok(candidates.clone()),
            Behavior::Fail => Err(PolicyBackendError::Unavailable(
                "connection refused".to_owned(),
            )),
            Behavior::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(Vec::new())
            }
        }
    }
}

fn candidate(id: &str, role: &str, condition: Option<&str>) -> CandidateBinding {
    CandidateBinding {
        id: id.to_owned(),
        role: role.to_owned(),
        resource: "//cloudresourcemanager.googleapis.com/projects/p1".to_owned(),
        condition: condition.map(str::to_owned),
    }
}

fn alice() -> TrustedPrincipal {
    TrustedPrincipal::new(
        UserId::new("accounts.google.com:1", "alice@example.com"),
        DeviceInfo::new("dev-1", vec!["corp".to_owned()]),
    )
}

fn evaluator(backend: Arc<ScriptedBackend>) -> EligibilityEvaluator {
    EligibilityEvaluator::new(backend, &EligibilityConfig::default())
}

fn ids(result: &eligibility_sdk::EligibleRoleBindings) -> Vec<&str> {
    result.role_bindings().iter().map(|b| b.id.as_str()).collect()
}

#[tokio::test]
async fn malformed_condition_becomes_warning() {
    let backend = ScriptedBackend::new(Behavior::Return(vec![
        candidate("roleA", "roles/viewer", None),
        candidate("roleB", "roles/editor", Some("request.time <")),
    ]));

    let result = evaluator(backend).evaluate(&alice()).await.unwrap();

    assert_eq!(ids(&result), vec!["roleA"]);
    assert_eq!(
        result.warnings(),
        ["binding roleB: invalid condition expression".to_owned()]
    );
    assert!(!result.is_complete());
}

#[tokio::test]
async fn keeps_order_of_bindings_and_warnings() {
    let backend = ScriptedBackend::new(Behavior::Return(vec![
        candidate("b1", "roles/viewer", None),
        candidate("b2", "not-a-role", None),
        candidate("b3", "projects/p1/roles/custom", Some("resource.name.startsWith('x')")),
        candidate("b4", "roles/owner", Some("a &&")),
        candidate("", "roles/viewer", None),
        candidate("b6", "organizations/1/roles/auditor", None),
    ]));

    let result = evaluator(backend).evaluate(&alice()).await.unwrap();

    assert_eq!(ids(&result), vec!["b1", "b3", "b6"]);
    assert_eq!(
        result.warnings(),
        [
            "binding b2: invalid role".to_owned(),
            "binding b4: invalid condition expression".to_owned(),
            "binding #4: missing binding id".to_owned(),
        ]
    );
}

#[tokio::test]
async fn all_valid_is_complete() {
    let backend = ScriptedBackend::new(Behavior::Return(vec![
        candidate("b1", "roles/viewer", None),
        candidate("b2", "roles/editor", Some("true")),
    ]));

    let result = evaluator(backend).evaluate(&alice()).await.unwrap();

    assert!(result.is_complete());
    assert_eq!(result.role_bindings().len(), 2);
}

#[tokio::test]
async fn empty_backend_answer_is_empty_result() {
    let backend = ScriptedBackend::new(Behavior::Return(Vec::new()));

    let result = evaluator(backend).evaluate(&alice()).await.unwrap();

    assert!(result.role_bindings().is_empty());
    assert!(result.is_complete());
}

#[tokio::test]
async fn query_carries_identity_and_device() {
    let backend = ScriptedBackend::new(Behavior::Return(Vec::new()));

    evaluator(backend.clone()).evaluate(&alice()).await.unwrap();

    let queries = backend.queries.lock();
    assert_eq!(queries.len(), 1);
    assert_eq!(queries[0].user.email(), "alice@example.com");
    assert!(queries[0].device.has_access_level("corp"));
}

#[tokio::test]
async fn backend_error_is_backend_failure() {
    let backend = ScriptedBackend::new(Behavior::Fail);

    let err = evaluator(backend).evaluate(&alice()).await.unwrap_err();

    assert!(matches!(err, EligibilityError::BackendFailure(_)));
    assert!(err.is_retryable());
}

#[tokio::test(start_paused = true)]
async fn slow_backend_times_out() {
    let backend = ScriptedBackend::new(Behavior::Hang);
    let cfg = EligibilityConfig {
        backend_timeout: Duration::from_secs(30),
    };

    let err = EligibilityEvaluator::new(backend, &cfg)
        .evaluate(&alice())
        .await
        .unwrap_err();

    assert_eq!(
        err,
        EligibilityError::BackendFailure("policy backend did not respond within 30s".to_owned())
    );
}

#[tokio::test]
async fn cancelled_before_start_returns_cancelled() {
    let backend = ScriptedBackend::new(Behavior::Return(vec![candidate(
        "b1",
        "roles/viewer",
        None,
    )]));
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = evaluator(backend)
        .evaluate_with_cancel(&alice(), &cancel)
        .await
        .unwrap_err();

    assert_eq!(err, EligibilityError::Cancelled);
    assert!(!err.is_retryable());
}

#[tokio::test(start_paused = true)]
async fn cancel_abandons_inflight_query() {
    let backend = ScriptedBackend::new(Behavior::Hang);
    let cancel = CancellationToken::new();

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(1)).await;
        trigger.cancel();
    });

    let err = evaluator(backend)
        .evaluate_with_cancel(&alice(), &cancel)
        .await
        .unwrap_err();

    assert_eq!(err, EligibilityError::Cancelled);
}

#[tokio::test]
async fn repeated_evaluation_is_identical() {
    let backend = ScriptedBackend::new(Behavior::Return(vec![
        candidate("b1", "roles/viewer", None),
        candidate("b2", "roles/editor", Some("(")),
        candidate("b3", "roles/owner", None),
    ]));
    let evaluator = evaluator(backend);

    let first = evaluator.evaluate(&alice()).await.unwrap();
    let second = evaluator.evaluate(&alice()).await.unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn local_client_delegates_to_evaluator() {
    let backend = ScriptedBackend::new(Behavior::Return(vec![candidate(
        "b1",
        "roles/viewer",
        None,
    )]));
    let client = EligibilityLocalClient::new(Arc::new(evaluator(backend)));

    let result = client.eligible_role_bindings(&alice()).await.unwrap();

    assert_eq!(ids(&result), vec!["b1"]);
}
