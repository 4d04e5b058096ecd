use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::domain::ApplicantRecord;
use super::engine::PolicyOverrides;
use super::estimator::{EstimatorError, PdEstimator};
use super::service::{DecisionServiceError, LoanDecisionService};

/// Actor recorded in the policy history when a request does not name one.
pub const ANONYMOUS_ACTOR: &str = "api";

/// Applicant plus a PD the caller already obtained from its own estimator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluateRequest {
    pub applicant: ApplicantRecord,
    pub predicted_pd: f64,
}

/// Partial policy update; omitted or `null` parameters stay unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PolicyUpdateRequest {
    #[serde(default)]
    pub actor: Option<String>,
    #[serde(flatten)]
    pub overrides: PolicyOverrides,
}

/// Router builder exposing decision and policy endpoints.
pub fn decision_router<E>(service: Arc<LoanDecisionService<E>>) -> Router
where
    E: PdEstimator + 'static,
{
    Router::new()
        .route("/api/v1/decisions", post(assess_handler::<E>))
        .route("/api/v1/decisions/evaluate", post(evaluate_handler::<E>))
        .route(
            "/api/v1/policy",
            get(policy_handler::<E>).patch(update_policy_handler::<E>),
        )
        .route("/api/v1/policy/history", get(history_handler::<E>))
        .with_state(service)
}

pub(crate) async fn assess_handler<E>(
    State(service): State<Arc<LoanDecisionService<E>>>,
    axum::Json(applicant): axum::Json<ApplicantRecord>,
) -> Response
where
    E: PdEstimator + 'static,
{
    match service.assess(&applicant) {
        Ok(assessment) => (StatusCode::OK, axum::Json(assessment)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn evaluate_handler<E>(
    State(service): State<Arc<LoanDecisionService<E>>>,
    axum::Json(request): axum::Json<EvaluateRequest>,
) -> Response
where
    E: PdEstimator + 'static,
{
    match service.evaluate_with_pd(&request.applicant, request.predicted_pd) {
        Ok(assessment) => (StatusCode::OK, axum::Json(assessment)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn policy_handler<E>(State(service): State<Arc<LoanDecisionService<E>>>) -> Response
where
    E: PdEstimator + 'static,
{
    match service.policy() {
        Ok(parameters) => (StatusCode::OK, axum::Json(parameters)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn update_policy_handler<E>(
    State(service): State<Arc<LoanDecisionService<E>>>,
    axum::Json(request): axum::Json<PolicyUpdateRequest>,
) -> Response
where
    E: PdEstimator + 'static,
{
    let actor = request.actor.as_deref().unwrap_or(ANONYMOUS_ACTOR);
    match service.update_policy(&request.overrides, actor) {
        Ok(parameters) => (StatusCode::OK, axum::Json(parameters)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn history_handler<E>(
    State(service): State<Arc<LoanDecisionService<E>>>,
) -> Response
where
    E: PdEstimator + 'static,
{
    match service.policy_history() {
        Ok(entries) => (StatusCode::OK, axum::Json(entries)).into_response(),
        Err(err) => error_response(err),
    }
}

fn error_response(err: DecisionServiceError) -> Response {
    let (status, kind) = match &err {
        DecisionServiceError::Upstream(EstimatorError::MalformedInput { .. }) => {
            (StatusCode::UNPROCESSABLE_ENTITY, "malformed_applicant")
        }
        DecisionServiceError::Upstream(_) => {
            (StatusCode::SERVICE_UNAVAILABLE, "upstream_unavailable")
        }
        DecisionServiceError::InvalidInput(_) => (StatusCode::UNPROCESSABLE_ENTITY, "invalid_input"),
        DecisionServiceError::PolicyUnavailable => {
            (StatusCode::INTERNAL_SERVER_ERROR, "policy_unavailable")
        }
    };

    let payload = json!({
        "error": err.to_string(),
        "kind": kind,
    });
    (status, axum::Json(payload)).into_response()
}
