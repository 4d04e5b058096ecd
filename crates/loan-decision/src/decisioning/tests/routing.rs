use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, Request, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use super::common::*;
use crate::decisioning::domain::ApplicantField;
use crate::decisioning::engine::PolicyParameters;
use crate::decisioning::estimator::LogisticScorecard;
use crate::decisioning::service::LoanDecisionService;
use crate::decisioning::router::{assess_handler, decision_router};

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&body).expect("serialize body")))
        .expect("request builds")
}

#[tokio::test]
async fn assess_handler_returns_verdict() {
    let service = Arc::new(fixed_service(0.05));

    let response = assess_handler(State(service), axum::Json(baseline_applicant())).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["decision"], "Approved");
    assert_eq!(body["reasons"], json!(["All criteria met"]));
    assert_eq!(body["predicted_pd"], 0.05);
    assert!(body["assessment_id"].as_str().is_some());
}

#[tokio::test]
async fn assess_handler_reports_unavailable_estimator() {
    let service = Arc::new(offline_service());

    let response = assess_handler(State(service), axum::Json(baseline_applicant())).await;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = read_json_body(response).await;
    assert_eq!(body["kind"], "upstream_unavailable");
}

#[tokio::test]
async fn decisions_route_treats_null_fields_as_missing() {
    let router = decision_router(Arc::new(fixed_service(0.05)));
    let mut payload = serde_json::to_value(baseline_applicant()).expect("serialize applicant");
    payload[ApplicantField::CreditScore.name()] = serde_json::Value::Null;

    let response = router
        .oneshot(json_request("POST", "/api/v1/decisions", payload))
        .await
        .expect("route responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["decision"], "Rejected");
    assert_eq!(
        body["reasons"],
        json!(["Missing Required Field: credit_score"])
    );
}

#[tokio::test]
async fn evaluate_route_uses_supplied_pd() {
    let router = decision_router(Arc::new(offline_service()));
    let payload = json!({
        "applicant": baseline_applicant(),
        "predicted_pd": 0.10,
    });

    let response = router
        .oneshot(json_request("POST", "/api/v1/decisions/evaluate", payload))
        .await
        .expect("route responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["decision"], "Rejected");
    assert_eq!(body["reasons"], json!(["High Probability of Default"]));
}

#[tokio::test]
async fn evaluate_route_requires_pd() {
    let router = decision_router(Arc::new(fixed_service(0.05)));
    let payload = json!({ "applicant": baseline_applicant() });

    let response = router
        .oneshot(json_request("POST", "/api/v1/decisions/evaluate", payload))
        .await
        .expect("route responds");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn evaluate_route_rejects_text_in_compared_field() {
    let router = decision_router(Arc::new(fixed_service(0.05)));
    let mut applicant = serde_json::to_value(baseline_applicant()).expect("serialize applicant");
    applicant["annual_income"] = json!("plenty");
    let payload = json!({ "applicant": applicant, "predicted_pd": 0.05 });

    let response = router
        .oneshot(json_request("POST", "/api/v1/decisions/evaluate", payload))
        .await
        .expect("route responds");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = read_json_body(response).await;
    assert_eq!(body["kind"], "invalid_input");
}

#[tokio::test]
async fn policy_patch_updates_and_records_history() {
    let service = Arc::new(fixed_service(0.05));
    let router = decision_router(Arc::clone(&service));

    let response = router
        .clone()
        .oneshot(json_request(
            "PATCH",
            "/api/v1/policy",
            json!({ "actor": "analyst", "pd_threshold": 0.2, "min_age": null }),
        ))
        .await
        .expect("route responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["pd_threshold"], 0.2);
    assert_eq!(body["min_age"], 18);

    let response = router
        .clone()
        .oneshot(
            Request::get("/api/v1/policy")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("route responds");
    let body = read_json_body(response).await;
    assert_eq!(body["pd_threshold"], 0.2);

    let response = router
        .oneshot(
            Request::get("/api/v1/policy/history")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("route responds");
    let body = read_json_body(response).await;
    let entries = body.as_array().expect("history list");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["actor"], "analyst");
    assert_eq!(entries[0]["overrides"], json!({ "pd_threshold": 0.2 }));
}

#[tokio::test]
async fn policy_patch_without_actor_uses_api_actor() {
    let service = Arc::new(fixed_service(0.05));
    let router = decision_router(Arc::clone(&service));

    let response = router
        .oneshot(json_request(
            "PATCH",
            "/api/v1/policy",
            json!({ "max_delinquencies_2y": 0 }),
        ))
        .await
        .expect("route responds");

    assert_eq!(response.status(), StatusCode::OK);
    let history = service.policy_history().expect("history");
    assert_eq!(history[0].actor, "api");
    assert_eq!(service.policy().expect("policy").max_delinquencies_2y, 0);
}

#[tokio::test]
async fn decisions_route_reports_unscorable_applicant_as_client_error() {
    let service = Arc::new(LoanDecisionService::new(
        Arc::new(LogisticScorecard::reference()),
        PolicyParameters::default(),
    ));
    let router = decision_router(service);
    let mut payload = serde_json::to_value(baseline_applicant()).expect("serialize applicant");
    payload
        .as_object_mut()
        .expect("applicant object")
        .remove(ApplicantField::CreditScore.name());

    let response = router
        .oneshot(json_request("POST", "/api/v1/decisions", payload))
        .await
        .expect("route responds");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = read_json_body(response).await;
    assert_eq!(body["kind"], "malformed_applicant");
    assert!(body["error"].as_str().expect("message").contains("credit_score"));
}

#[tokio::test]
async fn decisions_route_carries_structured_extra_fields() {
    let router = decision_router(Arc::new(fixed_service(0.05)));
    let mut payload = serde_json::to_value(baseline_applicant()).expect("serialize applicant");
    payload["is_returning_customer"] = json!(true);
    payload["referral"] = json!({ "source": "partner" });

    let response = router
        .oneshot(json_request("POST", "/api/v1/decisions", payload))
        .await
        .expect("route responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["decision"], "Approved");
    assert_eq!(body["reasons"], json!(["All criteria met"]));
}

#[tokio::test]
async fn policy_patch_rejects_fractional_integer_threshold() {
    let service = Arc::new(fixed_service(0.05));
    let router = decision_router(Arc::clone(&service));

    let response = router
        .oneshot(json_request(
            "PATCH",
            "/api/v1/policy",
            json!({ "min_credit_score": 600.5 }),
        ))
        .await
        .expect("route responds");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(service.policy().expect("policy").min_credit_score, 650);
    assert!(service.policy_history().expect("history").is_empty());
}
