use super::common::*;
use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, StatusCode};
use std::sync::Arc;
use tower::ServiceExt;

use crate::assessment::router::score_handler;
use crate::assessment::{AssessmentService, DisabledAdvisor};

fn post_json(uri: &str, body: String) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body))
        .expect("request builds")
}

#[tokio::test]
async fn score_handler_returns_breakdown_and_tier() {
    let service = Arc::new(AssessmentService::standard());

    let response = score_handler(State(service), axum::Json(worked_example())).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["breakdown"]["total_score"], 10);
    assert_eq!(body["tier"]["tier"], "very_low");
}

#[tokio::test]
async fn score_route_accepts_form_payloads() {
    let router = router_with(Arc::new(DisabledAdvisor));

    let response = router
        .oneshot(post_json(
            "/api/v1/assessments/score",
            form_payload().to_string(),
        ))
        .await
        .expect("route responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["breakdown"]["rubric_version"], "v2-46");
    assert_eq!(body["breakdown"]["total_score"], 31);
    assert_eq!(body["tier"]["rating"], "A");
    assert_eq!(
        body["breakdown"]["categories"]
            .as_array()
            .map(Vec::len),
        Some(8)
    );
}

#[tokio::test]
async fn report_route_attaches_advisory() {
    let router = router_with(Arc::new(CannedAdvisor::default()));

    let response = router
        .oneshot(post_json(
            "/api/v1/assessments/report",
            form_payload().to_string(),
        ))
        .await
        .expect("route responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["tier_label"], "Low");
    assert_eq!(body["advisory"]["status"], "generated");
}

#[tokio::test]
async fn report_route_survives_advisor_outage() {
    let router = router_with(Arc::new(RejectingAdvisor));

    let response = router
        .oneshot(post_json(
            "/api/v1/assessments/report",
            form_payload().to_string(),
        ))
        .await
        .expect("route responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["total_score"], 31);
    assert_eq!(body["advisory"]["status"], "unavailable");
}

#[tokio::test]
async fn rubric_route_returns_active_configuration() {
    let router = router_with(Arc::new(DisabledAdvisor));

    let response = router
        .oneshot(
            Request::builder()
                .uri("/api/v1/assessments/rubric")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("route responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["version"], "v2-46");
    assert_eq!(body["weights"]["dependents_information"]["weight"], 13);
    assert_eq!(body["tiers"].as_array().map(Vec::len), Some(5));
}

#[tokio::test]
async fn malformed_json_is_rejected_by_the_extractor() {
    let router = router_with(Arc::new(DisabledAdvisor));

    let response = router
        .oneshot(post_json("/api/v1/assessments/score", "{ nope".to_string()))
        .await
        .expect("route responds");

    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn messy_but_valid_json_still_scores() {
    let router = router_with(Arc::new(DisabledAdvisor));
    let payload = serde_json::json!({
        "basic_info": { "age": "unknown" },
        "medical_info": ["not", "an", "object"],
        "unexpected_step": { "anything": true }
    });

    let response = router
        .oneshot(post_json("/api/v1/assessments/score", payload.to_string()))
        .await
        .expect("route responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["breakdown"]["total_score"], 0);
}
