use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};

use super::domain::ApplicantRecord;
use super::service::AssessmentService;

/// Router builder exposing the scoring, report, and rubric endpoints.
pub fn assessment_router(service: Arc<AssessmentService>) -> Router {
    Router::new()
        .route("/api/v1/assessments/score", post(score_handler))
        .route("/api/v1/assessments/report", post(report_handler))
        .route("/api/v1/assessments/rubric", get(rubric_handler))
        .with_state(service)
}

pub(crate) async fn score_handler(
    State(service): State<Arc<AssessmentService>>,
    axum::Json(record): axum::Json<ApplicantRecord>,
) -> Response {
    let assessment = service.score(&record);
    (StatusCode::OK, axum::Json(assessment)).into_response()
}

pub(crate) async fn report_handler(
    State(service): State<Arc<AssessmentService>>,
    axum::Json(record): axum::Json<ApplicantRecord>,
) -> Response {
    let report = service.report(&record).await;
    (StatusCode::OK, axum::Json(report)).into_response()
}

pub(crate) async fn rubric_handler(State(service): State<Arc<AssessmentService>>) -> Response {
    (StatusCode::OK, axum::Json(service.rubric().clone())).into_response()
}
