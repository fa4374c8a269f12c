use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::catalog::{JobDirectory, QuestionCatalog};
use super::domain::{JobId, StudentId, Submission};
use super::repository::ResultRepository;
use super::service::{AssessmentService, AssessmentServiceError};

type SharedAssessment<Q, J, R> = Arc<AssessmentService<Q, J, R>>;

#[derive(Debug, Default, Deserialize)]
pub struct QuestionsQuery {
    #[serde(default)]
    pub job_id: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct SubmitQuery {
    pub student_id: u64,
    #[serde(default)]
    pub job_id: Option<u64>,
}

/// Router builder exposing the assessment endpoints.
pub fn assessment_router<Q, J, R>(service: SharedAssessment<Q, J, R>) -> Router
where
    Q: QuestionCatalog + 'static,
    J: JobDirectory + 'static,
    R: ResultRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/assessment/questions",
            get(questions_handler::<Q, J, R>),
        )
        .route("/api/v1/assessment/submit", post(submit_handler::<Q, J, R>))
        .route(
            "/api/v1/assessment/students/:student_id/results",
            get(history_handler::<Q, J, R>),
        )
        .with_state(service)
}

pub(crate) async fn questions_handler<Q, J, R>(
    State(service): State<SharedAssessment<Q, J, R>>,
    Query(query): Query<QuestionsQuery>,
) -> Response
where
    Q: QuestionCatalog + 'static,
    J: JobDirectory + 'static,
    R: ResultRepository + 'static,
{
    match service.questions(query.job_id.map(JobId)) {
        Ok(sheet) => (StatusCode::OK, axum::Json(sheet)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn submit_handler<Q, J, R>(
    State(service): State<SharedAssessment<Q, J, R>>,
    Query(query): Query<SubmitQuery>,
    axum::Json(submission): axum::Json<Submission>,
) -> Response
where
    Q: QuestionCatalog + 'static,
    J: JobDirectory + 'static,
    R: ResultRepository + 'static,
{
    let student = StudentId(query.student_id);
    match service.submit(student, query.job_id.map(JobId), submission) {
        Ok(outcome) => {
            let payload = json!({
                "score": outcome.result.score,
                "total": outcome.result.total,
                "level": outcome.result.level,
                "recruiter_id": outcome.result.recruiter_id,
                "taken_at": outcome.result.taken_at,
                "source": outcome.source,
                "recorded": outcome.recorded,
                "review": outcome.reviews,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn history_handler<Q, J, R>(
    State(service): State<SharedAssessment<Q, J, R>>,
    Path(student_id): Path<u64>,
) -> Response
where
    Q: QuestionCatalog + 'static,
    J: JobDirectory + 'static,
    R: ResultRepository + 'static,
{
    match service.history(StudentId(student_id)) {
        Ok(results) => {
            let latest = results.last().cloned();
            let payload = json!({
                "student_id": student_id,
                "latest": latest,
                "results": results,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) fn error_response(err: AssessmentServiceError) -> Response {
    let status = match &err {
        AssessmentServiceError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        AssessmentServiceError::StudentNotFound(_) => StatusCode::NOT_FOUND,
        AssessmentServiceError::Catalog(_) | AssessmentServiceError::Repository(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    let payload = json!({ "error": err.to_string() });
    (status, axum::Json(payload)).into_response()
}
